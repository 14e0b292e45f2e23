//! # Fieldpost Render — record-to-forum-post template rendering
//!
//! `fieldpost-render` turns structured records into forum markup and
//! HTML. Users configure per-entity-type ("family") templates with
//! `{{propertyName}}` placeholders; this crate expands them against a
//! record's fields, consults per-placeholder override templates, and
//! renders the result through the BBCode parser in `fieldpost-bbparser`.
//!
//! ## Core Concepts
//!
//! - [`Subject`]: read-only field access to the record being rendered;
//!   values are a [`FieldValue`] tagged union (text, number, nested
//!   data, callable, null)
//! - [`TemplateConfigEntry`]: one template record, keyed by a dotted
//!   specifier (`"Pokemon"` base, `"Pokemon.levelBBCode"` override)
//! - [`expand`]: fixpoint placeholder expansion with an iteration cap
//! - [`TemplateResolver`]: loads a family's entries from a
//!   [`TemplateStore`] (cached, fetch-coalescing) and runs both passes
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldpost_render::{expand, FamilyTemplates, FieldValue, TemplateConfigEntry};
//! use std::collections::HashMap;
//!
//! let templates = FamilyTemplates {
//!     base: Some(TemplateConfigEntry::new("Pokemon").with_template("[b]{{name}}[/b]")),
//!     overrides: HashMap::new(),
//! };
//!
//! let mut subject = HashMap::new();
//! subject.insert("name".to_string(), FieldValue::from("Rex"));
//!
//! let text = expand(&subject, "Pokemon", &templates, None).unwrap();
//! assert_eq!(text, "[b]Rex[/b]");
//! ```
//!
//! ## Error Philosophy
//!
//! Template configuration mistakes render as inline `ERR: ...` text and
//! unknown placeholders expand to nothing — user-edited templates should
//! show something rather than fail the page. The one hard fault is a
//! cyclic template hitting the expansion cap
//! ([`RenderError::IterationLimit`]), which no inline text can usefully
//! describe.

mod error;
mod subject;
pub mod template;

pub use error::RenderError;
pub use subject::{FieldValue, Subject, SubjectFn};
pub use template::{
    expand, placeholder_names, FamilyTemplates, TemplateConfigEntry, TemplateResolver,
    TemplateStore, ITERATION_LIMIT,
};
