//! Two-pass template rendering for forum markup.
//!
//! Records become forum posts in two passes:
//!
//! **Pass 1 — placeholder expansion**: `{{name}}` tokens in a family's
//! base template are expanded from the subject's fields and the family's
//! per-placeholder override templates, iterating until no tokens remain.
//! ```text
//! Template: [b]{{name}}[/b] {{levelBBCode}}
//! After:    [b]Rex[/b] Lv. 12
//! ```
//!
//! **Pass 2 — markup conversion**: the resolved text goes through
//! [`fieldpost_bbparser::BBParser`] for final HTML.
//! ```text
//! Input:  [b]Rex[/b] Lv. 12
//! Output: <b>Rex</b> Lv. 12
//! ```
//!
//! Placeholder syntax uses double braces precisely so it cannot collide
//! with the bracket-based markup of pass 2; the passes stay independent.
//!
//! ## Key Types
//!
//! - [`TemplateConfigEntry`] / [`FamilyTemplates`]: per-family template
//!   configuration, loaded from the external store
//! - [`expand`]: the placeholder expansion engine
//! - [`TemplateResolver`]: store-backed resolution with a coalescing
//!   per-family cache

mod config;
mod engine;
mod resolver;

pub use config::{FamilyTemplates, TemplateConfigEntry};
pub use engine::{expand, placeholder_names, ITERATION_LIMIT};
pub use resolver::{TemplateResolver, TemplateStore};
