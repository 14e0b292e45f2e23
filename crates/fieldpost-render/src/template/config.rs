//! Template configuration entries and family partitioning.
//!
//! Templates are configured per *family* (an entity type such as
//! `"Pokemon"`). The store keys entries by a dotted specifier:
//! `"Pokemon"` is the family's base template, `"Pokemon.levelBBCode"`
//! overrides the `levelBBCode` placeholder inside that family.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One template configuration record, identified by its dotted specifier.
///
/// Field names serialize in camelCase to round-trip against the external
/// configuration store unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfigEntry {
    /// Dotted specifier: the family name, optionally followed by `.` and
    /// a placeholder name.
    pub specifier: String,

    /// Explicit user-edited template text. Highest priority.
    #[serde(default)]
    pub custom_template: Option<String>,

    /// Fallback default template text.
    #[serde(default)]
    pub custom_template_default: Option<String>,

    /// Name of a subject field to substitute verbatim instead of a
    /// template string. Lowest priority.
    #[serde(default)]
    pub replace_with_property: Option<String>,
}

impl TemplateConfigEntry {
    /// Creates an empty entry for the given specifier.
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            custom_template: None,
            custom_template_default: None,
            replace_with_property: None,
        }
    }

    /// Sets the explicit template text.
    pub fn with_template(mut self, text: impl Into<String>) -> Self {
        self.custom_template = Some(text.into());
        self
    }

    /// Sets the fallback default template text.
    pub fn with_default(mut self, text: impl Into<String>) -> Self {
        self.custom_template_default = Some(text.into());
        self
    }

    /// Sets the subject field substituted in place of a template string.
    pub fn with_replacement(mut self, property: impl Into<String>) -> Self {
        self.replace_with_property = Some(property.into());
        self
    }
}

/// A family's templates: the base entry plus its per-placeholder
/// overrides, keyed by the specifier suffix after the first `.`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyTemplates {
    /// The base entry (`specifier == family`), if configured.
    pub base: Option<TemplateConfigEntry>,
    /// Override entries, keyed by placeholder name.
    pub overrides: HashMap<String, TemplateConfigEntry>,
}

impl FamilyTemplates {
    /// Partitions a prefix-query result into base and overrides.
    ///
    /// Prefix queries match on raw string prefixes, so a query for
    /// `"Pokemon"` may also return `"PokemonX"` entries; anything that
    /// is neither the exact family nor under `family.` is discarded.
    pub fn partition(family: &str, entries: Vec<TemplateConfigEntry>) -> Self {
        let mut templates = Self::default();
        for entry in entries {
            if entry.specifier == family {
                templates.base = Some(entry);
            } else if let Some(name) = entry
                .specifier
                .strip_prefix(family)
                .and_then(|rest| rest.strip_prefix('.'))
            {
                templates.overrides.insert(name.to_string(), entry);
            }
        }
        templates
    }
}
