//! Placeholder template expansion.
//!
//! Expands `{{propertyName}}` tokens in a template string against a
//! subject's fields and a family's override templates, iterating until
//! no tokens remain. Override values may themselves contain placeholders
//! (including placeholders naming other overrides), so expansion is
//! fixpoint-iterative; [`ITERATION_LIMIT`] bounds runaway templates.
//!
//! Configuration problems come back as inline `ERR: ...` text rather
//! than an error, and placeholders with no override and no matching
//! subject field expand to the empty string — templates are user-edited
//! and the output is shown directly.

use crate::error::RenderError;
use crate::subject::Subject;
use crate::template::config::{FamilyTemplates, TemplateConfigEntry};

/// Hard cap on expansion rounds. A template still holding unresolved
/// tokens after this many rounds is cyclic or runaway and fails with
/// [`RenderError::IterationLimit`].
pub const ITERATION_LIMIT: usize = 100;

/// Expands a family's base template against a subject.
///
/// The base text is seeded from the family's base entry: explicit
/// template first, then default template, then the string form of the
/// subject field named by `replaceWithProperty`. Each round then finds
/// every `{{name}}` token in the working text and replaces all of its
/// occurrences with the override template's value (resolved with the
/// same priority) or, failing that, the subject field of that name.
/// Freshly substituted text is re-scanned in the following round, so
/// nested overrides expand fully.
///
/// # Errors
///
/// Returns [`RenderError::IterationLimit`] when tokens remain after
/// [`ITERATION_LIMIT`] rounds. Missing or incomplete base configuration
/// is not an error; it yields inline `ERR: ...` text.
pub fn expand(
    subject: &dyn Subject,
    family: &str,
    templates: &FamilyTemplates,
    settings: Option<&serde_json::Value>,
) -> Result<String, RenderError> {
    let Some(base) = &templates.base else {
        return Ok(format!("ERR: No base template config found for {family}"));
    };

    let mut result = if let Some(text) = &base.custom_template {
        text.clone()
    } else if let Some(text) = &base.custom_template_default {
        text.clone()
    } else if let Some(property) = &base.replace_with_property {
        subject
            .get(property)
            .map(|value| value.into_text(settings))
            .unwrap_or_default()
    } else {
        return Ok(
            "ERR: Base template must have customTemplate or replaceWithProperty set".to_string(),
        );
    };

    let mut rounds = 0;
    loop {
        let pending = placeholder_names(&result);
        if pending.is_empty() {
            return Ok(result);
        }
        rounds += 1;
        if rounds > ITERATION_LIMIT {
            return Err(RenderError::IterationLimit {
                family: family.to_string(),
                limit: ITERATION_LIMIT,
            });
        }

        for name in pending {
            let value = match templates.overrides.get(&name) {
                Some(entry) => override_text(entry, subject, settings),
                None => subject
                    .get(&name)
                    .map(|value| value.into_text(settings))
                    .unwrap_or_default(),
            };
            let token = format!("{{{{{name}}}}}");
            result = result.replace(&token, &value);
        }
    }
}

/// Finds the distinct `{{name}}` tokens in a template, in order of first
/// appearance. A name is one-or-more non-whitespace, non-brace
/// characters; anything else between double braces is literal text.
pub fn placeholder_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut i = 0;

    while let Some(offset) = text[i..].find("{{") {
        let start = i + offset;
        let body_start = start + 2;

        let mut end = body_start;
        for (off, c) in text[body_start..].char_indices() {
            if c.is_whitespace() || c == '{' || c == '}' {
                break;
            }
            end = body_start + off + c.len_utf8();
        }

        if end > body_start && text[end..].starts_with("}}") {
            let name = &text[body_start..end];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            i = end + 2;
        } else {
            i = start + 1;
        }
    }

    names
}

/// Resolves an override entry's value: explicit template, then default
/// template, then the named subject field, then empty.
fn override_text(
    entry: &TemplateConfigEntry,
    subject: &dyn Subject,
    settings: Option<&serde_json::Value>,
) -> String {
    if let Some(text) = &entry.custom_template {
        text.clone()
    } else if let Some(text) = &entry.custom_template_default {
        text.clone()
    } else if let Some(property) = &entry.replace_with_property {
        subject
            .get(property)
            .map(|value| value.into_text(settings))
            .unwrap_or_default()
    } else {
        String::new()
    }
}
