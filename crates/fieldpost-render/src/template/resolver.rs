//! Template resolution against an external configuration store.
//!
//! [`TemplateResolver`] composes the two rendering passes: it loads a
//! family's template entries from the store (one prefix query per
//! family, cached), expands placeholders via [`expand`], and can pipe
//! the resolved text through the markup parser for final HTML.
//!
//! The cache coalesces concurrent fetches of the same family: entries
//! are a `tokio::sync::OnceCell` each, so the first caller issues the
//! store query and everyone else awaits the same in-flight fetch.
//! Cached families are immutable once fetched; [`TemplateResolver::invalidate`]
//! drops an entry when the store's contents for that family change.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fieldpost_bbparser::BBParser;
use tokio::sync::OnceCell;

use crate::error::RenderError;
use crate::subject::Subject;
use crate::template::config::{FamilyTemplates, TemplateConfigEntry};
use crate::template::engine::expand;

/// The template configuration store collaborator.
///
/// A prefix query returns every entry whose specifier starts with the
/// given family name: the exact-match base entry plus dotted overrides.
/// Queries are idempotent and safely re-issuable.
#[allow(async_fn_in_trait)]
pub trait TemplateStore {
    /// Returns all entries whose specifier starts with `prefix`.
    async fn find_by_specifier_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<TemplateConfigEntry>, RenderError>;
}

type FamilyCell = Arc<OnceCell<Arc<FamilyTemplates>>>;

/// Resolves template families against a store, with a read-through,
/// fetch-coalescing cache keyed by family name.
pub struct TemplateResolver<S> {
    store: S,
    parser: BBParser,
    cache: Mutex<HashMap<String, FamilyCell>>,
}

impl<S: TemplateStore> TemplateResolver<S> {
    /// Creates a resolver using the default forum markup parser for
    /// [`apply_html`](Self::apply_html).
    pub fn new(store: S) -> Self {
        Self::with_parser(store, BBParser::forum())
    }

    /// Creates a resolver with a custom markup parser.
    pub fn with_parser(store: S, parser: BBParser) -> Self {
        Self {
            store,
            parser,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the family's partitioned templates, querying the store on
    /// first access. Concurrent calls for the same family share one
    /// in-flight query; a failed fetch leaves the entry empty so the
    /// next call retries.
    pub async fn family(&self, name: &str) -> Result<Arc<FamilyTemplates>, RenderError> {
        let cell = {
            let mut cache = self.cache.lock().expect("template cache lock poisoned");
            cache.entry(name.to_string()).or_default().clone()
        };

        let templates = cell
            .get_or_try_init(|| async {
                let entries = self.store.find_by_specifier_prefix(name).await?;
                Ok::<_, RenderError>(Arc::new(FamilyTemplates::partition(name, entries)))
            })
            .await?;

        Ok(Arc::clone(templates))
    }

    /// Drops the cached templates for a family. The next resolution
    /// re-queries the store.
    pub fn invalidate(&self, name: &str) {
        self.cache
            .lock()
            .expect("template cache lock poisoned")
            .remove(name);
    }

    /// Resolves a family's template against a subject, returning fully
    /// expanded, placeholder-free text (or inline `ERR: ...` text for
    /// configuration problems).
    pub async fn apply(
        &self,
        family: &str,
        subject: &dyn Subject,
        settings: Option<&serde_json::Value>,
    ) -> Result<String, RenderError> {
        let templates = self.family(family).await?;
        expand(subject, family, &templates, settings)
    }

    /// Resolves a family's template and renders the result to HTML:
    /// the template pass via [`apply`](Self::apply), then the markup
    /// pass via the resolver's [`BBParser`].
    pub async fn apply_html(
        &self,
        family: &str,
        subject: &dyn Subject,
        settings: Option<&serde_json::Value>,
    ) -> Result<String, RenderError> {
        let text = self.apply(family, subject, settings).await?;
        Ok(self.parser.parse(&text))
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
