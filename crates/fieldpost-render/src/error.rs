//! Error types for template resolution.
//!
//! Most template problems deliberately do not surface here: missing or
//! incomplete configuration produces inline `ERR: ...` text in the
//! rendered output, and unknown placeholder names resolve to empty
//! strings, since templates are user-authored and the surrounding UI
//! shows whatever comes back. Only faults the caller must act on become
//! a [`RenderError`].

use std::fmt;

/// Error type for template resolution operations.
#[derive(Debug)]
pub enum RenderError {
    /// Template expansion did not settle within the iteration cap.
    /// Indicates a cyclic or runaway template (a placeholder whose
    /// replacement text re-introduces itself).
    IterationLimit {
        /// The template family being resolved.
        family: String,
        /// The iteration cap that was exceeded.
        limit: usize,
    },

    /// The template configuration store failed to answer a query.
    Store(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::IterationLimit { family, limit } => write!(
                f,
                "template expansion for '{}' did not settle after {} iterations",
                family, limit
            ),
            RenderError::Store(msg) => write!(f, "template store error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}
