//! Error types

use thiserror::Error;

use crate::pattern::PatternKind;

/// Result type for pattern construction
pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised while building a [`crate::Pattern`].
///
/// Matching never fails: glob and regex expressions are compiled once, when
/// the pattern is constructed.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The expression (after glob translation) is not a valid regex
    #[error("invalid {kind} pattern '{expression}': {source}")]
    Syntax {
        kind: PatternKind,
        expression: String,
        #[source]
        source: regex::Error,
    },
}
