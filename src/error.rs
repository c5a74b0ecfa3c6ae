//! Error types for littledom operations.

use thiserror::Error;

/// Errors surfaced by the DOM layer.
///
/// Most "not found" situations (an empty query, a bad query context, removing
/// a listener that was never added) are absorbed into empty results instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("hierarchy request error: {0}")]
    HierarchyRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
