/// Error taxonomy for tab queries and tab mutations
use thiserror::Error;

use crate::tab_data::TabHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabError {
    #[error("Failed to query windows: {0}")]
    Query(String),

    #[error("Failed to decode tab records: {0}")]
    Decode(String),

    #[error("Failed to close tab {handle}: {reason}")]
    Close { handle: TabHandle, reason: String },

    #[error("Failed to activate tab {handle}: {reason}")]
    Activate { handle: TabHandle, reason: String },

    #[error("Already closed: {0}")]
    AlreadyClosed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dedup is not available for {0}")]
    DedupUnsupported(String),
}

pub type Result<T> = std::result::Result<T, TabError>;
