use thiserror::Error;

use threadcore::{ThreadId, WindowError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("unknown thread {0}")]
    UnknownThread(ThreadId),
    #[error("id feed for thread {0} closed")]
    Closed(ThreadId),
}

/// Why a record fetch failed. Stored per record, never propagated to the list.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("message not found")]
    NotFound,
    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("window error: {0}")]
    Window(#[from] WindowError),
}
