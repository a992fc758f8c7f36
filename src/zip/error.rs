//! Error types for container indexing and surgery

use std::io;
use thiserror::Error;

/// Result type for container operations
pub type Result<T> = std::result::Result<T, Error>;

/// Container error types
#[derive(Error, Debug)]
pub enum Error {
    /// Stream is not a recognizable ZIP container
    #[error("not a valid ZIP container: {0}")]
    Format(&'static str),

    /// Target entry is absent from the current index
    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    /// Mutation attempted on a container whose state forbids it
    #[error("container cannot be mutated: {0}")]
    State(&'static str),

    /// Read/write failure during indexing or surgery
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// True for errors that mean "this file is not a usable container",
    /// which scanners recover from by skipping the file.
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}
