use std::io;
use thiserror::Error;

/// Error type for metagen-tabix operations.
#[derive(Error, Debug)]
pub enum TabixError {
    /// IO error occurred while reading the index or the data file.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The index file is corrupt or not a tabix index.
    #[error("Invalid tabix index: {0}")]
    InvalidIndex(String),

    /// The region string could not be parsed.
    #[error("Invalid region syntax: {0}")]
    InvalidRegion(String),

    /// A data line does not match the column layout declared by the index.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A previous read failed mid-stream, the reader can't be used anymore.
    #[error("Reader is unusable after a previous read failure")]
    Poisoned,
}

/// Result type alias for metagen-tabix operations.
pub type Result<T> = std::result::Result<T, TabixError>;
