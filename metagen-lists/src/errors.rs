use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ListBuildError {
    #[error("The list has already been built, the builder can't be used anymore")]
    AlreadyBuilt,

    #[error("Invalid interval: start={start} must be lower than stop={stop}")]
    InvalidInterval { start: u32, stop: u32 },

    #[error("Elements must be added in start order: {start} added after {previous}")]
    UnsortedInput { previous: u32, start: u32 },

    #[error("Element starting at {start} overlaps the previous one ending at {previous_stop}")]
    OverlappingInput { previous_stop: u32, start: u32 },

    #[error("Input columns have different lengths: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(String),

    #[error("Error parsing list input: {0}")]
    Parse(String),
}
