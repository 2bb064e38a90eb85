use thiserror::Error;

use metagen_core::errors::{SnapshotError, WindowError};
use metagen_lists::ListBuildError;
use metagen_tabix::TabixError;

#[derive(Error, Debug)]
pub enum ShiftError {
    #[error("Unknown genome: {0}")]
    UnknownGenome(String),

    #[error("Unknown chromosome: {0}")]
    UnknownChromosome(String),

    #[error("Genome declared twice: {0}")]
    DuplicateGenome(String),

    #[error("Sample {sample} not found in {file}")]
    UnknownSample { sample: String, file: String },

    #[error("Failed to build the worker pool: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Tabix(#[from] TabixError),

    #[error(transparent)]
    ListBuild(#[from] ListBuildError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShiftError>;
