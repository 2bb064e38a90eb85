use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChromosomeError {
    #[error("Duplicate chromosome name: {0}")]
    DuplicateName(String),

    #[error("Error parsing chromosome sizes line: {0}")]
    ParseError(String),

    #[error("Chromosome sizes file contains no chromosome: {0}")]
    Empty(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum WindowError {
    #[error("Invalid window bounds: start={start} is greater than stop={stop}")]
    InvalidBounds { start: u32, stop: u32 },

    #[error("Error parsing window: {0}")]
    ParseError(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration entry: {0}")]
    Missing(String),

    #[error("Duplicate genome name in configuration: {0}")]
    DuplicateGenome(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("File doesn't appear to be a valid metagen snapshot")]
    InvalidMagic,

    #[error("Unsupported snapshot schema version: {0}")]
    UnsupportedVersion(u16),

    #[error("Snapshot holds payload kind {found:#x}, expected {expected:#x}")]
    KindMismatch { expected: u8, found: u8 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Encoding(#[from] bincode::Error),
}
