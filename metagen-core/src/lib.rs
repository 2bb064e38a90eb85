//! Core data model shared by every metagen crate.
//!
//! This crate holds the small, immutable value types the rest of the workspace
//! is built on (chromosomes, genome windows, scored intervals), the
//! "insertion point" dichotomic search used by every positional list, the
//! half-precision score codec and the versioned snapshot envelope used to
//! persist built structures.
//!
//! ```rust
//! use metagen_core::models::{Chromosome, ProjectChromosomes};
//!
//! let chromosomes = ProjectChromosomes::new(vec![
//!     Chromosome::new("chr1", 1_000),
//!     Chromosome::new("chr2", 500),
//! ]).unwrap();
//!
//! assert_eq!(chromosomes.index_of("CHR2"), Some(1));
//! assert_eq!(chromosomes.genome_length(), 1_500);
//! ```
pub mod config;
pub mod errors;
pub mod float16;
pub mod models;
pub mod search;
pub mod snapshot;
pub mod utils;

// re-exports
pub use self::errors::{ChromosomeError, ConfigError, SnapshotError, WindowError};
pub use self::models::{
    Chromosome, GenomeWindow, ListLayout, ProjectChromosomes, ScorePrecision, ScoreStore,
    ScoredInterval,
};
pub use self::search::{Positioned, SearchKey, insertion_point, overlapping_range, search_slice};
