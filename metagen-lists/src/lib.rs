//! # Position sorted genomic lists
//!
//! Immutable, per-chromosome lists queried by binary search:
//!
//! * [`DenseIntervalList`] - contiguous scored windows, gaps stored as zero-score windows
//! * [`SparseIntervalList`] - isolated scored windows with independent start and stop columns
//! * [`RepeatFamilyList`] - repeats grouped by family name
//! * [`SnpList`] and [`GeneList`]
//!
//! Every list is produced once by a single-use [`ListViewBuilder`].
//! [`build_genome_wide`] runs one builder per chromosome on a worker pool.
//!
//! ```rust
//! use metagen_core::models::{ScorePrecision, ScoredInterval};
//! use metagen_lists::{DenseListBuilder, IntervalView, ListViewBuilder};
//!
//! let mut builder = DenseListBuilder::new(ScorePrecision::Full);
//! builder.add_element_to_build(ScoredInterval::new(0, 10, 5.0)).unwrap();
//! builder.add_element_to_build(ScoredInterval::new(25, 30, 2.0)).unwrap();
//! let list = builder.get_list_view().unwrap();
//!
//! assert_eq!(list.stops(), &[10, 25, 30]);
//! assert_eq!(list.score_at_position(12), Some(0.0));
//! ```
pub mod dense;
pub mod errors;
pub mod gene;
pub mod gene_search;
pub mod genome_wide;
pub mod loader;
pub mod repeat;
pub mod scored;
pub mod snp;
pub mod sparse;
pub mod view;

// re-exports
pub use self::dense::{DenseIntervalList, DenseListBuilder};
pub use self::errors::ListBuildError;
pub use self::gene::{Exon, Gene, GeneList, GeneListBuilder, Strand};
pub use self::gene_search::{GeneHit, GeneSearchOptions, GeneSearcher};
pub use self::genome_wide::{GenomeWideList, build_genome_wide};
pub use self::loader::{CoordinateTranslator, ListOptions};
pub use self::repeat::{RepeatFamily, RepeatFamilyList, RepeatFamilyListBuilder, RepeatRecord};
pub use self::scored::{ScoredIntervalList, ScoredListBuilder};
pub use self::snp::{Snp, SnpList, SnpListBuilder};
pub use self::sparse::{SparseIntervalList, SparseListBuilder};
pub use self::view::{IntervalIter, IntervalView, ListViewBuilder};
