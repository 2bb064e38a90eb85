//! # Multi-genome coordinates
//!
//! Every genome of a project has its own coordinates. The meta-genome is
//! the shared coordinate space where the insertions and deletions of all the
//! genomes are reconciled, so that one reference base sits at the same meta
//! position in every genome.
//!
//! * [`synchronize`] computes the [`ShiftTable`] of every genome and chromosome
//! * [`ShiftRegistry`] translates positions and windows between native and meta coordinates
//! * [`ShiftService`] swaps a rebuilt registry in while readers keep their snapshot
//! * [`VariantDisplayList`] and [`VariantDisplayListIterator`] hold and walk the
//!   variants of one allele of one genome
//!
//! ```rust
//! use metagen_core::models::{Chromosome, ProjectChromosomes};
//! use metagen_multigenome::{GenomeEvents, IndelEvent, NativePosition, synchronize};
//!
//! let chromosomes = ProjectChromosomes::new(vec![Chromosome::new("chr1", 100)]).unwrap();
//! let genomes = vec![GenomeEvents::new("NA12878", vec![IndelEvent::insertion(0, 9, 3)])];
//! let registry = synchronize(&chromosomes, "reference", genomes, 1).unwrap();
//!
//! // reference base 10 comes after the 3 inserted bases
//! assert_eq!(registry.to_meta("reference", 0, 10).unwrap(), 13);
//! assert_eq!(registry.to_meta("NA12878", 0, 13).unwrap(), 13);
//! assert_eq!(
//!     registry.to_native("reference", 0, 11).unwrap(),
//!     NativePosition::Gap { snapped: 10 }
//! );
//! ```
pub mod errors;
pub mod ingest;
pub mod iterator;
pub mod project;
pub mod registry;
pub mod shift;
pub mod synchronizer;
pub mod variant;

// re-exports
pub use self::errors::{Result, ShiftError};
pub use self::ingest::{AlleleSlot, GenomeCalls, VariantCall, build_allele_lists, collect_genome, read_genome};
pub use self::iterator::VariantDisplayListIterator;
pub use self::project::{GenomeVariants, MultiGenomeProject};
pub use self::registry::{GenomeShifts, GenomeTranslator, ShiftRegistry, ShiftService};
pub use self::shift::{NativePosition, ShiftEntry, ShiftTable};
pub use self::synchronizer::{GenomeEvents, IndelEvent, IndelKind, synchronize};
pub use self::variant::{DisplayPolicy, Variant, VariantDisplayList, VariantDisplayListBuilder, VariantType};
