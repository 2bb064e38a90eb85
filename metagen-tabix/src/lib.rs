//! # Random access into tabix indexed files
//!
//! Reads the binary `.tbi` index of a BGZF compressed, tab separated file
//! (VCF, BED, SAM...) and yields the lines overlapping a genomic region
//! without decompressing the whole file.
//!
//! ```rust,ignore
//! use metagen_tabix::TabixReader;
//!
//! let mut reader = TabixReader::open("calls.vcf.gz")?;
//! for line in reader.query_region("chr1:10000-20000")? {
//!     println!("{}", line?);
//! }
//! ```
pub mod error;
pub mod index;
pub mod reader;
pub mod record;
pub mod vcf;

pub use error::{Result, TabixError};
pub use index::{Chunk, Preset, TabixIndex, VirtualOffset, less64, reg2bins};
pub use reader::{REGION_END_UNBOUNDED, RegionQuery, TabixIterator, TabixReader};
pub use record::RecordInterval;
pub use vcf::{Genotype, VcfHeader, VcfRecord};
