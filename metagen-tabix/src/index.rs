//! The binary `.tbi` index: per-sequence bin and linear indices over BGZF
//! virtual offsets, and the chunk selection used by region queries.
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::MultiGzDecoder;

use crate::error::{Result, TabixError};

pub const TBI_MAGIC: &[u8; 4] = b"TBI\x01";

/// Coordinates at or past this position fall outside the binning scheme.
pub const MAX_COORDINATE: u32 = 1 << 29;

/// Each linear index slot covers `2^14` bases.
pub const LINEAR_INDEX_SHIFT: u32 = 14;

const PRESET_MASK: i32 = 0xffff;
const PRESET_ZERO_BASED: i32 = 0x10000;

///
/// A BGZF virtual offset: the compressed block offset in the upper 48 bits,
/// the offset inside the decompressed block in the lower 16.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VirtualOffset(u64);

impl VirtualOffset {
    pub fn new(compressed: u64, uncompressed: u16) -> Self {
        VirtualOffset((compressed << 16) | uncompressed as u64)
    }

    pub fn compressed_offset(&self) -> u64 {
        self.0 >> 16
    }

    pub fn uncompressed_offset(&self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VirtualOffset {
    fn from(raw: u64) -> Self {
        VirtualOffset(raw)
    }
}

impl From<VirtualOffset> for noodles_bgzf::VirtualPosition {
    fn from(offset: VirtualOffset) -> Self {
        noodles_bgzf::VirtualPosition::from(offset.0)
    }
}

///
/// Unsigned ordering of two raw 64-bit offsets.
///
/// Offsets are stored as 64-bit words, so comparisons must never go through a
/// signed type.
///
#[inline]
pub fn less64(u: u64, v: u64) -> bool {
    u < v
}

/// A `[begin, end)` range of virtual offsets holding candidate records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub begin: VirtualOffset,
    pub end: VirtualOffset,
}

impl Chunk {
    pub fn new(begin: u64, end: u64) -> Self {
        Chunk {
            begin: VirtualOffset(begin),
            end: VirtualOffset(end),
        }
    }
}

///
/// Bins of the UCSC binning scheme whose extent intersects `[beg, end)`.
///
/// `end` is clamped to `2^29`. Returns an empty list when the clamped window
/// is empty.
///
pub fn reg2bins(beg: u32, end: u32) -> Vec<u32> {
    let end = end.min(MAX_COORDINATE);
    if beg >= end {
        return Vec::new();
    }
    let end = end - 1;

    let mut bins = vec![0];
    for (offset, shift) in [(1, 26), (9, 23), (73, 20), (585, 17), (4681, 14)] {
        let first = offset + (beg >> shift);
        let last = offset + (end >> shift);
        bins.extend(first..=last);
    }
    bins
}

///
/// Turn a set of candidate chunks, sorted by begin offset, into the minimal
/// ordered list to scan.
///
/// Three passes: chunks contained in their predecessor are dropped, overlaps
/// between neighbours are clipped, and chunks whose boundary falls in the same
/// compressed block are coalesced.
///
pub fn merge_chunks(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut kept: Vec<Chunk> = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        match kept.last() {
            Some(last) if !less64(last.end.as_raw(), chunk.end.as_raw()) => {}
            _ => kept.push(chunk),
        }
    }

    for i in 1..kept.len() {
        if !less64(kept[i - 1].end.as_raw(), kept[i].begin.as_raw()) {
            kept[i - 1].end = kept[i].begin;
        }
    }

    let mut merged: Vec<Chunk> = Vec::with_capacity(kept.len());
    for chunk in kept {
        match merged.last_mut() {
            Some(last) if last.end.compressed_offset() == chunk.begin.compressed_offset() => {
                last.end = chunk.end;
            }
            _ => merged.push(chunk),
        }
    }
    merged
}

/// Column conventions declared by the index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Generic,
    Sam,
    Vcf,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceIndex {
    pub bins: HashMap<u32, Vec<Chunk>>,
    pub linear: Vec<VirtualOffset>,
}

impl SequenceIndex {
    /// Smallest file offset that can hold a record overlapping `beg`.
    fn min_offset(&self, beg: u32) -> u64 {
        let slot = (beg >> LINEAR_INDEX_SHIFT) as usize;
        match self.linear.get(slot).or(self.linear.last()) {
            Some(offset) => offset.as_raw(),
            None => 0,
        }
    }
}

/// A parsed tabix index.
#[derive(Debug, Clone, PartialEq)]
pub struct TabixIndex {
    pub format: i32,
    pub sequence_column: i32,
    pub begin_column: i32,
    pub end_column: i32,
    pub meta_char: u8,
    pub skip_lines: i32,
    names: Vec<String>,
    name_to_tid: HashMap<String, usize>,
    sequences: Vec<SequenceIndex>,
}

impl TabixIndex {
    ///
    /// Load an index from disk. Both the usual BGZF compressed `.tbi` and a raw
    /// uncompressed one are accepted.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut bytes = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;

        let index = if bytes.starts_with(&[0x1f, 0x8b]) {
            Self::read(MultiGzDecoder::new(bytes.as_slice()))?
        } else {
            Self::read(bytes.as_slice())?
        };

        log::debug!(
            "Loaded tabix index {} with {} sequences",
            path.display(),
            index.names.len()
        );
        Ok(index)
    }

    /// Parse an uncompressed index stream.
    pub fn read<R: Read>(reader: R) -> Result<Self> {
        Self::parse(reader).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => TabixError::InvalidIndex("truncated index".to_string()),
            io::ErrorKind::InvalidData => TabixError::InvalidIndex(e.to_string()),
            _ => TabixError::Io(e),
        })
    }

    fn parse<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != TBI_MAGIC {
            return Err(invalid_data("not a tabix index"));
        }

        let n_ref = read_count(&mut reader, "n_ref")?;
        let format = reader.read_i32::<LittleEndian>()?;
        let sequence_column = reader.read_i32::<LittleEndian>()?;
        let begin_column = reader.read_i32::<LittleEndian>()?;
        let end_column = reader.read_i32::<LittleEndian>()?;
        let meta_char = reader.read_i32::<LittleEndian>()?;
        let skip_lines = reader.read_i32::<LittleEndian>()?;

        let l_nm = read_count(&mut reader, "l_nm")?;
        let mut name_block = vec![0u8; l_nm];
        reader.read_exact(&mut name_block)?;
        let names: Vec<String> = name_block
            .split(|&b| b == 0)
            .filter(|name| !name.is_empty())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect();
        if names.len() != n_ref {
            return Err(invalid_data("sequence name count does not match n_ref"));
        }

        let mut sequences = Vec::with_capacity(n_ref);
        for _ in 0..n_ref {
            let n_bin = read_count(&mut reader, "n_bin")?;
            let mut bins = HashMap::with_capacity(n_bin);
            for _ in 0..n_bin {
                let bin = reader.read_u32::<LittleEndian>()?;
                let n_chunk = read_count(&mut reader, "n_chunk")?;
                let mut chunks = Vec::with_capacity(n_chunk);
                for _ in 0..n_chunk {
                    let begin = reader.read_u64::<LittleEndian>()?;
                    let end = reader.read_u64::<LittleEndian>()?;
                    chunks.push(Chunk::new(begin, end));
                }
                bins.insert(bin, chunks);
            }

            let n_intv = read_count(&mut reader, "n_intv")?;
            let mut linear = Vec::with_capacity(n_intv);
            for _ in 0..n_intv {
                linear.push(VirtualOffset(reader.read_u64::<LittleEndian>()?));
            }
            sequences.push(SequenceIndex { bins, linear });
        }

        let name_to_tid = names
            .iter()
            .enumerate()
            .map(|(tid, name)| (name.clone(), tid))
            .collect();

        Ok(TabixIndex {
            format,
            sequence_column,
            begin_column,
            end_column,
            meta_char: meta_char as u8,
            skip_lines,
            names,
            name_to_tid,
            sequences,
        })
    }

    pub fn preset(&self) -> Preset {
        match self.format & PRESET_MASK {
            1 => Preset::Sam,
            2 => Preset::Vcf,
            _ => Preset::Generic,
        }
    }

    pub fn is_zero_based(&self) -> bool {
        self.format & PRESET_ZERO_BASED != 0
    }

    pub fn sequence_names(&self) -> &[String] {
        &self.names
    }

    /// Sequence id of a name, `-1` when the name is not indexed.
    pub fn tid(&self, name: &str) -> i32 {
        self.name_to_tid.get(name).map_or(-1, |&tid| tid as i32)
    }

    pub fn sequence(&self, tid: i32) -> Option<&SequenceIndex> {
        usize::try_from(tid).ok().and_then(|tid| self.sequences.get(tid))
    }

    ///
    /// Ordered list of chunks to scan for records of `tid` overlapping
    /// `[beg, end)`. Unknown sequences give an empty list.
    ///
    pub fn query_chunks(&self, tid: i32, beg: u32, end: u32) -> Vec<Chunk> {
        let Some(sequence) = self.sequence(tid) else {
            return Vec::new();
        };

        let min_offset = sequence.min_offset(beg);
        let mut chunks: Vec<Chunk> = reg2bins(beg, end)
            .iter()
            .filter_map(|bin| sequence.bins.get(bin))
            .flatten()
            .filter(|chunk| less64(min_offset, chunk.end.as_raw()))
            .copied()
            .collect();

        if chunks.is_empty() {
            return chunks;
        }
        chunks.sort_by_key(|chunk| chunk.begin);
        merge_chunks(chunks)
    }
}

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

fn read_count<R: Read>(reader: &mut R, field: &str) -> io::Result<usize> {
    let value = reader.read_i32::<LittleEndian>()?;
    usize::try_from(value).map_err(|_| invalid_data(&format!("negative {field}: {value}")))
}
