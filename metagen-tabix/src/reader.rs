use std::fs::File;
use std::io::{BufRead, Read, Seek};
use std::path::{Path, PathBuf};

use noodles_bgzf as bgzf;

use crate::error::{Result, TabixError};
use crate::index::{Chunk, TabixIndex, less64};

/// Open-ended region end.
pub const REGION_END_UNBOUNDED: u32 = 0x7fff_ffff;

/// A parsed `chr[:beg[-end]]` region, zero-based and half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionQuery {
    /// `-1` when the sequence is not indexed.
    pub tid: i32,
    pub begin: u32,
    pub end: u32,
}

fn parse_coordinate(value: &str, region: &str) -> Result<u32> {
    value
        .replace(',', "")
        .trim()
        .parse::<u32>()
        .map_err(|_| TabixError::InvalidRegion(region.to_string()))
}

///
/// Random access reader over a BGZF compressed, tabix indexed text file.
///
/// A reader serves one query at a time. Any read failure while iterating
/// leaves it poisoned and every later query is refused.
///
pub struct TabixReader<R> {
    inner: bgzf::io::Reader<R>,
    index: TabixIndex,
    poisoned: bool,
}

impl TabixReader<File> {
    /// Open `path` with its `<path>.tbi` index.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut index_path = PathBuf::from(path).into_os_string();
        index_path.push(".tbi");
        Self::open_with_index(path, Path::new(&index_path))
    }

    pub fn open_with_index<P: AsRef<Path>, Q: AsRef<Path>>(path: P, index_path: Q) -> Result<Self> {
        let index = TabixIndex::from_path(index_path)?;
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file, index))
    }
}

impl<R: Read + Seek> TabixReader<R> {
    pub fn new(inner: R, index: TabixIndex) -> Self {
        TabixReader {
            inner: bgzf::io::Reader::new(inner),
            index,
            poisoned: false,
        }
    }

    pub fn index(&self) -> &TabixIndex {
        &self.index
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn chr_to_tid(&self, name: &str) -> i32 {
        self.index.tid(name)
    }

    ///
    /// Parse `chr`, `chr:beg` or `chr:beg-end` with one-based inclusive
    /// coordinates into a zero-based half-open query. A missing end means
    /// "to the end of the sequence". A name that is itself indexed wins over
    /// splitting on `:`.
    ///
    pub fn parse_region(&self, region: &str) -> Result<RegionQuery> {
        let region = region.trim();
        if region.is_empty() {
            return Err(TabixError::InvalidRegion(region.to_string()));
        }

        let whole = self.chr_to_tid(region);
        let split = region.rsplit_once(':');
        let (name, range) = match split {
            Some((name, range)) if whole < 0 => (name, Some(range)),
            _ => (region, None),
        };

        let (begin, end) = match range {
            None => (0, REGION_END_UNBOUNDED),
            Some(range) => match range.split_once('-') {
                Some((begin, end)) => (
                    parse_coordinate(begin, region)?.saturating_sub(1),
                    parse_coordinate(end, region)?,
                ),
                None => (
                    parse_coordinate(range, region)?.saturating_sub(1),
                    REGION_END_UNBOUNDED,
                ),
            },
        };

        Ok(RegionQuery {
            tid: self.chr_to_tid(name),
            begin,
            end,
        })
    }

    ///
    /// The leading meta lines (those starting with the index meta character)
    /// plus the declared number of skipped lines.
    ///
    pub fn header_lines(&mut self) -> Result<Vec<String>> {
        self.check_usable()?;
        let result = self.read_header();
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn read_header(&mut self) -> Result<Vec<String>> {
        self.inner.seek(bgzf::VirtualPosition::from(0))?;
        let meta = self.index.meta_char;
        let skip = usize::try_from(self.index.skip_lines).unwrap_or(0);

        let mut lines = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.inner.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if lines.len() < skip || trimmed.as_bytes().first() == Some(&meta) {
                lines.push(trimmed.to_string());
            } else {
                break;
            }
        }
        Ok(lines)
    }

    /// Lazy iterator over the lines of `tid` overlapping `[begin, end)`.
    pub fn query(&mut self, tid: i32, begin: u32, end: u32) -> Result<TabixIterator<'_, R>> {
        self.check_usable()?;
        let chunks = self.index.query_chunks(tid, begin, end);
        log::trace!("query tid={tid} [{begin}, {end}) scans {} chunks", chunks.len());
        Ok(TabixIterator {
            reader: self,
            tid,
            begin,
            end,
            chunks,
            current_chunk: None,
            current_offset: 0,
            done: false,
            line: String::new(),
        })
    }

    pub fn query_region(&mut self, region: &str) -> Result<TabixIterator<'_, R>> {
        let query = self.parse_region(region)?;
        self.query(query.tid, query.begin, query.end)
    }

    fn check_usable(&self) -> Result<()> {
        match self.poisoned {
            true => Err(TabixError::Poisoned),
            false => Ok(()),
        }
    }
}

///
/// Lines of one region query, yielded in file order.
///
/// The scan stops at the first record on another sequence or starting at or
/// past the query end.
///
pub struct TabixIterator<'a, R> {
    reader: &'a mut TabixReader<R>,
    tid: i32,
    begin: u32,
    end: u32,
    chunks: Vec<Chunk>,
    current_chunk: Option<usize>,
    current_offset: u64,
    done: bool,
    line: String,
}

impl<R: Read + Seek> TabixIterator<'_, R> {
    fn advance(&mut self) -> Result<Option<String>> {
        loop {
            let exhausted = match self.current_chunk {
                None => true,
                Some(i) => !less64(self.current_offset, self.chunks[i].end.as_raw()),
            };

            if exhausted {
                let next = self.current_chunk.map_or(0, |i| i + 1);
                let Some(chunk) = self.chunks.get(next) else {
                    return Ok(None);
                };
                // adjacent chunks are read through without seeking
                let contiguous = self
                    .current_chunk
                    .is_some_and(|i| self.chunks[i].end == chunk.begin);
                if !contiguous {
                    self.reader
                        .inner
                        .seek(bgzf::VirtualPosition::from(chunk.begin))?;
                    self.current_offset = u64::from(self.reader.inner.virtual_position());
                }
                self.current_chunk = Some(next);
            }

            self.line.clear();
            if self.reader.inner.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.current_offset = u64::from(self.reader.inner.virtual_position());

            let record = self.line.trim_end_matches(['\n', '\r']);
            if record.is_empty() || record.as_bytes()[0] == self.reader.index.meta_char {
                continue;
            }

            let interval = self.reader.index.record_interval(record)?;
            if interval.tid != self.tid || interval.begin >= self.end {
                return Ok(None);
            }
            if interval.overlaps(self.begin, self.end) {
                return Ok(Some(record.to_string()));
            }
        }
    }
}

impl<R: Read + Seek> Iterator for TabixIterator<'_, R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                if matches!(e, TabixError::Io(_)) {
                    self.reader.poisoned = true;
                }
                Some(Err(e))
            }
        }
    }
}
