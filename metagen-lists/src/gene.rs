use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use metagen_core::search::{Positioned, SearchKey, search_slice};

use crate::errors::ListBuildError;
use crate::view::ListViewBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl FromStr for Strand {
    type Err = ListBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "?" => Ok(Strand::Unknown),
            other => Err(ListBuildError::Parse(format!("invalid strand: {other}"))),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        };
        write!(f, "{symbol}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Exon {
    pub start: u32,
    pub stop: u32,
    pub score: Option<f32>,
}

///
/// A gene model: `[start, stop)` extent, UTR bounds and exons.
///
/// `utr5_bound` and `utr3_bound` are the translation start and stop
/// (thickStart / thickEnd in BED12 terms).
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    pub strand: Strand,
    pub start: u32,
    pub stop: u32,
    pub score: Option<f32>,
    pub utr5_bound: u32,
    pub utr3_bound: u32,
    pub exons: Vec<Exon>,
}

impl Gene {
    /// A single exon gene without UTR.
    pub fn new(name: impl Into<String>, strand: Strand, start: u32, stop: u32) -> Self {
        Gene {
            name: name.into(),
            strand,
            start,
            stop,
            score: None,
            utr5_bound: start,
            utr3_bound: stop,
            exons: vec![Exon {
                start,
                stop,
                score: None,
            }],
        }
    }

    pub fn overlap(&self, start: u32, stop: u32) -> bool {
        self.start < stop && self.stop > start
    }
}

impl Positioned for Gene {
    fn start(&self) -> u32 {
        self.start
    }

    fn stop(&self) -> u32 {
        self.stop
    }
}

///
/// Genes of one chromosome sorted by start.
///
/// Genes may overlap. `max_stops[i]` is the largest stop among the first
/// `i + 1` genes, which bounds the overlap search from the left.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneList {
    genes: Vec<Gene>,
    max_stops: Vec<u32>,
}

impl GeneList {
    /// Sort `genes` by start (stable) and index them.
    pub fn new(mut genes: Vec<Gene>) -> Self {
        genes.sort_by_key(|gene| gene.start);
        let max_stops = genes
            .iter()
            .scan(0, |max, gene| {
                *max = gene.stop.max(*max);
                Some(*max)
            })
            .collect();
        GeneList { genes, max_stops }
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Gene> {
        self.genes.get(index)
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Insertion point of `position` among the gene starts.
    pub fn search(&self, position: u32) -> Option<usize> {
        search_slice(&self.genes, position, SearchKey::Start)
    }

    /// Genes overlapping `[start, stop)`, in start order.
    pub fn genes_in_window(&self, start: u32, stop: u32) -> impl Iterator<Item = &Gene> {
        let first = self.max_stops.partition_point(|&max| max <= start);
        let end = match self.search(stop) {
            Some(i) if self.genes[i].start < stop => i + 1,
            Some(i) => i,
            None => 0,
        };
        let range = if first < end { first..end } else { 0..0 };
        self.genes[range]
            .iter()
            .filter(move |gene| gene.overlap(start, stop))
    }
}

/// Builder of a [`GeneList`]; genes may come in any order.
#[derive(Debug)]
pub struct GeneListBuilder {
    genes: Option<Vec<Gene>>,
}

impl Default for GeneListBuilder {
    fn default() -> Self {
        GeneListBuilder { genes: Some(Vec::new()) }
    }
}

impl ListViewBuilder for GeneListBuilder {
    type Element = Gene;
    type View = GeneList;

    fn add_element_to_build(&mut self, gene: Gene) -> Result<(), ListBuildError> {
        let genes = self.genes.as_mut().ok_or(ListBuildError::AlreadyBuilt)?;
        if gene.start >= gene.stop {
            return Err(ListBuildError::InvalidInterval {
                start: gene.start,
                stop: gene.stop,
            });
        }
        genes.push(gene);
        Ok(())
    }

    fn get_list_view(&mut self) -> Result<GeneList, ListBuildError> {
        let genes = self.genes.take().ok_or(ListBuildError::AlreadyBuilt)?;
        Ok(GeneList::new(genes))
    }
}
