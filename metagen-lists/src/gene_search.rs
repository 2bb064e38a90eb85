//! Incremental gene name search across a genome-wide gene list.
use crate::gene::{Gene, GeneList};
use crate::genome_wide::GenomeWideList;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeneSearchOptions {
    pub case_sensitive: bool,
    /// Only match the query when it is not glued to other letters or digits.
    pub whole_word: bool,
}

/// A gene found by a search, with its location in the genome-wide list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneHit<'a> {
    pub chromosome: usize,
    pub index: usize,
    pub gene: &'a Gene,
}

/// Where the next search starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Unset,
    /// On a previous hit, as a genome-wide gene rank.
    On(usize),
    /// Between ranks `r - 1` and `r`.
    Before(usize),
}

///
/// Stateful gene name searcher.
///
/// The searcher remembers the last query and the last hit: calling
/// [`GeneSearcher::search_next`] again with the same query returns the
/// following match, wrapping around the genome. Changing the query or the
/// options restarts from the current cursor.
///
pub struct GeneSearcher<'a> {
    genes: &'a GenomeWideList<GeneList>,
    /// Genome-wide rank of the first gene of each chromosome.
    offsets: Vec<usize>,
    total: usize,
    options: GeneSearchOptions,
    last_query: Option<String>,
    cursor: Cursor,
}

impl<'a> GeneSearcher<'a> {
    pub fn new(genes: &'a GenomeWideList<GeneList>) -> Self {
        let mut offsets = Vec::with_capacity(genes.len());
        let mut total = 0;
        for list in genes.iter() {
            offsets.push(total);
            total += list.len();
        }
        GeneSearcher {
            genes,
            offsets,
            total,
            options: GeneSearchOptions::default(),
            last_query: None,
            cursor: Cursor::Unset,
        }
    }

    pub fn options(&self) -> GeneSearchOptions {
        self.options
    }

    pub fn set_options(&mut self, options: GeneSearchOptions) {
        if options != self.options {
            self.options = options;
            self.last_query = None;
        }
    }

    /// Start the next searches from `position` on `chromosome`.
    pub fn set_start_position(&mut self, chromosome: usize, position: u32) {
        let Some(list) = self.genes.get(chromosome) else {
            return;
        };
        let index = list.genes().partition_point(|gene| gene.start < position);
        self.cursor = Cursor::Before(self.offsets[chromosome] + index);
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Next gene matching `query` after the cursor, wrapping around.
    pub fn search_next(&mut self, query: &str) -> Option<GeneHit<'a>> {
        let first = match self.cursor {
            Cursor::Unset => 0,
            Cursor::On(rank) if self.is_repeated(query) => rank + 1,
            Cursor::On(rank) | Cursor::Before(rank) => rank,
        };
        self.search(query, first, true)
    }

    /// Previous gene matching `query` before the cursor, wrapping around.
    pub fn search_previous(&mut self, query: &str) -> Option<GeneHit<'a>> {
        let first = match self.cursor {
            Cursor::On(rank) if !self.is_repeated(query) => rank,
            Cursor::Unset | Cursor::Before(0) | Cursor::On(0) => self.total.checked_sub(1)?,
            Cursor::On(rank) | Cursor::Before(rank) => rank - 1,
        };
        self.search(query, first, false)
    }

    /// Same query as the last search; a changed one may still match the current hit.
    fn is_repeated(&self, query: &str) -> bool {
        self.last_query.as_deref() == Some(query)
    }

    fn search(&mut self, query: &str, first: usize, forward: bool) -> Option<GeneHit<'a>> {
        self.last_query = Some(query.to_string());
        if self.total == 0 || query.is_empty() {
            return None;
        }

        let needle = self.normalize(query);
        for step in 0..self.total {
            let rank = match forward {
                true => (first + step) % self.total,
                false => (first + self.total - step % self.total) % self.total,
            };
            let hit = self.at_rank(rank)?;
            if self.matches(&hit.gene.name, &needle) {
                self.cursor = Cursor::On(rank);
                return Some(hit);
            }
        }
        None
    }

    fn at_rank(&self, rank: usize) -> Option<GeneHit<'a>> {
        // the last chromosome starting at or before the rank holds it
        let chromosome = self.offsets.partition_point(|&offset| offset <= rank).checked_sub(1)?;
        let index = rank - self.offsets[chromosome];
        let gene = self.genes[chromosome].get(index)?;
        Some(GeneHit {
            chromosome,
            index,
            gene,
        })
    }

    fn normalize(&self, text: &str) -> String {
        match self.options.case_sensitive {
            true => text.to_string(),
            false => text.to_lowercase(),
        }
    }

    fn matches(&self, name: &str, needle: &str) -> bool {
        let haystack = self.normalize(name);
        if !self.options.whole_word {
            return haystack.contains(needle);
        }
        haystack.match_indices(needle).any(|(at, _)| {
            let before = haystack[..at].chars().next_back();
            let after = haystack[at + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
    }
}
