//! Meta-genome synchronization: turns the indels of every genome into
//! per-genome, per-chromosome shift tables.
//!
//! Coordinates are 0-based. An event is anchored on the reference base right
//! before it (the VCF padding base): an insertion anchored on `a` sits
//! between reference bases `a` and `a + 1`, a deletion anchored on `a`
//! removes the reference bases `a + 1 ..= a + length`.
//!
//! Insertions sharing a site across genomes are aligned: the meta-genome
//! opens one gap per site, as wide as the longest insertion there.
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use metagen_core::models::ProjectChromosomes;

use crate::errors::{Result, ShiftError};
use crate::registry::{GenomeShifts, ShiftRegistry};
use crate::shift::{ShiftEntry, ShiftTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IndelKind {
    Insertion,
    Deletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndelEvent {
    pub chromosome: usize,
    /// Reference position of the base right before the event.
    pub anchor: u32,
    pub length: u32,
    pub kind: IndelKind,
}

impl IndelEvent {
    pub fn insertion(chromosome: usize, anchor: u32, length: u32) -> Self {
        IndelEvent {
            chromosome,
            anchor,
            length,
            kind: IndelKind::Insertion,
        }
    }

    pub fn deletion(chromosome: usize, anchor: u32, length: u32) -> Self {
        IndelEvent {
            chromosome,
            anchor,
            length,
            kind: IndelKind::Deletion,
        }
    }
}

/// Every indel of one genome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeEvents {
    pub name: String,
    pub events: Vec<IndelEvent>,
}

impl GenomeEvents {
    pub fn new(name: impl Into<String>, events: Vec<IndelEvent>) -> Self {
        GenomeEvents {
            name: name.into(),
            events,
        }
    }
}

/// Kept events of one genome on one chromosome.
#[derive(Debug, Default)]
struct ChromosomeIndels {
    /// `(site, length)`: `length` bases inserted before reference base `site`.
    insertions: Vec<(u32, u32)>,
    /// `[first, end)` deleted reference bases.
    deletions: Vec<(u32, u32)>,
}

impl ChromosomeIndels {
    ///
    /// Sort the events and drop the ones that cannot apply: events anchored
    /// on a base deleted by an earlier deletion, repeated insertions on one
    /// site (the longest wins) and empty events.
    ///
    fn from_events(mut events: Vec<IndelEvent>) -> Self {
        events.sort_by_key(|e| (e.anchor, e.kind, std::cmp::Reverse(e.length)));

        let mut indels = ChromosomeIndels::default();
        let mut deleted_until = 0u32;
        for event in events {
            if event.length == 0 || event.anchor < deleted_until {
                continue;
            }
            let site = event.anchor + 1;
            match event.kind {
                IndelKind::Insertion => {
                    if indels.insertions.last().is_some_and(|&(last, _)| last == site) {
                        continue;
                    }
                    indels.insertions.push((site, event.length));
                }
                IndelKind::Deletion => {
                    deleted_until = site + event.length;
                    indels.deletions.push((site, deleted_until));
                }
            }
        }
        indels
    }
}

/// Shift tables of one chromosome.
struct ChromosomeShifts {
    reference: ShiftTable,
    meta_length: u32,
    genomes: Vec<ShiftTable>,
}

/// Union of the insertion sites of every genome, with the widest insertion.
fn insertion_sites(indels: &[ChromosomeIndels]) -> Vec<(u32, u32)> {
    let mut sites = BTreeMap::new();
    for (site, length) in indels.iter().flat_map(|i| i.insertions.iter().copied()) {
        let width = sites.entry(site).or_insert(0u32);
        *width = length.max(*width);
    }
    sites.into_iter().collect()
}

fn reference_table(sites: &[(u32, u32)]) -> ShiftTable {
    let mut total = 0;
    let entries = sites
        .iter()
        .map(|&(site, width)| {
            total += width;
            ShiftEntry::new(site, total)
        })
        .collect();
    ShiftTable::from_entries(entries)
}

///
/// Shift table of one genome on one chromosome.
///
/// For a reference base `r` present in the genome, with `S(r)` the meta gap
/// opened before `r`, `I(r)` the bases the genome inserts before `r` and
/// `D(r)` the bases it deletes before `r`:
///
/// - native position: `r + I(r) - D(r)`
/// - meta position: `r + S(r)`
///
/// so the delta is `S(r) - I(r) + D(r)`. It can only change on an insertion
/// site or right after a deletion, and entries are only emitted when it
/// does. Inserted bases of the genome keep the delta of the base before
/// them: they fill the start of the site's meta gap.
///
fn genome_table(sites: &[(u32, u32)], indels: &ChromosomeIndels) -> ShiftTable {
    let mut breakpoints: Vec<u32> = sites
        .iter()
        .map(|&(site, _)| site)
        .chain(indels.deletions.iter().map(|&(_, end)| end))
        .collect();
    breakpoints.sort_unstable();
    breakpoints.dedup();

    let (mut s, mut i, mut d) = (0u32, 0u32, 0u32);
    let (mut next_site, mut next_insertion, mut next_deletion) = (0, 0, 0);
    let mut entries: Vec<ShiftEntry> = Vec::new();

    for r in breakpoints {
        while next_site < sites.len() && sites[next_site].0 <= r {
            s += sites[next_site].1;
            next_site += 1;
        }
        while next_insertion < indels.insertions.len() && indels.insertions[next_insertion].0 <= r {
            i += indels.insertions[next_insertion].1;
            next_insertion += 1;
        }
        while next_deletion < indels.deletions.len() && indels.deletions[next_deletion].1 <= r {
            let (first, end) = indels.deletions[next_deletion];
            d += end - first;
            next_deletion += 1;
        }
        // reference bases deleted in this genome have no native position
        if indels
            .deletions
            .get(next_deletion)
            .is_some_and(|&(first, _)| first <= r)
        {
            continue;
        }

        let delta = s + d - i;
        if entries.last().map_or(0, |e| e.delta) != delta {
            entries.push(ShiftEntry::new(r + i - d, delta));
        }
    }

    ShiftTable::from_entries(entries)
}

fn synchronize_chromosome(length: u32, indels: &[ChromosomeIndels]) -> ChromosomeShifts {
    let sites = insertion_sites(indels);
    let gaps: u32 = sites.iter().map(|&(_, width)| width).sum();
    ChromosomeShifts {
        reference: reference_table(&sites),
        meta_length: length + gaps,
        genomes: indels.iter().map(|genome| genome_table(&sites, genome)).collect(),
    }
}

///
/// Compute the shift registry of a multi-genome project.
///
/// Chromosomes are synchronized independently on a pool of `threads`
/// workers (0 lets the pool pick one per core).
///
/// # Arguments
/// - chromosomes: the reference chromosome registry
/// - reference: name of the reference genome, which always gets a table
/// - genomes: the indel events of every other genome
/// - threads: worker count
///
pub fn synchronize(
    chromosomes: &ProjectChromosomes,
    reference: &str,
    genomes: Vec<GenomeEvents>,
    threads: usize,
) -> Result<ShiftRegistry> {
    let mut names = Vec::with_capacity(genomes.len());
    // per[chromosome][genome]
    let mut per_chromosome: Vec<Vec<Vec<IndelEvent>>> = (0..chromosomes.len())
        .map(|_| vec![Vec::new(); genomes.len()])
        .collect();

    for (g, genome) in genomes.into_iter().enumerate() {
        if genome.name == reference || names.contains(&genome.name) {
            return Err(ShiftError::DuplicateGenome(genome.name));
        }
        for event in genome.events {
            let row = per_chromosome
                .get_mut(event.chromosome)
                .ok_or_else(|| ShiftError::UnknownChromosome(event.chromosome.to_string()))?;
            row[g].push(event);
        }
        names.push(genome.name);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| ShiftError::ThreadPool(e.to_string()))?;

    let shifts: Vec<ChromosomeShifts> = pool.install(|| {
        per_chromosome
            .into_par_iter()
            .enumerate()
            .map(|(c, rows)| {
                let indels: Vec<ChromosomeIndels> = rows.into_iter().map(ChromosomeIndels::from_events).collect();
                let length = chromosomes.get(c).map_or(0, |chromosome| chromosome.length);
                let shifts = synchronize_chromosome(length, &indels);
                log::debug!(
                    "synchronized chromosome {c}: {} reference shifts, meta length {}",
                    shifts.reference.len(),
                    shifts.meta_length
                );
                shifts
            })
            .collect()
    });

    let mut reference_tables = Vec::with_capacity(shifts.len());
    let mut meta_lengths = Vec::with_capacity(shifts.len());
    let mut genome_tables: Vec<Vec<ShiftTable>> = vec![Vec::with_capacity(shifts.len()); names.len()];
    for chromosome in shifts {
        reference_tables.push(chromosome.reference);
        meta_lengths.push(chromosome.meta_length);
        for (tables, table) in genome_tables.iter_mut().zip(chromosome.genomes) {
            tables.push(table);
        }
    }

    log::info!(
        "synchronized {} genomes over {} chromosomes",
        names.len() + 1,
        chromosomes.len()
    );

    Ok(ShiftRegistry::new(
        chromosomes.clone(),
        meta_lengths,
        GenomeShifts::new(reference, reference_tables),
        names
            .into_iter()
            .zip(genome_tables)
            .map(|(name, tables)| GenomeShifts::new(name, tables))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use metagen_core::models::Chromosome;

    use crate::shift::NativePosition;

    fn entries(table: &ShiftTable) -> Vec<(u32, u32)> {
        table.entries().iter().map(|e| (e.native, e.delta)).collect()
    }

    #[fixture]
    fn chromosomes() -> ProjectChromosomes {
        ProjectChromosomes::new(vec![Chromosome::new("chr1", 100), Chromosome::new("chr2", 50)]).unwrap()
    }

    #[rstest]
    fn test_insertions_are_aligned(chromosomes: ProjectChromosomes) {
        // A inserts 3 bases after reference base 9, B inserts 5 there
        let registry = synchronize(
            &chromosomes,
            "ref",
            vec![
                GenomeEvents::new("A", vec![IndelEvent::insertion(0, 9, 3)]),
                GenomeEvents::new("B", vec![IndelEvent::insertion(0, 9, 5)]),
            ],
            2,
        )
        .unwrap();

        assert_eq!(registry.meta_length(0), Some(105));
        assert_eq!(registry.meta_length(1), Some(50));
        assert_eq!(entries(registry.table("ref", 0).unwrap()), vec![(10, 5)]);
        // A's native 10..13 are its inserted bases, reference base 10 is A's 13
        assert_eq!(entries(registry.table("A", 0).unwrap()), vec![(13, 2)]);
        assert_eq!(entries(registry.table("B", 0).unwrap()), vec![]);

        // the reference base 10 sits at the same meta position in every genome
        assert_eq!(registry.to_meta("ref", 0, 10).unwrap(), 15);
        assert_eq!(registry.to_meta("A", 0, 13).unwrap(), 15);
        assert_eq!(registry.to_meta("B", 0, 15).unwrap(), 15);
        // A's insertion fills the start of the gap
        assert_eq!(registry.to_meta("A", 0, 10).unwrap(), 10);
        assert_eq!(registry.to_native("A", 0, 13).unwrap(), NativePosition::Gap { snapped: 13 });
        assert_eq!(registry.to_native("ref", 0, 12).unwrap(), NativePosition::Gap { snapped: 10 });
    }

    #[rstest]
    fn test_deletion(chromosomes: ProjectChromosomes) {
        // A deletes reference bases 21..=24
        let registry = synchronize(
            &chromosomes,
            "ref",
            vec![GenomeEvents::new("A", vec![IndelEvent::deletion(0, 20, 4)])],
            1,
        )
        .unwrap();

        assert_eq!(registry.meta_length(0), Some(100));
        assert_eq!(entries(registry.table("ref", 0).unwrap()), vec![]);
        assert_eq!(entries(registry.table("A", 0).unwrap()), vec![(21, 4)]);
        assert_eq!(registry.to_meta("A", 0, 20).unwrap(), 20);
        assert_eq!(registry.to_meta("A", 0, 21).unwrap(), 25);
        assert_eq!(registry.to_native("A", 0, 23).unwrap(), NativePosition::Gap { snapped: 21 });
    }

    #[rstest]
    fn test_other_genome_insertion_inside_a_deletion(chromosomes: ProjectChromosomes) {
        let registry = synchronize(
            &chromosomes,
            "ref",
            vec![
                GenomeEvents::new("A", vec![IndelEvent::deletion(0, 20, 4)]),
                GenomeEvents::new("B", vec![IndelEvent::insertion(0, 22, 2), IndelEvent::insertion(0, 50, 1)]),
            ],
            0,
        )
        .unwrap();

        assert_eq!(entries(registry.table("ref", 0).unwrap()), vec![(23, 2), (51, 3)]);
        // base 25 of the reference is A's 21, at meta 27
        assert_eq!(entries(registry.table("A", 0).unwrap()), vec![(21, 6), (47, 7)]);
        assert_eq!(entries(registry.table("B", 0).unwrap()), vec![]);
        assert_eq!(registry.to_meta("ref", 0, 25).unwrap(), 27);
        assert_eq!(registry.to_meta("A", 0, 21).unwrap(), 27);
        assert_eq!(registry.to_meta("B", 0, 27).unwrap(), 27);
    }

    #[rstest]
    fn test_events_inside_own_deletion_are_dropped() {
        let indels = ChromosomeIndels::from_events(vec![
            IndelEvent::deletion(0, 10, 5),
            IndelEvent::insertion(0, 12, 3),
            IndelEvent::deletion(0, 15, 2),
            IndelEvent::insertion(0, 10, 2),
            IndelEvent::insertion(0, 30, 1),
            IndelEvent::insertion(0, 30, 4),
        ]);
        assert_eq!(indels.insertions, vec![(11, 2), (31, 4)]);
        assert_eq!(indels.deletions, vec![(11, 16)]);
    }

    #[rstest]
    fn test_round_trip_with_mixed_events(chromosomes: ProjectChromosomes) {
        let registry = synchronize(
            &chromosomes,
            "ref",
            vec![
                GenomeEvents::new(
                    "A",
                    vec![
                        IndelEvent::insertion(0, 5, 2),
                        IndelEvent::deletion(0, 30, 3),
                        IndelEvent::insertion(0, 60, 4),
                    ],
                ),
                GenomeEvents::new("B", vec![IndelEvent::insertion(0, 5, 6), IndelEvent::deletion(0, 58, 10)]),
            ],
            2,
        )
        .unwrap();

        for genome in ["ref", "A", "B"] {
            let mut previous = None;
            for native in 0..90 {
                let meta = registry.to_meta(genome, 0, native).unwrap();
                assert!(previous.is_none_or(|p| p < meta), "{genome} is not monotonic at {native}");
                assert_eq!(registry.to_native(genome, 0, meta).unwrap(), NativePosition::Exact(native));
                previous = Some(meta);
            }
        }
    }

    #[rstest]
    fn test_duplicate_genome(chromosomes: ProjectChromosomes) {
        let result = synchronize(
            &chromosomes,
            "ref",
            vec![GenomeEvents::new("A", vec![]), GenomeEvents::new("A", vec![])],
            1,
        );
        assert!(matches!(result, Err(ShiftError::DuplicateGenome(name)) if name == "A"));

        let result = synchronize(&chromosomes, "ref", vec![GenomeEvents::new("ref", vec![])], 1);
        assert!(matches!(result, Err(ShiftError::DuplicateGenome(_))));
    }

    #[rstest]
    fn test_event_on_unknown_chromosome(chromosomes: ProjectChromosomes) {
        let result = synchronize(
            &chromosomes,
            "ref",
            vec![GenomeEvents::new("A", vec![IndelEvent::insertion(7, 1, 1)])],
            1,
        );
        assert!(matches!(result, Err(ShiftError::UnknownChromosome(_))));
    }
}
