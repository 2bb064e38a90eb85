//! The shift registry of a project and the service publishing it.
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use metagen_core::models::{Chromosome, GenomeWindow, ProjectChromosomes};
use metagen_core::snapshot::{Snapshot, SnapshotKind};
use metagen_lists::CoordinateTranslator;

use crate::errors::{Result, ShiftError};
use crate::shift::{NativePosition, ShiftTable};

/// Shift tables of one genome, one per chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeShifts {
    name: String,
    tables: Vec<ShiftTable>,
}

impl GenomeShifts {
    pub fn new(name: impl Into<String>, tables: Vec<ShiftTable>) -> Self {
        GenomeShifts {
            name: name.into(),
            tables,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self, chromosome: usize) -> Option<&ShiftTable> {
        self.tables.get(chromosome)
    }
}

///
/// Built-once view of every genome's shift tables.
///
/// A registry is never updated: when the variant files of a project change,
/// a new registry is synchronized and swapped in through [`ShiftService`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftRegistry {
    chromosomes: ProjectChromosomes,
    meta_lengths: Vec<u32>,
    reference: GenomeShifts,
    genomes: Vec<GenomeShifts>,
}

impl Snapshot for ShiftRegistry {
    const KIND: SnapshotKind = SnapshotKind::ShiftRegistry;
}

impl ShiftRegistry {
    pub(crate) fn new(
        chromosomes: ProjectChromosomes,
        meta_lengths: Vec<u32>,
        reference: GenomeShifts,
        genomes: Vec<GenomeShifts>,
    ) -> Self {
        ShiftRegistry {
            chromosomes,
            meta_lengths,
            reference,
            genomes,
        }
    }

    /// A registry with only the reference genome, mapping everything unchanged.
    pub fn identity(chromosomes: ProjectChromosomes, reference: &str) -> Self {
        let meta_lengths = chromosomes.iter().map(|c| c.length).collect();
        let tables = vec![ShiftTable::new(); chromosomes.len()];
        ShiftRegistry::new(chromosomes, meta_lengths, GenomeShifts::new(reference, tables), Vec::new())
    }

    pub fn chromosomes(&self) -> &ProjectChromosomes {
        &self.chromosomes
    }

    pub fn reference_name(&self) -> &str {
        self.reference.name()
    }

    /// Names of every genome, reference first.
    pub fn genome_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(&self.reference)
            .chain(self.genomes.iter())
            .map(GenomeShifts::name)
    }

    pub fn genome(&self, name: &str) -> Result<&GenomeShifts> {
        if self.reference.name == name {
            return Ok(&self.reference);
        }
        self.genomes
            .iter()
            .find(|genome| genome.name == name)
            .ok_or_else(|| ShiftError::UnknownGenome(name.to_string()))
    }

    pub fn table(&self, genome: &str, chromosome: usize) -> Result<&ShiftTable> {
        self.genome(genome)?
            .table(chromosome)
            .ok_or_else(|| ShiftError::UnknownChromosome(chromosome.to_string()))
    }

    pub fn meta_length(&self, chromosome: usize) -> Option<u32> {
        self.meta_lengths.get(chromosome).copied()
    }

    /// The chromosomes of the meta-genome: reference names, meta lengths.
    pub fn meta_chromosomes(&self) -> Vec<Chromosome> {
        self.chromosomes
            .iter()
            .zip(&self.meta_lengths)
            .map(|(chromosome, &length)| Chromosome::new(chromosome.name.clone(), length))
            .collect()
    }

    pub fn to_meta(&self, genome: &str, chromosome: usize, native: u32) -> Result<u32> {
        Ok(self.table(genome, chromosome)?.to_meta(native))
    }

    pub fn to_native(&self, genome: &str, chromosome: usize, meta: u32) -> Result<NativePosition> {
        Ok(self.table(genome, chromosome)?.to_native(meta))
    }

    fn chromosome_index(&self, name: &str) -> Result<usize> {
        self.chromosomes
            .index_of(name)
            .ok_or_else(|| ShiftError::UnknownChromosome(name.to_string()))
    }

    /// Meta-genome window covering a native window of `genome`.
    pub fn to_meta_window(&self, genome: &str, window: &GenomeWindow) -> Result<GenomeWindow> {
        let chromosome = self.chromosome_index(window.chromosome())?;
        let (start, stop) = self
            .table(genome, chromosome)?
            .to_meta_range(window.start(), window.stop());
        Ok(GenomeWindow::new(window.chromosome(), start, stop)?)
    }

    /// Native window of `genome` under a meta-genome window; gaps at the
    /// edges are snapped inward.
    pub fn to_native_window(&self, genome: &str, window: &GenomeWindow) -> Result<GenomeWindow> {
        let chromosome = self.chromosome_index(window.chromosome())?;
        let (start, stop) = self
            .table(genome, chromosome)?
            .to_native_range(window.start(), window.stop());
        Ok(GenomeWindow::new(window.chromosome(), start, stop)?)
    }

    /// A translator of `genome`'s native positions, for list loaders.
    pub fn translator(&self, genome: &str) -> Result<GenomeTranslator<'_>> {
        Ok(GenomeTranslator {
            shifts: self.genome(genome)?,
        })
    }
}

/// Borrowed native to meta translation of one genome.
#[derive(Debug, Clone, Copy)]
pub struct GenomeTranslator<'a> {
    shifts: &'a GenomeShifts,
}

impl CoordinateTranslator for GenomeTranslator<'_> {
    fn to_meta(&self, chromosome: usize, position: u32) -> u32 {
        self.shifts
            .table(chromosome)
            .map_or(position, |table| table.to_meta(position))
    }
}

///
/// Holds the current registry of a project.
///
/// Readers take a cheap [`Arc`] snapshot and keep translating against it
/// while a rebuilt registry is swapped in; there is a single writer and no
/// incremental update.
///
#[derive(Debug)]
pub struct ShiftService {
    current: RwLock<Arc<ShiftRegistry>>,
}

impl ShiftService {
    pub fn new(registry: ShiftRegistry) -> Self {
        ShiftService {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<ShiftRegistry> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in `registry`, returning the previous one.
    pub fn replace(&self, registry: ShiftRegistry) -> Arc<ShiftRegistry> {
        let registry = Arc::new(registry);
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        log::info!("swapping in a shift registry of {} genomes", registry.genome_names().count());
        std::mem::replace(&mut *current, registry)
    }

    ///
    /// Rebuild the registry with `build` and swap it in. A failed build
    /// leaves the current registry in place.
    ///
    pub fn rebuild<F>(&self, build: F) -> Result<Arc<ShiftRegistry>>
    where
        F: FnOnce() -> Result<ShiftRegistry>,
    {
        let registry = build()?;
        self.replace(registry);
        Ok(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use metagen_core::snapshot::{read_snapshot, write_snapshot};

    use crate::synchronizer::{GenomeEvents, IndelEvent, synchronize};

    #[fixture]
    fn chromosomes() -> ProjectChromosomes {
        ProjectChromosomes::new(vec![Chromosome::new("chr1", 100), Chromosome::new("chr2", 50)]).unwrap()
    }

    #[fixture]
    fn registry(chromosomes: ProjectChromosomes) -> ShiftRegistry {
        synchronize(
            &chromosomes,
            "ref",
            vec![
                GenomeEvents::new("A", vec![IndelEvent::insertion(1, 9, 3)]),
                GenomeEvents::new("B", vec![IndelEvent::deletion(1, 19, 5)]),
            ],
            1,
        )
        .unwrap()
    }

    #[rstest]
    fn test_lookup_errors(registry: ShiftRegistry) {
        assert!(matches!(registry.to_meta("C", 0, 1), Err(ShiftError::UnknownGenome(name)) if name == "C"));
        assert!(matches!(registry.to_meta("A", 2, 1), Err(ShiftError::UnknownChromosome(_))));
        assert_eq!(registry.genome_names().collect::<Vec<_>>(), vec!["ref", "A", "B"]);
    }

    #[rstest]
    fn test_meta_chromosomes(registry: ShiftRegistry) {
        assert_eq!(
            registry.meta_chromosomes(),
            vec![Chromosome::new("chr1", 100), Chromosome::new("chr2", 53)]
        );
    }

    #[rstest]
    fn test_windows(registry: ShiftRegistry) {
        let native = GenomeWindow::new("CHR2", 5, 30).unwrap();
        let meta = registry.to_meta_window("B", &native).unwrap();
        // B's native 20 is reference base 25, at meta 28
        assert_eq!((meta.start(), meta.stop()), (5, 38));
        assert_eq!(meta.chromosome(), "CHR2");

        let back = registry.to_native_window("B", &meta).unwrap();
        assert_eq!((back.start(), back.stop()), (5, 30));

        // the gap opened by A's insertion
        let gap = GenomeWindow::new("chr2", 10, 13).unwrap();
        let native = registry.to_native_window("ref", &gap).unwrap();
        assert_eq!((native.start(), native.stop()), (10, 10));

        let unknown = GenomeWindow::new("chrM", 0, 1).unwrap();
        assert!(matches!(registry.to_meta_window("A", &unknown), Err(ShiftError::UnknownChromosome(_))));
    }

    #[rstest]
    fn test_translator(registry: ShiftRegistry) {
        let translator = registry.translator("ref").unwrap();
        assert_eq!(translator.to_meta(1, 10), 13);
        assert_eq!(translator.to_meta(0, 10), 10);
        assert_eq!(translator.to_meta(9, 10), 10);
        assert!(registry.translator("C").is_err());
    }

    #[rstest]
    fn test_identity(chromosomes: ProjectChromosomes) {
        let registry = ShiftRegistry::identity(chromosomes, "hg19");
        assert_eq!(registry.to_meta("hg19", 1, 42).unwrap(), 42);
        assert_eq!(registry.meta_length(0), Some(100));
        assert_eq!(registry.genome_names().collect::<Vec<_>>(), vec!["hg19"]);
    }

    #[rstest]
    fn test_snapshot_round_trip(registry: ShiftRegistry) {
        let mut buffer = Vec::new();
        write_snapshot(&registry, &mut buffer).unwrap();
        let loaded: ShiftRegistry = read_snapshot(buffer.as_slice()).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.chromosomes().index_of("chr2"), Some(1));
    }

    #[rstest]
    fn test_service_swaps_atomically(registry: ShiftRegistry, chromosomes: ProjectChromosomes) {
        let service = ShiftService::new(ShiftRegistry::identity(chromosomes, "ref"));
        let before = service.snapshot();
        assert_eq!(before.to_meta("ref", 1, 10).unwrap(), 10);

        service.rebuild(|| Ok(registry)).unwrap();
        assert_eq!(service.snapshot().to_meta("ref", 1, 10).unwrap(), 13);
        // a reader holding the old snapshot is unaffected
        assert_eq!(before.to_meta("ref", 1, 10).unwrap(), 10);

        let failed = service.rebuild(|| Err(ShiftError::UnknownGenome("X".to_string())));
        assert!(failed.is_err());
        assert_eq!(service.snapshot().to_meta("ref", 1, 10).unwrap(), 13);
    }
}
