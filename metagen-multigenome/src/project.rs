//! A loaded multi-genome project: the shift registry and every genome's
//! allele lists.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;

use metagen_core::config::ProjectConfig;
use metagen_core::models::ProjectChromosomes;
use metagen_core::utils::read_chromosome_sizes;
use metagen_lists::GenomeWideList;

use crate::ingest::{AlleleSlot, GenomeCalls, build_allele_lists, read_genome};
use crate::iterator::VariantDisplayListIterator;
use crate::registry::{ShiftRegistry, ShiftService};
use crate::synchronizer::synchronize;
use crate::variant::{DisplayPolicy, VariantDisplayList, VariantType};

/// Allele lists of one genome.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomeVariants {
    pub name: String,
    pub alleles: [GenomeWideList<VariantDisplayList>; 2],
}

impl GenomeVariants {
    pub fn allele(&self, slot: AlleleSlot) -> &GenomeWideList<VariantDisplayList> {
        &self.alleles[slot as usize]
    }
}

#[derive(Debug)]
pub struct MultiGenomeProject {
    chromosomes: ProjectChromosomes,
    shifts: ShiftService,
    genomes: Vec<GenomeVariants>,
}

/// Registry and allele lists built from the genomes of `config`.
fn build(config: &ProjectConfig, chromosomes: &ProjectChromosomes) -> Result<(ShiftRegistry, Vec<GenomeVariants>)> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads())
        .build()
        .context("Failed to build the worker pool")?;

    // one reader per genome
    let calls: Vec<GenomeCalls> = pool.install(|| {
        config
            .genomes
            .par_iter()
            .map(|genome| {
                read_genome(genome, chromosomes)
                    .with_context(|| format!("Failed to read the variants of {}", genome.name))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let (events, calls): (Vec<_>, Vec<_>) = calls
        .into_iter()
        .map(|genome| (genome.events, genome.calls))
        .unzip();
    let registry = synchronize(chromosomes, config.reference_genome(), events, config.threads())?;

    let genomes = config
        .genomes
        .iter()
        .zip(calls)
        .map(|(genome, calls)| {
            let alleles = build_allele_lists(&registry, &genome.name, calls, config.threads())
                .with_context(|| format!("Failed to build the variant lists of {}", genome.name))?;
            Ok(GenomeVariants {
                name: genome.name.clone(),
                alleles,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((registry, genomes))
}

impl MultiGenomeProject {
    ///
    /// Load every genome of `config`: read the VCFs, synchronize the
    /// meta-genome and build the allele lists.
    ///
    pub fn load(config: &ProjectConfig) -> Result<Self> {
        let chromosomes = read_chromosome_sizes(&config.chromosome_sizes)?;
        let (registry, genomes) = build(config, &chromosomes)?;
        log::info!("loaded a project of {} genomes", genomes.len());
        Ok(MultiGenomeProject {
            chromosomes,
            shifts: ShiftService::new(registry),
            genomes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config = ProjectConfig::try_from(path)
            .with_context(|| format!("Failed to load project configuration {}", path.display()))?;
        Self::load(&config)
    }

    ///
    /// Rebuild everything after the genomes of the project changed. The shift
    /// registry is swapped in as a whole; readers holding the previous one
    /// keep it. On failure the project is left untouched.
    ///
    pub fn reload(&mut self, config: &ProjectConfig) -> Result<()> {
        let (registry, genomes) = build(config, &self.chromosomes)?;
        self.shifts.replace(registry);
        self.genomes = genomes;
        Ok(())
    }

    pub fn chromosomes(&self) -> &ProjectChromosomes {
        &self.chromosomes
    }

    pub fn shifts(&self) -> Arc<ShiftRegistry> {
        self.shifts.snapshot()
    }

    pub fn genomes(&self) -> &[GenomeVariants] {
        &self.genomes
    }

    pub fn genome(&self, name: &str) -> Option<&GenomeVariants> {
        self.genomes.iter().find(|genome| genome.name == name)
    }

    /// A fresh cursor over one allele list.
    pub fn iterator(
        &self,
        genome: &str,
        slot: AlleleSlot,
        chromosome: usize,
        display_dependant: bool,
    ) -> Option<VariantDisplayListIterator<'_>> {
        let list = self.genome(genome)?.allele(slot).get(chromosome)?;
        Some(VariantDisplayListIterator::new(list, display_dependant))
    }

    /// Apply `policy` to the variants of `variant_type` of every list.
    pub fn set_display_policy(&mut self, variant_type: VariantType, policy: DisplayPolicy) {
        self.genomes
            .iter_mut()
            .flat_map(|genome| genome.alleles.iter_mut())
            .flat_map(|alleles| alleles.iter_mut())
            .for_each(|list| list.set_display_policy(variant_type, policy));
    }
}
