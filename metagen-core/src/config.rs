use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::models::{ListLayout, ScorePrecision};

pub const DEFAULT_REFERENCE_GENOME: &str = "reference";

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct GenomeConfig {
    pub name: String,
    pub vcf: PathBuf,
    /// Sample column of the VCF holding this genome, defaults to `name`.
    pub sample: Option<String>,
}

impl GenomeConfig {
    pub fn sample(&self) -> &str {
        self.sample.as_deref().unwrap_or(&self.name)
    }
}

///
/// Project description loaded from a TOML file.
///
/// Relative paths are resolved against the folder holding the file.
///
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct ProjectConfig {
    pub chromosome_sizes: PathBuf,
    pub reference_genome: Option<String>,
    pub threads: Option<usize>,
    pub score_precision: Option<ScorePrecision>,
    pub list_layout: Option<ListLayout>,
    #[serde(default)]
    pub genomes: Vec<GenomeConfig>,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ProjectConfig {
    pub fn reference_genome(&self) -> &str {
        self.reference_genome
            .as_deref()
            .unwrap_or(DEFAULT_REFERENCE_GENOME)
    }

    /// Worker count for chromosome-parallel work; 0 lets the pool decide.
    pub fn threads(&self) -> usize {
        self.threads.unwrap_or(0)
    }

    pub fn score_precision(&self) -> ScorePrecision {
        self.score_precision.unwrap_or_default()
    }

    pub fn list_layout(&self) -> ListLayout {
        self.list_layout.unwrap_or_default()
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.chromosome_sizes.as_os_str().is_empty() {
            return Err(ConfigError::Missing("chromosome_sizes".to_string()));
        }
        let mut seen = HashSet::new();
        for genome in &self.genomes {
            if genome.name == self.reference_genome() || !seen.insert(genome.name.as_str()) {
                return Err(ConfigError::DuplicateGenome(genome.name.clone()));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.chromosome_sizes);
        for genome in self.genomes.iter_mut() {
            resolve(&mut genome.vcf);
        }
    }
}

impl TryFrom<&Path> for ProjectConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let mut config: ProjectConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }
}
