use fxhash::FxHashMap as HashMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::errors::ChromosomeError;

///
/// A chromosome of the project genome: a name and a length in base pairs.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct Chromosome {
    pub name: String,
    pub length: u32,
}

impl Chromosome {
    pub fn new(name: impl Into<String>, length: u32) -> Self {
        Chromosome {
            name: name.into(),
            length,
        }
    }
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.name, self.length)
    }
}

///
/// Ordered registry of the chromosomes of a project.
///
/// The position of a chromosome in the registry is its index: every
/// genome-wide list stores one sublist per chromosome at that same index.
/// Name lookups are case-insensitive.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Chromosome>", into = "Vec<Chromosome>")]
pub struct ProjectChromosomes {
    chromosomes: Vec<Chromosome>,
    index: HashMap<String, usize>,
    genome_length: u64,
}

impl ProjectChromosomes {
    pub fn new(chromosomes: Vec<Chromosome>) -> Result<Self, ChromosomeError> {
        let mut index = HashMap::with_capacity_and_hasher(chromosomes.len(), Default::default());
        let mut genome_length = 0u64;

        for (i, chromosome) in chromosomes.iter().enumerate() {
            if index.insert(chromosome.name.to_lowercase(), i).is_some() {
                return Err(ChromosomeError::DuplicateName(chromosome.name.clone()));
            }
            genome_length += chromosome.length as u64;
        }

        Ok(ProjectChromosomes {
            chromosomes,
            index,
            genome_length,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Chromosome> {
        self.chromosomes.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Chromosome> {
        self.index_of(name).map(|i| &self.chromosomes[i])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Sum of the lengths of every chromosome.
    pub fn genome_length(&self) -> u64 {
        self.genome_length
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chromosome> {
        self.chromosomes.iter()
    }

    pub fn as_slice(&self) -> &[Chromosome] {
        &self.chromosomes
    }
}

impl TryFrom<Vec<Chromosome>> for ProjectChromosomes {
    type Error = ChromosomeError;

    fn try_from(value: Vec<Chromosome>) -> Result<Self, Self::Error> {
        ProjectChromosomes::new(value)
    }
}

impl From<ProjectChromosomes> for Vec<Chromosome> {
    fn from(value: ProjectChromosomes) -> Self {
        value.chromosomes
    }
}

impl<'a> IntoIterator for &'a ProjectChromosomes {
    type Item = &'a Chromosome;
    type IntoIter = std::slice::Iter<'a, Chromosome>;

    fn into_iter(self) -> Self::IntoIter {
        self.chromosomes.iter()
    }
}
