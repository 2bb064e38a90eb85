use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::WindowError;
use crate::search::Positioned;

///
/// A window [start, stop) on one chromosome, in a single coordinate space
/// (either a genome's native space or the meta-genome space).
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct GenomeWindow {
    chromosome: String,
    start: u32,
    stop: u32,
}

impl GenomeWindow {
    pub fn new(chromosome: impl Into<String>, start: u32, stop: u32) -> Result<Self, WindowError> {
        if start > stop {
            return Err(WindowError::InvalidBounds { start, stop });
        }
        Ok(GenomeWindow {
            chromosome: chromosome.into(),
            start,
            stop,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn stop(&self) -> u32 {
        self.stop
    }

    pub fn width(&self) -> u32 {
        self.stop - self.start
    }

    pub fn contains(&self, position: u32) -> bool {
        self.start <= position && position < self.stop
    }
}

impl Positioned for GenomeWindow {
    fn start(&self) -> u32 {
        self.start
    }

    fn stop(&self) -> u32 {
        self.stop
    }
}

impl Display for GenomeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.stop)
    }
}

impl FromStr for GenomeWindow {
    type Err = WindowError;

    /// Parse a `chr:start-stop` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chromosome, range) = s
            .rsplit_once(':')
            .ok_or_else(|| WindowError::ParseError(s.to_string()))?;
        let (start, stop) = range
            .split_once('-')
            .ok_or_else(|| WindowError::ParseError(s.to_string()))?;

        let start = start
            .trim()
            .replace(',', "")
            .parse::<u32>()
            .map_err(|_| WindowError::ParseError(s.to_string()))?;
        let stop = stop
            .trim()
            .replace(',', "")
            .parse::<u32>()
            .map_err(|_| WindowError::ParseError(s.to_string()))?;

        GenomeWindow::new(chromosome, start, stop)
    }
}
