use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

use crate::errors::ChromosomeError;
use crate::models::{Chromosome, ProjectChromosomes};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = matches!(
        path.extension().and_then(OsStr::to_str),
        Some("gz") | Some("bgz")
    );
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Parse a `name<whitespace>length` chromosome sizes listing, keeping file order.
pub fn parse_chromosome_sizes<R: BufRead>(reader: R) -> Result<Vec<Chromosome>, ChromosomeError> {
    let mut chromosomes = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = fields
            .next()
            .ok_or_else(|| ChromosomeError::ParseError(line.to_string()))?;
        let length = fields
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| ChromosomeError::ParseError(line.to_string()))?;

        chromosomes.push(Chromosome::new(name, length));
    }

    Ok(chromosomes)
}

///
/// Read a chromosome sizes file (e.g. `hg19.chrom.sizes`) into the project registry.
///
pub fn read_chromosome_sizes<P: AsRef<Path>>(path: P) -> Result<ProjectChromosomes> {
    let path = path.as_ref();
    let reader = get_dynamic_reader(path)?;
    let chromosomes = parse_chromosome_sizes(reader)
        .with_context(|| format!("Failed to parse chromosome sizes: {}", path.display()))?;

    if chromosomes.is_empty() {
        return Err(ChromosomeError::Empty(path.display().to_string()).into());
    }

    log::debug!("Loaded {} chromosomes from {}", chromosomes.len(), path.display());
    Ok(ProjectChromosomes::new(chromosomes)?)
}
