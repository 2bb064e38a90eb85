use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;

use metagen_core::models::GenomeWindow;
use metagen_core::snapshot::load_snapshot;
use metagen_multigenome::ShiftRegistry;

pub fn translate_window(registry: &ShiftRegistry, genome: &str, to: &str, window: &str) -> Result<GenomeWindow> {
    let window: GenomeWindow = window
        .parse()
        .with_context(|| format!("Invalid window: {window}"))?;
    let translated = match to {
        "native" => registry.to_native_window(genome, &window)?,
        _ => registry.to_meta_window(genome, &window)?,
    };
    Ok(translated)
}

pub fn run_translate(matches: &ArgMatches) -> Result<()> {
    let registry_path = matches
        .get_one::<String>("registry")
        .context("A path to a shift registry is required.")?;
    let registry: ShiftRegistry = load_snapshot(registry_path)
        .with_context(|| format!("Failed to load the shift registry {registry_path}"))?;

    let genome = matches
        .get_one::<String>("genome")
        .map(String::as_str)
        .unwrap_or(registry.reference_name());
    let to = matches
        .get_one::<String>("to")
        .map(String::as_str)
        .unwrap_or("meta");

    let mut out = io::stdout().lock();
    for window in matches.get_many::<String>("windows").unwrap_or_default() {
        let translated = translate_window(&registry, genome, to, window)?;
        writeln!(out, "{window}\t{translated}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use metagen_core::models::{Chromosome, ProjectChromosomes};
    use metagen_multigenome::{GenomeEvents, IndelEvent, synchronize};
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn registry() -> ShiftRegistry {
        let chromosomes = ProjectChromosomes::new(vec![Chromosome::new("chr1", 100)]).unwrap();
        let genomes = vec![GenomeEvents::new("child", vec![IndelEvent::insertion(0, 9, 3)])];
        synchronize(&chromosomes, "reference", genomes, 1).unwrap()
    }

    #[rstest]
    #[case("reference", "meta", "chr1:5-30", "chr1:5-33")]
    #[case("reference", "native", "chr1:5-33", "chr1:5-30")]
    #[case("child", "meta", "chr1:5-30", "chr1:5-30")]
    fn test_translate_window(
        registry: ShiftRegistry,
        #[case] genome: &str,
        #[case] to: &str,
        #[case] window: &str,
        #[case] expected: &str,
    ) {
        let translated = translate_window(&registry, genome, to, window).unwrap();
        assert_eq!(translated.to_string(), expected);
    }

    #[rstest]
    fn test_unknown_genome(registry: ShiftRegistry) {
        assert!(translate_window(&registry, "mother", "meta", "chr1:5-30").is_err());
        assert!(translate_window(&registry, "child", "meta", "chr1:30").is_err());
    }
}
