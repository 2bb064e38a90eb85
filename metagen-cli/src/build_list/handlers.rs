use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::ProgressBar;

use metagen_core::models::{ListLayout, ScorePrecision};
use metagen_core::snapshot::{load_snapshot, save_snapshot};
use metagen_core::utils::read_chromosome_sizes;
use metagen_lists::{CoordinateTranslator, ListOptions};
use metagen_lists::loader::{load_gene_list, load_interval_list, load_repeat_list};
use metagen_multigenome::ShiftRegistry;

pub fn parse_layout(value: Option<&String>) -> Result<ListLayout> {
    match value.map(String::as_str) {
        None | Some("dense") => Ok(ListLayout::Dense),
        Some("sparse") => Ok(ListLayout::Sparse),
        Some(other) => anyhow::bail!("Unknown list layout supplied: {}", other),
    }
}

pub fn parse_precision(value: Option<&String>) -> Result<ScorePrecision> {
    match value.map(String::as_str) {
        None | Some("full") => Ok(ScorePrecision::Full),
        Some("half") => Ok(ScorePrecision::Half),
        Some(other) => anyhow::bail!("Unknown score precision supplied: {}", other),
    }
}

pub fn run_build_list(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("A path to an input file is required.")?;
    let sizes = matches
        .get_one::<String>("chrom-sizes")
        .context("A path to a chromosome sizes file is required.")?;
    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;
    let kind = matches
        .get_one::<String>("kind")
        .map(String::as_str)
        .unwrap_or("intervals");

    let options = ListOptions {
        layout: parse_layout(matches.get_one::<String>("layout"))?,
        precision: parse_precision(matches.get_one::<String>("precision"))?,
        threads: matches.get_one::<usize>("threads").copied().unwrap_or(0),
    };

    let chromosomes = read_chromosome_sizes(sizes)?;
    let registry: Option<ShiftRegistry> = matches
        .get_one::<String>("registry")
        .map(|path| {
            load_snapshot(path).with_context(|| format!("Failed to load the shift registry {path}"))
        })
        .transpose()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Building {kind} from {input}"));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = match kind {
        "repeats" => {
            let lists = load_repeat_list(input, &chromosomes, options.threads)?;
            save_snapshot(&lists, output)
        }
        "genes" => {
            let lists = load_gene_list(input, &chromosomes, options.threads)?;
            save_snapshot(&lists, output)
        }
        _ => {
            let translator = match &registry {
                Some(registry) => {
                    let genome = matches
                        .get_one::<String>("genome")
                        .map(String::as_str)
                        .unwrap_or(registry.reference_name());
                    Some(registry.translator(genome)?)
                }
                None => None,
            };
            let lists = load_interval_list(
                input,
                &chromosomes,
                &options,
                translator.as_ref().map(|t| t as &dyn CoordinateTranslator),
            )?;
            save_snapshot(&lists, output)
        }
    };
    spinner.finish_and_clear();

    result.with_context(|| format!("Failed to save {}", Path::new(output).display()))?;
    log::info!("Saved {kind} of {} chromosomes to {output}", chromosomes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(None, ListLayout::Dense)]
    #[case(Some("dense"), ListLayout::Dense)]
    #[case(Some("sparse"), ListLayout::Sparse)]
    fn test_parse_layout(#[case] value: Option<&str>, #[case] expected: ListLayout) {
        let value = value.map(str::to_string);
        assert_eq!(parse_layout(value.as_ref()).unwrap(), expected);
    }

    #[rstest]
    fn test_parse_unknown_values() {
        assert!(parse_layout(Some(&"packed".to_string())).is_err());
        assert!(parse_precision(Some(&"double".to_string())).is_err());
        assert_eq!(parse_precision(Some(&"half".to_string())).unwrap(), ScorePrecision::Half);
    }
}
