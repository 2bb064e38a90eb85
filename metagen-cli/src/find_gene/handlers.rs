use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;

use metagen_core::models::ProjectChromosomes;
use metagen_core::utils::read_chromosome_sizes;
use metagen_lists::loader::load_gene_list;
use metagen_lists::{GeneSearchOptions, GeneSearcher};

/// Parse `chr:position` against the project chromosomes.
pub fn parse_start(value: &str, chromosomes: &ProjectChromosomes) -> Result<(usize, u32)> {
    let (name, position) = value
        .rsplit_once(':')
        .with_context(|| format!("Invalid start position: {value}"))?;
    let chromosome = chromosomes
        .index_of(name)
        .with_context(|| format!("Unknown chromosome: {name}"))?;
    let position = position
        .replace(',', "")
        .parse::<u32>()
        .with_context(|| format!("Invalid start position: {value}"))?;
    Ok((chromosome, position))
}

pub fn run_find_gene(matches: &ArgMatches) -> Result<()> {
    let genes_path = matches
        .get_one::<String>("genes")
        .context("A path to a gene file is required.")?;
    let query = matches
        .get_one::<String>("query")
        .context("A gene name is required.")?;
    let sizes = matches
        .get_one::<String>("chrom-sizes")
        .context("A path to a chromosome sizes file is required.")?;
    let count = matches.get_one::<usize>("count").copied().unwrap_or(1);
    let backward = matches.get_flag("previous");

    let chromosomes = read_chromosome_sizes(sizes)?;
    let genes = load_gene_list(genes_path, &chromosomes, 0)?;

    let mut searcher = GeneSearcher::new(&genes);
    searcher.set_options(GeneSearchOptions {
        case_sensitive: matches.get_flag("case-sensitive"),
        whole_word: matches.get_flag("whole-word"),
    });
    if let Some(from) = matches.get_one::<String>("from") {
        let (chromosome, position) = parse_start(from, &chromosomes)?;
        searcher.set_start_position(chromosome, position);
    }

    let mut out = io::stdout().lock();
    let mut seen = Vec::new();
    for _ in 0..count {
        let hit = match backward {
            true => searcher.search_previous(query),
            false => searcher.search_next(query),
        };
        let Some(hit) = hit else {
            break;
        };
        // wrapped around to the first hit
        if seen.contains(&(hit.chromosome, hit.index)) {
            break;
        }
        seen.push((hit.chromosome, hit.index));

        let name = chromosomes
            .get(hit.chromosome)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        writeln!(
            out,
            "{name}\t{}\t{}\t{}\t{}",
            hit.gene.start, hit.gene.stop, hit.gene.name, hit.gene.strand
        )?;
    }

    if seen.is_empty() {
        log::warn!("No gene matches {query}");
    }
    Ok(())
}
