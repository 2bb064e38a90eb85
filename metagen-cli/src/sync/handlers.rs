use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;
use indicatif::ProgressBar;

use metagen_core::snapshot::save_snapshot;
use metagen_multigenome::{AlleleSlot, MultiGenomeProject};

use super::cli::DEFAULT_OUT;

fn write_meta_sizes<W: Write>(mut out: W, project: &MultiGenomeProject) -> Result<()> {
    for chromosome in project.shifts().meta_chromosomes() {
        writeln!(out, "{chromosome}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn run_sync(matches: &ArgMatches) -> Result<()> {
    let project_path = matches
        .get_one::<String>("project")
        .context("A path to a project file is required.")?;
    let default_out = DEFAULT_OUT.to_string();
    let output = matches.get_one::<String>("output").unwrap_or(&default_out);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Synchronizing {project_path}"));
    spinner.enable_steady_tick(Duration::from_millis(120));
    let project = MultiGenomeProject::from_path(Path::new(project_path));
    spinner.finish_and_clear();
    let project = project?;

    for genome in project.genomes() {
        let [first, second] = AlleleSlot::ALL.map(|slot| {
            genome
                .allele(slot)
                .iter()
                .map(|list| list.variants().len())
                .sum::<usize>()
        });
        log::info!("{}: {first} + {second} variants", genome.name);
    }

    save_snapshot(project.shifts().as_ref(), output)
        .with_context(|| format!("Failed to save the shift registry to {output}"))?;
    log::info!("Shift registry saved to {output}");

    match matches.get_one::<String>("meta-sizes") {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            write_meta_sizes(BufWriter::new(file), &project)?;
        }
        None => write_meta_sizes(io::stdout().lock(), &project)?,
    }

    Ok(())
}
