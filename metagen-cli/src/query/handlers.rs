use std::fs::File;
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::ArgMatches;

use metagen_tabix::TabixReader;

pub fn run_query(matches: &ArgMatches) -> Result<()> {
    let file = matches
        .get_one::<String>("file")
        .context("A path to a bgzipped file is required.")?;
    let regions: Vec<&String> = matches.get_many::<String>("regions").unwrap_or_default().collect();

    let mut reader: TabixReader<File> = match matches.get_one::<String>("index") {
        Some(index) => TabixReader::open_with_index(file, index),
        None => TabixReader::open(file),
    }
    .with_context(|| format!("Failed to open {file}"))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if matches.get_flag("list-chroms") {
        for name in reader.index().sequence_names() {
            writeln!(out, "{name}")?;
        }
        out.flush()?;
        return Ok(());
    }

    if matches.get_flag("header") {
        for line in reader.header_lines()? {
            writeln!(out, "{line}")?;
        }
    }

    for region in regions {
        let lines = reader
            .query_region(region)
            .with_context(|| format!("Failed to query {region}"))?;
        for line in lines {
            writeln!(out, "{}", line?)?;
        }
    }

    out.flush()?;
    Ok(())
}
