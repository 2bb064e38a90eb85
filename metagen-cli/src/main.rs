mod build_list;
mod find_gene;
mod query;
mod sync;
mod translate;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "metagen";
    pub const BIN_NAME: &str = "metagen";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("The metagen developers")
        .about("Multi-genome coordinate synchronization, indexed variant queries and position sorted genomic lists.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(query::cli::create_query_cli())
        .subcommand(sync::cli::create_sync_cli())
        .subcommand(translate::cli::create_translate_cli())
        .subcommand(build_list::cli::create_build_list_cli())
        .subcommand(find_gene::cli::create_find_gene_cli())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_flag("verbose"));

    match matches.subcommand() {
        //
        // TABIX QUERY
        //
        Some((query::cli::QUERY_CMD, matches)) => {
            query::handlers::run_query(matches)?;
        }

        //
        // META-GENOME SYNCHRONIZATION
        //
        Some((sync::cli::SYNC_CMD, matches)) => {
            sync::handlers::run_sync(matches)?;
        }

        //
        // COORDINATE TRANSLATION
        //
        Some((translate::cli::TRANSLATE_CMD, matches)) => {
            translate::handlers::run_translate(matches)?;
        }

        //
        // LIST BUILDING
        //
        Some((build_list::cli::BUILD_LIST_CMD, matches)) => {
            build_list::handlers::run_build_list(matches)?;
        }

        //
        // GENE SEARCH
        //
        Some((find_gene::cli::FIND_GENE_CMD, matches)) => {
            find_gene::handlers::run_find_gene(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_author_is_the_project() {
        let parser = build_parser();
        assert_eq!(parser.get_author(), Some("The metagen developers"));
        for subcommand in parser.get_subcommands() {
            assert_eq!(subcommand.get_author(), Some("The metagen developers"));
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let matches = build_parser()
            .try_get_matches_from(["metagen", "sync", "project.toml", "--verbose"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }
}
