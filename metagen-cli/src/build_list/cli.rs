use clap::{Arg, Command, arg};

pub const BUILD_LIST_CMD: &str = "build-list";

pub fn create_build_list_cli() -> Command {
    Command::new(BUILD_LIST_CMD)
        .author("The metagen developers")
        .about("Build a position sorted genome-wide list from a bedGraph, repeat or gene file and save it as a snapshot.")
        .arg(Arg::new("input").required(true).help("Input file, plain or gzipped"))
        .arg(
            arg!(--"chrom-sizes" <chrom_sizes>)
                .required(true)
                .help("Chromosome sizes of the project"),
        )
        .arg(arg!(--output <output>).required(true).help("Snapshot path"))
        .arg(
            arg!(--kind <kind>)
                .value_parser(["intervals", "repeats", "genes"])
                .default_value("intervals"),
        )
        .arg(
            arg!(--layout <layout>)
                .value_parser(["dense", "sparse"])
                .help("Interval list layout, dense by default"),
        )
        .arg(
            arg!(--precision <precision>)
                .value_parser(["half", "full"])
                .help("Interval score precision, full by default"),
        )
        .arg(
            arg!(--threads <threads>)
                .value_parser(clap::value_parser!(usize))
                .default_value("0")
                .help("Worker threads, 0 uses one per core"),
        )
        .arg(arg!(--registry <registry>).help("Shift registry snapshot; intervals are moved to meta-genome coordinates"))
        .arg(
            arg!(--genome <genome>)
                .requires("registry")
                .help("Genome the intervals are native to, defaults to the reference"),
        )
}
