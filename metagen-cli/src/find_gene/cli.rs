use clap::{Arg, ArgAction, Command, arg};

pub const FIND_GENE_CMD: &str = "find-gene";

pub fn create_find_gene_cli() -> Command {
    Command::new(FIND_GENE_CMD)
        .author("The metagen developers")
        .about("Search a BED gene annotation by gene name, starting from a position and wrapping around the genome.")
        .arg(Arg::new("genes").required(true).help("BED6 or BED12 gene file, plain or gzipped"))
        .arg(Arg::new("query").required(true).help("Gene name or part of it"))
        .arg(
            arg!(--"chrom-sizes" <chrom_sizes>)
                .required(true)
                .help("Chromosome sizes of the project"),
        )
        .arg(arg!(--from <from>).help("Start position as chr:position"))
        .arg(
            arg!(--count <count>)
                .value_parser(clap::value_parser!(usize))
                .default_value("1")
                .help("Number of hits to print"),
        )
        .arg(arg!(--previous).action(ArgAction::SetTrue).help("Search backward"))
        .arg(arg!(--"case-sensitive").action(ArgAction::SetTrue))
        .arg(arg!(--"whole-word").action(ArgAction::SetTrue))
}
