use clap::{Arg, ArgAction, Command, arg};

pub const QUERY_CMD: &str = "query";

pub fn create_query_cli() -> Command {
    Command::new(QUERY_CMD)
        .author("The metagen developers")
        .about("Print the lines of a bgzipped, tabix indexed file overlapping one or more regions.")
        .arg(Arg::new("file").required(true).help("Path to the bgzipped file"))
        .arg(
            Arg::new("regions")
                .num_args(0..)
                .help("Regions as chr, chr:beg or chr:beg-end (1-based, inclusive)"),
        )
        .arg(arg!(--index <index>).help("Index path, defaults to <file>.tbi"))
        .arg(
            arg!(--header)
                .help("Print the header lines first")
                .action(ArgAction::SetTrue),
        )
        .arg(
            arg!(--"list-chroms")
                .help("List the indexed sequence names and exit")
                .action(ArgAction::SetTrue),
        )
}
