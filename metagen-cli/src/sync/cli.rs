use clap::{Arg, Command, arg};

pub const SYNC_CMD: &str = "sync";
pub const DEFAULT_OUT: &str = "shifts.mgsn";

pub fn create_sync_cli() -> Command {
    Command::new(SYNC_CMD)
        .author("The metagen developers")
        .about("Synchronize the genomes of a project into one meta-genome and save the shift registry.")
        .arg(Arg::new("project").required(true).help("Path to the project TOML file"))
        .arg(arg!(--output <output>).help("Shift registry snapshot, defaults to shifts.mgsn"))
        .arg(arg!(--"meta-sizes" <meta_sizes>).help("Also write the meta-genome chromosome sizes here"))
}
