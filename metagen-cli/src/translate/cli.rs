use clap::{Arg, Command, arg};

pub const TRANSLATE_CMD: &str = "translate";

pub fn create_translate_cli() -> Command {
    Command::new(TRANSLATE_CMD)
        .author("The metagen developers")
        .about("Translate windows between the coordinates of a genome and the meta-genome.")
        .arg(
            arg!(--registry <registry>)
                .required(true)
                .help("Shift registry snapshot written by sync"),
        )
        .arg(arg!(--genome <genome>).help("Genome name, defaults to the reference"))
        .arg(
            arg!(--to <to>)
                .value_parser(["meta", "native"])
                .default_value("meta")
                .help("Target coordinate space"),
        )
        .arg(
            Arg::new("windows")
                .num_args(1..)
                .required(true)
                .help("Windows as chr:start-stop, zero-based and half-open"),
        )
}
