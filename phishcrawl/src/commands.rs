use crate::CLAP_STYLING;
use clap::{arg, command};
use phishcrawl_scanner::Label;

pub fn command_argument_builder() -> clap::Command {
    let labels: Vec<&'static str> = Label::ALL.iter().map(|label| label.as_str()).collect();

    clap::Command::new("phishcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("phishcrawl")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and progress output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Emit debug logs on stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            command!("crawl")
                .about("Crawls labeled seed URLs and writes one feature record per page")
                .arg(
                    arg!(-s --"seeds" <PATH>)
                        .required(true)
                        .help("CSV file with `url` and `type` columns (benign, phishing, malware)"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("JSON Lines output file; `-` or absent writes to stdout"),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("JSON config file; command-line flags override its values"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of async workers in the crawl pool [default: 10]")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Per-request timeout in seconds [default: 10]")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-d --"depth" <LABEL_DEPTH>)
                        .required(false)
                        .help("Override the depth ceiling for one label, e.g. `malware=4`")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"exclude-ext" <EXT>)
                        .required(false)
                        .help("Extension to leave uncrawled; replaces the default list when given")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"skip-label" <LABEL>)
                        .required(false)
                        .help("Do not fetch seeds carrying this label")
                        .value_parser(labels)
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"include-text")
                        .required(false)
                        .help("Add a visible-text excerpt to every record")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"deadline" <SECONDS>)
                        .required(false)
                        .help("Cancel the crawl after this many seconds, keeping collected records")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the progress spinner")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
