use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikihop")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikihop")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("search")
                .about(
                    "Find a chain of article links from one Wikipedia page to another using \
                breadth-first search over the page-link graph.",
                )
                .arg(arg!(<START> "Title of the page to start from"))
                .arg(arg!(<DEST> "Title of the page to reach"))
                .arg(
                    arg!(-g --"guided")
                        .required(false)
                        .help("Rank links by lexical relatedness to the destination (needs a WordNet dictionary)")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"sequential")
                        .required(false)
                        .help("Fetch one page at a time instead of batching concurrent requests")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-b --"batch-size" <N>)
                        .required(false)
                        .help("Pages fetched concurrently per batch")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("32"),
                )
                .arg(
                    arg!(-n --"top-n" <N>)
                        .required(false)
                        .help("Links kept per expanded page in guided mode")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("7"),
                )
                .arg(
                    arg!(--"threshold" <SCORE>)
                        .required(false)
                        .help("Minimum relatedness for category words to join the target word set")
                        .value_parser(clap::value_parser!(f32))
                        .default_value("0.4"),
                )
                .arg(
                    arg!(--"api" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint (default: the English Wikipedia)")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(--"wordnet-dir" <PATH>)
                        .required(false)
                        .help("WordNet dict directory (default: ~/.wikihop/wordnet, or $WIKIHOP_WORDNET_DIR)"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the report to a file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"no-progress")
                        .required(false)
                        .help("Disable the live current-page line")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("resolve")
                .about("Resolve free-form input to the canonical page title")
                .arg(arg!(<QUERY> "The page name to resolve"))
                .arg(
                    arg!(--"api" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint (default: the English Wikipedia)")
                        .value_parser(clap::value_parser!(Url)),
                ),
        )
        .subcommand(
            command!("links")
                .about("List the outbound article links of a page")
                .arg(arg!(<TITLE> "The page title to list links for"))
                .arg(
                    arg!(--"api" <URL>)
                        .required(false)
                        .help("MediaWiki API endpoint (default: the English Wikipedia)")
                        .value_parser(clap::value_parser!(Url)),
                ),
        )
}
