pub mod report;
pub mod run;
pub mod wordnet;

use colored::Colorize;

pub use run::{execute_search, SearchCancelled, SearchOptions, SearchReport};
pub use wordnet::WordNet;

pub fn print_banner() {
    let banner = r#"
           _ _    _ _
 __      _(_) | _(_) |__   ___  _ __
 \ \ /\ / / | |/ / | '_ \ / _ \| '_ \
  \ V  V /| |   <| | | | | (_) | |_) |
   \_/\_/ |_|_|\_\_|_| |_|\___/| .__/
                               |_|
"#;
    println!("{}", banner.magenta().bold());
    println!(
        "{} {} - {}",
        "wikihop".bright_white().bold(),
        env!("CARGO_PKG_VERSION"),
        "hop from one Wikipedia page to another".bright_black()
    );
    println!();
}
