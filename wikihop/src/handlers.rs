use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use url::Url;
use wikihop_core::report::{render, save_report, PathReport, ReportFormat};
use wikihop_core::{execute_search, SearchCancelled, SearchOptions};
use wikihop_engine::{PageSource, WikiClient};

pub const WORDNET_DIR_ENV: &str = "WIKIHOP_WORDNET_DIR";
pub const DEFAULT_WORDNET_DIR: &str = "~/.wikihop/wordnet";

/// Pick the WordNet dictionary directory: explicit flag first, then the
/// environment variable, then the default. Tildes are expanded.
pub fn resolve_wordnet_dir(flag: Option<&String>) -> PathBuf {
    let raw = flag
        .cloned()
        .or_else(|| std::env::var(WORDNET_DIR_ENV).ok())
        .unwrap_or_else(|| DEFAULT_WORDNET_DIR.to_string());
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_magenta().bold());
}

fn client_for(args: &ArgMatches) -> WikiClient {
    let mut client = WikiClient::new();
    if let Some(api_url) = args.get_one::<Url>("api") {
        client = client.with_api_url(api_url.clone());
    }
    client
}

pub async fn handle_search(args: &ArgMatches) {
    let start = args.get_one::<String>("START").unwrap();
    let dest = args.get_one::<String>("DEST").unwrap();
    let guided = args.get_flag("guided");
    let sequential = args.get_flag("sequential");

    print_divider();
    println!(
        "{} {} {} {}",
        "Searching from".blue(),
        start.bright_white().bold(),
        "to".blue(),
        dest.bright_white().bold()
    );
    println!(
        "{} {}, {}",
        "Mode:".blue(),
        if guided { "guided" } else { "plain BFS" },
        if sequential { "sequential" } else { "batched" }
    );
    print_divider();
    println!();

    let options = SearchOptions {
        start: start.clone(),
        dest: dest.clone(),
        guided,
        sequential,
        batch_size: *args.get_one::<usize>("batch-size").unwrap(),
        top_n: *args.get_one::<usize>("top-n").unwrap(),
        category_threshold: *args.get_one::<f32>("threshold").unwrap(),
        api_url: args.get_one::<Url>("api").cloned(),
        wordnet_dir: guided.then(|| resolve_wordnet_dir(args.get_one::<String>("wordnet-dir"))),
        timeout_secs: *args.get_one::<u64>("timeout").unwrap(),
        retries: 2,
        show_progress: !args.get_flag("no-progress"),
    };

    match execute_search(options).await {
        Ok(report) => {
            let path_report = PathReport::from_search(&report);
            // One rendering of the text report; the console only adds color.
            let text = match render(&path_report, ReportFormat::Text) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("{} Failed to render report: {:#}", "✗".red().bold(), e);
                    std::process::exit(1);
                }
            };
            let mut lines = text.lines();
            if let Some(headline) = lines.next() {
                if path_report.found {
                    println!("{}", headline.magenta().bold());
                } else {
                    println!("{}", headline.yellow());
                }
            }
            for line in lines {
                println!("{}", line);
            }

            if let Some(output) = args.get_one::<PathBuf>("output") {
                let format = ReportFormat::from_str(args.get_one::<String>("format").unwrap())
                    .unwrap_or(ReportFormat::Text);
                let rendered = match format {
                    ReportFormat::Text => text,
                    ReportFormat::Json => match render(&path_report, format) {
                        Ok(rendered) => rendered,
                        Err(e) => {
                            eprintln!("{} Failed to render report: {:#}", "✗".red().bold(), e);
                            std::process::exit(1);
                        }
                    },
                };
                if let Err(e) = save_report(&rendered, output) {
                    eprintln!("{} Failed to save report: {:#}", "✗".red().bold(), e);
                    std::process::exit(1);
                }
                println!(
                    "{} Report saved to {}",
                    "✓".green().bold(),
                    output.display().to_string().bright_white()
                );
            }
        }
        Err(e) => {
            if let Some(cancelled) = e.downcast_ref::<SearchCancelled>() {
                eprintln!(
                    "{}",
                    format!(
                        "Search cancelled after {:.2} s ({} pages visited)",
                        cancelled.elapsed.as_secs_f64(),
                        cancelled.pages_visited
                    )
                    .yellow()
                    .bold()
                );
            } else {
                eprintln!("{} Search failed: {:#}", "✗".red().bold(), e);
            }
            std::process::exit(1);
        }
    }
}

pub async fn handle_resolve(args: &ArgMatches) {
    let query = args.get_one::<String>("QUERY").unwrap();
    let client = client_for(args);

    match client.resolve_title(query).await {
        Ok(title) => println!("{}", title.bright_white().bold()),
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}

pub async fn handle_links(args: &ArgMatches) {
    let title = args.get_one::<String>("TITLE").unwrap();
    let client = client_for(args);

    let resolved = match client.resolve_title(title).await {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    };

    match client.links(&resolved).await {
        Ok(links) => {
            println!(
                "{} {} {}",
                resolved.bright_white().bold(),
                "links to".blue(),
                format!("{} articles", links.len()).bright_white()
            );
            for link in links {
                println!("  {}", link);
            }
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    }
}
