//! Wires the traversal engine to the real collaborators and runs one search
//! end to end: HTTP client, WordNet oracle, progress display, Ctrl-C
//! handling and timing.

use crate::wordnet::WordNet;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;
use url::Url;
use wikihop_engine::scorer::{DEFAULT_CATEGORY_THRESHOLD, DEFAULT_TOP_N};
use wikihop_engine::{FetchMode, PathFinder, Scorer, SearchError, Strategy, WikiClient};

/// Options for configuring a search run.
pub struct SearchOptions {
    pub start: String,
    pub dest: String,
    /// Rank links by lexical relatedness to the destination instead of
    /// expanding everything.
    pub guided: bool,
    /// One link fetch at a time instead of batched concurrent fetches.
    pub sequential: bool,
    pub batch_size: usize,
    pub top_n: usize,
    pub category_threshold: f32,
    pub api_url: Option<Url>,
    /// Required when `guided` is set.
    pub wordnet_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub retries: usize,
    pub show_progress: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            start: String::new(),
            dest: String::new(),
            guided: false,
            sequential: false,
            batch_size: 32,
            top_n: DEFAULT_TOP_N,
            category_threshold: DEFAULT_CATEGORY_THRESHOLD,
            api_url: None,
            wordnet_dir: None,
            timeout_secs: 10,
            retries: 2,
            show_progress: true,
        }
    }
}

/// A search the user interrupted. Keeps the time spent and the page count
/// so the caller can still report them.
#[derive(Debug, Error)]
#[error("search cancelled after {:.2} s", .elapsed.as_secs_f64())]
pub struct SearchCancelled {
    pub elapsed: Duration,
    pub pages_visited: usize,
}

/// What one finished search produced.
#[derive(Debug)]
pub struct SearchReport {
    pub start: String,
    pub dest: String,
    /// Empty when no path was found or start and dest are the same page.
    pub path: Vec<String>,
    pub pages_visited: usize,
    pub elapsed: Duration,
}

/// Execute a search with the given options.
///
/// Exhaustion comes back as a report with an empty path; cancellation and
/// title resolution failures are errors.
pub async fn execute_search(options: SearchOptions) -> Result<SearchReport> {
    let SearchOptions {
        start,
        dest,
        guided,
        sequential,
        batch_size,
        top_n,
        category_threshold,
        api_url,
        wordnet_dir,
        timeout_secs,
        retries,
        show_progress,
    } = options;

    let mut client = WikiClient::with_timeout(timeout_secs).with_retries(retries);
    if let Some(api_url) = api_url {
        client = client.with_api_url(api_url);
    }

    let mut finder = PathFinder::new(Arc::new(client))
        .with_batch_size(batch_size)
        .with_top_n(top_n)
        .with_fetch_mode(if sequential {
            FetchMode::Sequential
        } else {
            FetchMode::Batched
        });

    if guided {
        let dict_dir = wordnet_dir.context("guided mode needs a WordNet directory")?;
        let wordnet = WordNet::load(&dict_dir)
            .with_context(|| format!("loading WordNet from {}", dict_dir.display()))?;
        let scorer =
            Scorer::new(Arc::new(wordnet)).with_category_threshold(category_threshold);
        finder = finder.with_strategy(Strategy::Guided(scorer));
    }

    // Ctrl-C arms the cancel flag; the engine checks it between steps and
    // lets the in-flight batch finish first.
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let flag_clone = cancel_flag.clone();
    let ctrlc_watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current batch");
            flag_clone.store(true, Ordering::Relaxed);
        }
    });
    finder = finder.with_cancel_flag(cancel_flag);

    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.magenta} {msg:.magenta}")
                .unwrap(),
        );
        pb.set_message("Resolving titles...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let pages_visited = Arc::new(AtomicUsize::new(1));
    let visited_clone = pages_visited.clone();
    let pb_clone = progress_bar.clone();
    finder = finder.with_progress_callback(Arc::new(move |visited, title| {
        visited_clone.store(visited, Ordering::Relaxed);
        if let Some(ref pb) = pb_clone {
            pb.set_message(format!("[ Current page: {} ]", title));
            pb.tick();
        }
    }));

    let started = Instant::now();
    let outcome = finder.find(&start, &dest).await;
    let elapsed = started.elapsed();

    ctrlc_watcher.abort();
    if let Some(ref pb) = progress_bar {
        pb.finish_and_clear();
    }

    let visited = pages_visited.load(Ordering::Relaxed);
    let path = finish_outcome(outcome, elapsed, visited)?;
    Ok(SearchReport {
        start,
        dest,
        path,
        pages_visited: visited,
        elapsed,
    })
}

/// Cancellation keeps its timing; every other engine error is wrapped as-is.
fn finish_outcome(
    outcome: wikihop_engine::error::Result<Vec<String>>,
    elapsed: Duration,
    pages_visited: usize,
) -> Result<Vec<String>> {
    match outcome {
        Err(SearchError::Cancelled) => Err(SearchCancelled {
            elapsed,
            pages_visited,
        }
        .into()),
        other => other.context("search failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_the_documented_tunables() {
        let options = SearchOptions::default();
        assert_eq!(options.batch_size, 32);
        assert_eq!(options.top_n, 7);
        assert!((options.category_threshold - 0.4).abs() < 1e-6);
        assert!(!options.guided);
        assert!(!options.sequential);
    }

    #[tokio::test]
    async fn guided_search_without_wordnet_dir_is_an_error() {
        let options = SearchOptions {
            start: "A".to_string(),
            dest: "B".to_string(),
            guided: true,
            show_progress: false,
            ..SearchOptions::default()
        };

        let err = execute_search(options).await.unwrap_err();
        assert!(err.to_string().contains("WordNet"));
    }

    #[test]
    fn cancelled_searches_keep_their_timing() {
        let err = finish_outcome(Err(SearchError::Cancelled), Duration::from_secs(3), 17)
            .unwrap_err();

        let cancelled = err.downcast_ref::<SearchCancelled>().unwrap();
        assert_eq!(cancelled.elapsed, Duration::from_secs(3));
        assert_eq!(cancelled.pages_visited, 17);
        assert!(err.to_string().contains("after 3.00 s"));
    }

    #[test]
    fn other_engine_errors_pass_through_without_a_timing_wrapper() {
        let err = finish_outcome(
            Err(SearchError::TitleNotFound {
                query: "Qwzx".to_string(),
            }),
            Duration::from_secs(1),
            1,
        )
        .unwrap_err();

        assert!(err.downcast_ref::<SearchCancelled>().is_none());
        assert!(format!("{:#}", err).contains("No page found"));
    }
}
