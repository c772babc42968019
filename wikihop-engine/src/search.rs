use crate::client::PageSource;
use crate::error::{Result, SearchError};
use crate::fetch::{BatchFetcher, DEFAULT_MAX_IN_FLIGHT};
use crate::scorer::{Scorer, DEFAULT_TOP_N};
use crate::tree::{NodeId, PathTree};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// How links are filtered before joining the frontier.
pub enum Strategy {
    /// Every unvisited link is enqueued. True breadth-first search, finds a
    /// shortest path.
    Plain,
    /// Only the links most lexically related to the destination are
    /// enqueued. Cuts the branching factor; gives up the shortest-path
    /// guarantee.
    Guided(Scorer),
}

/// How links are fetched: one page per step, or a whole frontier slice at
/// once through the [`BatchFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    Sequential,
    Batched,
}

/// Breadth-first searcher over the page-link graph.
///
/// Owns one frontier, one visited set and one discovery tree per call to
/// [`find`](Self::find); nothing is shared across searches. The strategy and
/// fetch mode change only which links join the frontier and how fast they
/// arrive, never the termination behavior.
pub struct PathFinder {
    source: Arc<dyn PageSource>,
    strategy: Strategy,
    fetch_mode: FetchMode,
    batch_size: usize,
    top_n: usize,
    cancel_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<ProgressCallback>,
}

impl PathFinder {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            strategy: Strategy::Plain,
            fetch_mode: FetchMode::Batched,
            batch_size: DEFAULT_MAX_IN_FLIGHT,
            top_n: DEFAULT_TOP_N,
            cancel_flag: None,
            progress_callback: None,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fetch_mode(mut self, fetch_mode: FetchMode) -> Self {
        self.fetch_mode = fetch_mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Search for a link path from `start` to `dest`.
    ///
    /// Returns the full path including both endpoints, or an empty vector
    /// when the two resolve to the same page or the reachable graph is
    /// exhausted without meeting `dest`. Title resolution failures and
    /// cancellation surface as errors; exhaustion does not.
    pub async fn find(&self, start: &str, dest: &str) -> Result<Vec<String>> {
        let start_title = self.source.resolve_title(start).await?;
        let dest_title = self.source.resolve_title(dest).await?;
        if start_title == dest_title {
            return Ok(Vec::new());
        }

        info!("Finding path from {} to {}", start_title, dest_title);

        let target_words = match &self.strategy {
            Strategy::Plain => Vec::new(),
            Strategy::Guided(scorer) => {
                let words = scorer.target_words(self.source.as_ref(), &dest_title).await?;
                info!("Matching links against {:?}", words);
                words
            }
        };

        let mut tree = PathTree::new();
        let mut visited = HashSet::new();
        let mut frontier = VecDeque::new();

        let root = tree.create_root(start_title.clone());
        visited.insert(start_title.clone());
        frontier.push_back(root);

        while !frontier.is_empty() {
            self.check_cancelled()?;

            let batch = self.drain_frontier(&mut frontier, &tree);
            let fetched = self.fetch_links(&batch).await?;

            for (node, links) in fetched {
                self.report_progress(visited.len(), tree.title(node));

                if let Some(path) =
                    self.fold_node(node, links, &dest_title, &target_words, &mut tree, &mut visited, &mut frontier)
                {
                    info!("Path found after visiting {} pages", visited.len());
                    return Ok(path);
                }
            }
        }

        info!("Frontier exhausted after {} pages, no path", visited.len());
        Ok(Vec::new())
    }

    fn drain_frontier(&self, frontier: &mut VecDeque<NodeId>, tree: &PathTree) -> Vec<(NodeId, String)> {
        let take = match self.fetch_mode {
            FetchMode::Sequential => 1,
            FetchMode::Batched => self.batch_size,
        };
        let mut batch = Vec::with_capacity(take.min(frontier.len()));
        for _ in 0..take {
            match frontier.pop_front() {
                Some(id) => batch.push((id, tree.title(id).to_string())),
                None => break,
            }
        }
        batch
    }

    async fn fetch_links(&self, batch: &[(NodeId, String)]) -> Result<Vec<(NodeId, Vec<String>)>> {
        match self.fetch_mode {
            FetchMode::Sequential => {
                let mut fetched = Vec::with_capacity(batch.len());
                for (id, title) in batch {
                    fetched.push((*id, self.source.links(title).await?));
                }
                Ok(fetched)
            }
            FetchMode::Batched => {
                BatchFetcher::new(self.source.clone())
                    .with_max_in_flight(self.batch_size)
                    .fetch_batch(batch)
                    .await
            }
        }
    }

    /// Fold one expanded node's links into the tree and frontier. Returns
    /// the finished path when `dest` shows up among the links.
    #[allow(clippy::too_many_arguments)]
    fn fold_node(
        &self,
        node: NodeId,
        links: Vec<String>,
        dest: &str,
        target_words: &[String],
        tree: &mut PathTree,
        visited: &mut HashSet<String>,
        frontier: &mut VecDeque<NodeId>,
    ) -> Option<Vec<String>> {
        let mut survivors = Vec::new();

        for link in links {
            if link == dest {
                let mut path = tree.ancestors(node);
                path.push(tree.title(node).to_string());
                path.push(dest.to_string());
                return Some(path);
            }

            if visited.contains(&link) {
                continue;
            }
            // Marked visited before any scoring, so a sibling list never
            // discovers the same title twice.
            visited.insert(link.clone());
            let child = tree.attach_child(node, link.clone());

            match &self.strategy {
                Strategy::Plain => frontier.push_back(child),
                Strategy::Guided(_) => survivors.push((link, child)),
            }
        }

        if let Strategy::Guided(scorer) = &self.strategy {
            self.enqueue_best(scorer, survivors, target_words, frontier);
        }

        None
    }

    /// Keep only the top scored survivors of one node. The rest stay in the
    /// tree as dead children. `rank_and_select` hands back ascending scores,
    /// so the reverse walk enqueues best first onto the FIFO frontier.
    fn enqueue_best(
        &self,
        scorer: &Scorer,
        survivors: Vec<(String, NodeId)>,
        target_words: &[String],
        frontier: &mut VecDeque<NodeId>,
    ) {
        if survivors.is_empty() {
            return;
        }

        let ids: std::collections::HashMap<String, NodeId> = survivors.iter().cloned().collect();
        let candidates: Vec<String> = survivors.into_iter().map(|(title, _)| title).collect();

        let selected = scorer.rank_and_select(candidates, target_words, self.top_n);
        debug!("Keeping {} of {} scored links", selected.len(), ids.len());

        for (title, _score) in selected.iter().rev() {
            frontier.push_back(ids[title]);
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.cancel_flag {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(SearchError::Cancelled),
            _ => Ok(()),
        }
    }

    fn report_progress(&self, visited: usize, title: &str) {
        if let Some(callback) = &self.progress_callback {
            callback(visited, title.to_string());
        }
    }
}
