use crate::client::PageSource;
use crate::error::Result;
use crate::tree::NodeId;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

/// Fetches the outbound links of a whole frontier slice concurrently, with a
/// bounded number of requests in flight. Results come back paired with the
/// node that asked for them, in submission order, no matter which request
/// finishes first.
pub struct BatchFetcher {
    source: Arc<dyn PageSource>,
    max_in_flight: usize,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        Self {
            source,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Fetch links for every node in the batch. The first failing fetch
    /// aborts the whole batch; any still-running requests are dropped and no
    /// partial result is returned.
    pub async fn fetch_batch(&self, batch: &[(NodeId, String)]) -> Result<Vec<(NodeId, Vec<String>)>> {
        debug!("Fetching links for a batch of {} pages", batch.len());

        stream::iter(batch.iter().cloned().map(|(id, title)| {
            let source = self.source.clone();
            async move {
                let links = source.links(&title).await?;
                Ok((id, links))
            }
        }))
        .buffered(self.max_in_flight)
        .try_collect()
        .await
    }
}
