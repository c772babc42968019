pub mod client;
pub mod error;
pub mod fetch;
pub mod scorer;
pub mod search;
pub mod tree;

pub use client::{PageSource, WikiClient};
pub use error::SearchError;
pub use fetch::BatchFetcher;
pub use scorer::{LexicalOracle, Scorer};
pub use search::{FetchMode, PathFinder, ProgressCallback, Strategy};
pub use tree::{NodeId, PathTree};
