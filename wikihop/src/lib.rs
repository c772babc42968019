// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler helpers for convenience
pub use handlers::{resolve_wordnet_dir, DEFAULT_WORDNET_DIR, WORDNET_DIR_ENV};

// Re-export search orchestration from wikihop-core
pub use wikihop_core::{execute_search, SearchOptions, SearchReport};
