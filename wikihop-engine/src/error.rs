use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("No page found for \"{query}\"")]
    TitleNotFound { query: String },

    #[error("Unexpected API response: {0}")]
    ApiError(String),

    #[error("Search cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SearchError>;
