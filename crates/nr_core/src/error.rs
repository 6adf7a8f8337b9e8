use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The raw article could not be fetched.
    #[error("Content not found: {0}")]
    ContentNotFound(String),

    /// Main content extraction produced nothing usable.
    #[error("Optimized content is empty: {0}")]
    OptimizedContentIsEmpty(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for the two failures callers report as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ContentNotFound(_) | Error::OptimizedContentIsEmpty(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
