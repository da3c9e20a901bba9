use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A page could not be reached or did not settle in time.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// The browser engine could not be started or stopped.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Bad client input or a malformed category table.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// True for errors caused by caller input rather than by the crawl itself.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Config(_) | Error::UnknownCategory(_))
    }
}
