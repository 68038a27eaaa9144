use chatlink_core::CoreError;
use thiserror::Error;

/// Failure of a single search request. Contained per chunk by the resolver.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("unauthorized (status {status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response: {0}")]
    Decode(String),
}

impl SearchError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SearchError::Unauthorized { .. })
    }
}

/// Failure of a whole resolution call.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("{platform} rejected the access token and no refresh credential is available: {source}")]
    Unauthorized {
        platform: &'static str,
        #[source]
        source: SearchError,
    },
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
