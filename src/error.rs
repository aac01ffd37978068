use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification used to pick an [`ErrorPolicy`](crate::config::ErrorPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Structure,
}

/// Everything that can go wrong while turning one listing page into rows.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("could not parse listing markup: {0}")]
    Parse(String),

    #[error("no element at `{step}` ({found} candidates)")]
    MissingElement { step: String, found: usize },

    #[error("row {row} has {cells} cells, expected 3")]
    MalformedRow { row: usize, cells: usize },
}

impl PageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::Network { .. } | PageError::Status { .. } => ErrorKind::Network,
            PageError::Parse(_) => ErrorKind::Parse,
            PageError::MissingElement { .. } | PageError::MalformedRow { .. } => {
                ErrorKind::Structure
            }
        }
    }

    /// Worth another attempt: transport failures, 429 and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            PageError::Network { .. } => true,
            PageError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

pub type PageResult<T> = std::result::Result<T, PageError>;
