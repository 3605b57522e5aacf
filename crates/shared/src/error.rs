use thiserror::Error;

/// Every way a catalog or image request can fail. The UI treats all of them
/// as one kind of failure and only shows the rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {cause}")]
    Transport { url: String, cause: String },
    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response body from {url}: {cause}")]
    Decode { url: String, cause: String },
    #[error("image host '{host}' is not on the allowlist")]
    DisallowedHost { host: String },
    #[error("invalid url '{url}': {cause}")]
    InvalidUrl { url: String, cause: String },
}

impl NetworkError {
    pub fn transport(url: impl Into<String>, cause: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    pub fn decode(url: impl Into<String>, cause: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;
