use employee_facade_core::{ErrorKind, GatewayError};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors produced by the upstream client.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url cannot carry path segments: {0}")]
    BaseUrl(String),
    #[error("no response from upstream during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} during {operation}: {body}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
    #[error("failed to decode upstream response for {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Upstream returned empty response for {operation}")]
    MissingEnvelope { operation: &'static str },
    #[error("Upstream returned null data for {operation}")]
    MissingData { operation: &'static str },
    #[error("{operation} still rate limited after {attempts} attempts")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        #[source]
        last: Box<UpstreamError>,
    },
}

impl UpstreamError {
    /// Kind assigned where this error was produced. Wrappers return `None`.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Url(_) | Self::BaseUrl(_) => Some(ErrorKind::Internal),
            Self::Transport { .. } => Some(ErrorKind::Unreachable),
            Self::Status { status, .. } => Some(match *status {
                StatusCode::NOT_FOUND => ErrorKind::NotFound,
                StatusCode::TOO_MANY_REQUESTS => ErrorKind::RateLimited,
                _ => ErrorKind::Internal,
            }),
            Self::Decode { .. } | Self::MissingEnvelope { .. } | Self::MissingData { .. } => {
                Some(ErrorKind::Protocol)
            }
            Self::RetriesExhausted { .. } => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::TOO_MANY_REQUESTS,
                ..
            }
        )
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::RetriesExhausted { .. } => "retries_exhausted",
            other => other.kind().map_or("error", ErrorKind::as_str),
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            UpstreamError::RetriesExhausted { last, .. } => {
                GatewayError::tagged(kind, message, Some(GatewayError::from(*last)))
            }
            UpstreamError::Status { body, .. } => {
                GatewayError::tagged(kind, message, None).with_detail(body)
            }
            _ => GatewayError::tagged(kind, message, None),
        }
    }
}
