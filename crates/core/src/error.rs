use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Closed set of failure kinds surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    RateLimited,
    Protocol,
    Unreachable,
    Internal,
}

impl ErrorKind {
    /// HTTP status reported to callers for this kind.
    pub fn status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::RateLimited => 429,
            Self::Protocol | Self::Unreachable => 502,
            Self::Internal => 500,
        }
    }

    /// Canonical label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Protocol => "protocol",
            Self::Unreachable => "unreachable",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const RATE_LIMITED_MESSAGE: &str = "Upstream rate limited requests";
pub const UNREACHABLE_MESSAGE: &str = "Upstream service unavailable";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Resolves a chain of failure tags, outermost first, to the first recognised kind.
///
/// Untagged links are wrappers and are skipped. A chain without any tag is `Internal`.
pub fn classify<I>(chain: I) -> ErrorKind
where
    I: IntoIterator<Item = Option<ErrorKind>>,
{
    chain
        .into_iter()
        .flatten()
        .next()
        .unwrap_or(ErrorKind::Internal)
}

/// Error crossing the boundary between the upstream adapter, the service and callers.
///
/// Each link optionally carries the kind assigned where it was produced; wrappers
/// leave the tag empty and keep the original failure as their cause.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GatewayError {
    kind: Option<ErrorKind>,
    message: String,
    detail: Option<String>,
    #[source]
    cause: Option<Box<GatewayError>>,
}

impl GatewayError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
            detail: None,
            cause: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    /// Untagged wrapper around another failure.
    pub fn wrap(message: impl Into<String>, cause: GatewayError) -> Self {
        Self {
            kind: None,
            message: message.into(),
            detail: None,
            cause: Some(Box::new(cause)),
        }
    }

    /// Builds a link with an optional tag, used when converting foreign error chains.
    pub fn tagged(
        kind: Option<ErrorKind>,
        message: impl Into<String>,
        cause: Option<GatewayError>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
            cause: cause.map(Box::new),
        }
    }

    /// Attaches caller-facing text that replaces the generic message for this link.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Tag of this link only, without walking the chain.
    pub fn own_kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&GatewayError> {
        self.cause.as_deref()
    }

    /// Iterates this error and its causes, outermost first.
    pub fn chain(&self) -> Chain<'_> {
        Chain {
            next: Some(self),
        }
    }

    /// Classified kind of the whole chain.
    pub fn kind(&self) -> ErrorKind {
        classify(self.chain().map(GatewayError::own_kind))
    }

    /// Status and message reported to callers.
    pub fn report(&self) -> ErrorReport {
        let Some((link, kind)) = self
            .chain()
            .find_map(|link| link.kind.map(|kind| (link, kind)))
        else {
            return ErrorReport::new(ErrorKind::Internal, INTERNAL_MESSAGE);
        };

        let message = match kind {
            ErrorKind::NotFound => NOT_FOUND_MESSAGE.to_string(),
            ErrorKind::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            ErrorKind::Unreachable => UNREACHABLE_MESSAGE.to_string(),
            ErrorKind::Validation | ErrorKind::Protocol => link
                .detail
                .clone()
                .unwrap_or_else(|| link.message.clone()),
            ErrorKind::Internal => link
                .detail
                .clone()
                .filter(|detail| !detail.trim().is_empty())
                .unwrap_or_else(|| INTERNAL_MESSAGE.to_string()),
        };

        ErrorReport::new(kind, message)
    }
}

pub struct Chain<'a> {
    next: Option<&'a GatewayError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a GatewayError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause.as_deref();
        Some(current)
    }
}

/// Error shape surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub status: u16,
    pub message: String,
}

impl ErrorReport {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.status(),
            message: message.into(),
        }
    }
}
