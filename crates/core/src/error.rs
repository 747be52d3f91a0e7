use serde::Serialize;

/// Why a fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// The request could not be sent or completed (includes timeouts)
    Network,
    /// A response arrived with a non-success status
    HttpStatus,
    /// The response body could not be decoded
    Parse,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::Network => write!(f, "network error"),
            FetchErrorKind::HttpStatus => write!(f, "HTTP error"),
            FetchErrorKind::Parse => write!(f, "parse error"),
        }
    }
}

/// Error returned by every adapter
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {detail}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub detail: String,
}

impl FetchError {
    pub fn network(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            detail: detail.into(),
        }
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        let body = body.trim();
        let detail = if body.is_empty() {
            format!("status {status}")
        } else {
            format!("status {status}: {}", crate::format::truncate(body, 200))
        };

        Self {
            kind: FetchErrorKind::HttpStatus,
            detail,
        }
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Parse,
            detail: detail.into(),
        }
    }

    /// Every kind can be retried by the user; nothing is retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            FetchErrorKind::Network | FetchErrorKind::HttpStatus | FetchErrorKind::Parse
        )
    }
}
