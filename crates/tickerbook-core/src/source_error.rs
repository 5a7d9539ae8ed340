//! Acquisition failure taxonomy.
//!
//! | Kind | Code | Meaning |
//! |------|------|---------|
//! | `Transport` | `source.transport` | Timeout, connection failure |
//! | `Status` | `source.status` | Non-2xx response |
//! | `Parse` | `source.parse` | Expected JSON/HTML shape absent |
//! | `Absent` | `source.absent` | Field not published for this ticker |
//!
//! Every kind is contained by the category that hit it and becomes an
//! `Unavailable` outcome; none of them aborts a run.

use std::fmt::{Display, Formatter};

use crate::http_client::HttpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorKind {
    Transport,
    Status,
    Parse,
    Absent,
}

/// Structured acquisition error recorded per fallback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn status(status: u16, url: &str) -> Self {
        Self {
            kind: SourceErrorKind::Status,
            message: format!("status {status} from {url}"),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Parse,
            message: message.into(),
        }
    }

    pub fn absent(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Absent,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Status => "source.status",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::Absent => "source.absent",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<HttpError> for SourceError {
    fn from(error: HttpError) -> Self {
        Self::transport(error.message())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("malformed json: {error}"))
    }
}
