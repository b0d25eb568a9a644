use thiserror::Error;

use crate::session::RequestKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LyricsError {
    /// Required local input is missing; raised before any request is issued.
    #[error("{0}")]
    Validation(String),
    /// The collaborator could not find the requested work.
    #[error("{0}")]
    Lookup(String),
    /// The collaborator failed to translate raw text.
    #[error("{0}")]
    Translation(String),
    /// A completion arrived for a request that is no longer the latest one.
    #[error("stale result for request #{seq} (latest #{latest})")]
    StaleResult { seq: u64, latest: u64 },
}

impl LyricsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Builds the collaborator error matching the request kind that failed.
    pub fn collaborator(kind: RequestKind, message: impl Into<String>) -> Self {
        match kind {
            RequestKind::Search => Self::Lookup(message.into()),
            RequestKind::Text => Self::Translation(message.into()),
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResult { .. })
    }
}
