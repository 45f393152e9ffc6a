//! Error types for the content state machine
//!
//! These describe misuse of the machine (stale tickets, double resolution)
//! and upstream fetch failures. Content failures that users see are modelled
//! separately as [`crate::ErrorReason`].

use crate::request::RequestId;
use crate::state::StateKind;

/// State machine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateMachineError {
    /// Transition not in the allowed table
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: StateKind, to: StateKind },

    /// Result belongs to a superseded request
    #[error("stale result for request {stale}; current request is {current:?}")]
    StaleResult {
        stale: RequestId,
        current: Option<RequestId>,
    },

    /// Request was already resolved
    #[error("request {0} is already resolved")]
    AlreadyResolved(RequestId),
}

impl StateMachineError {
    /// Check if the error only signals a discarded, superseded result
    #[inline]
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResult { .. })
    }
}

/// Errors raised by a [`crate::ContentSource`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Source has no content under this id
    #[error("content not found: {0}")]
    NotFound(String),

    /// Source failed (network, IO, upstream status)
    #[error("content source unavailable for {source_id}: {message}")]
    Unavailable { source_id: String, message: String },

    /// Fetch exceeded the slot's timeout
    #[error("fetch of {source_id} timed out after {millis}ms")]
    Timeout { source_id: String, millis: u64 },
}

impl FetchError {
    /// Create unavailable error for a source id
    pub fn unavailable(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            source_id: source_id.into(),
            message: message.into(),
        }
    }
}
