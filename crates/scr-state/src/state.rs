//! Content states

use scr_sanitizer::SafeMarkup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a request ended in [`ContentState::Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorReason {
    /// The sanitizer reported a failure
    SanitizationFailed,
    /// The content source failed
    SourceFetchFailed,
    /// The caller supplied no content at all
    EmptyInput,
}

impl ErrorReason {
    /// Stable machine-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SanitizationFailed => "sanitization_failed",
            Self::SourceFetchFailed => "source_fetch_failed",
            Self::EmptyInput => "empty_input",
        }
    }
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of one content slot
///
/// `Ready` and `Error` are separate variants, so a slot can never be both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContentState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Waiting for content
    Loading,
    /// Sanitized content is available
    Ready {
        /// Markup that passed the slot's policy
        safe_content: SafeMarkup,
    },
    /// The request failed
    Error {
        /// What went wrong
        reason: ErrorReason,
    },
}

impl ContentState {
    /// Discriminant without payload
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            Self::Idle => StateKind::Idle,
            Self::Loading => StateKind::Loading,
            Self::Ready { .. } => StateKind::Ready,
            Self::Error { .. } => StateKind::Error,
        }
    }

    /// True for `Ready` and `Error`
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Error { .. })
    }

    /// Sanitized content, when `Ready`
    #[must_use]
    pub fn safe_content(&self) -> Option<&SafeMarkup> {
        match self {
            Self::Ready { safe_content } => Some(safe_content),
            _ => None,
        }
    }

    /// Error reason, when `Error`
    #[must_use]
    pub fn error_reason(&self) -> Option<ErrorReason> {
        match self {
            Self::Error { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// Payload-free state discriminant, used by the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateKind {
    /// See [`ContentState::Idle`]
    Idle,
    /// See [`ContentState::Loading`]
    Loading,
    /// See [`ContentState::Ready`]
    Ready,
    /// See [`ContentState::Error`]
    Error,
}

impl StateKind {
    /// All kinds, in lifecycle order
    pub const ALL: [StateKind; 4] = [Self::Idle, Self::Loading, Self::Ready, Self::Error];
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = ContentState::default();
        assert_eq!(state.kind(), StateKind::Idle);
        assert!(!state.is_settled());
    }

    #[test]
    fn accessors_match_variant() {
        let ready = ContentState::Ready {
            safe_content: SafeMarkup::empty(),
        };
        assert_eq!(ready.safe_content(), Some(&SafeMarkup::empty()));
        assert_eq!(ready.error_reason(), None);

        let error = ContentState::Error {
            reason: ErrorReason::EmptyInput,
        };
        assert_eq!(error.error_reason(), Some(ErrorReason::EmptyInput));
        assert!(error.safe_content().is_none());
        assert!(error.is_settled());
    }

    #[test]
    fn reason_names_are_stable() {
        assert_eq!(ErrorReason::SourceFetchFailed.to_string(), "source_fetch_failed");
    }
}
