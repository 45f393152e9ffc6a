//! Fixed user-facing messages per error reason

use scr_state::ErrorReason;
use serde::{Deserialize, Serialize};

/// Default message for [`ErrorReason::SanitizationFailed`]
pub const SANITIZATION_FAILED: &str = "This content could not be displayed safely.";
/// Default message for [`ErrorReason::SourceFetchFailed`]
pub const SOURCE_FETCH_FAILED: &str = "This content could not be loaded. Please try again later.";
/// Default message for [`ErrorReason::EmptyInput`]
pub const EMPTY_INPUT: &str = "No content is available.";
/// Default loading announcement
pub const LOADING: &str = "Loading content";

/// Message table, one fixed string per [`ErrorReason`]
///
/// Messages never include error text from the sanitizer or the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorMessages {
    /// Shown for [`ErrorReason::SanitizationFailed`]
    pub sanitization_failed: String,
    /// Shown for [`ErrorReason::SourceFetchFailed`]
    pub source_fetch_failed: String,
    /// Shown for [`ErrorReason::EmptyInput`]
    pub empty_input: String,
}

impl ErrorMessages {
    /// Default English messages
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Message for a reason
    #[must_use]
    pub fn for_reason(&self, reason: ErrorReason) -> &str {
        match reason {
            ErrorReason::SanitizationFailed => &self.sanitization_failed,
            ErrorReason::SourceFetchFailed => &self.source_fetch_failed,
            ErrorReason::EmptyInput => &self.empty_input,
        }
    }

    /// With message for a reason
    #[must_use]
    pub fn with_message(mut self, reason: ErrorReason, message: impl Into<String>) -> Self {
        let slot = match reason {
            ErrorReason::SanitizationFailed => &mut self.sanitization_failed,
            ErrorReason::SourceFetchFailed => &mut self.source_fetch_failed,
            ErrorReason::EmptyInput => &mut self.empty_input,
        };
        *slot = message.into();
        self
    }
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            sanitization_failed: SANITIZATION_FAILED.to_string(),
            source_fetch_failed: SOURCE_FETCH_FAILED.to_string(),
            empty_input: EMPTY_INPUT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_has_a_distinct_message() {
        let messages = ErrorMessages::new();
        let all = [
            messages.for_reason(ErrorReason::SanitizationFailed),
            messages.for_reason(ErrorReason::SourceFetchFailed),
            messages.for_reason(ErrorReason::EmptyInput),
        ];
        assert!(all.iter().all(|m| !m.is_empty()));
        assert_ne!(all[0], all[1]);
        assert_ne!(all[1], all[2]);
    }

    #[test]
    fn override_one_message() {
        let messages = ErrorMessages::new().with_message(ErrorReason::EmptyInput, "Nothing here");
        assert_eq!(messages.for_reason(ErrorReason::EmptyInput), "Nothing here");
        assert_eq!(
            messages.for_reason(ErrorReason::SourceFetchFailed),
            SOURCE_FETCH_FAILED
        );
    }
}
