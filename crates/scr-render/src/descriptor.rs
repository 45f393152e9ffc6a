//! Render descriptors
//!
//! A [`RenderDescriptor`] is plain data for the host UI. Exactly one of
//! nothing, a loading indicator, content, or an error message is described.

use scr_sanitizer::SafeMarkup;
use scr_state::ErrorReason;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How urgently assistive technology should announce a live region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Politeness {
    /// Announce when the user is idle
    Polite,
    /// Interrupt the user
    Assertive,
}

impl fmt::Display for Politeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        })
    }
}

/// Role of a live region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AriaRole {
    /// Advisory status (loading)
    Status,
    /// Important, time-sensitive message (errors)
    Alert,
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Status => "status",
            Self::Alert => "alert",
        })
    }
}

/// Non-visual marker announced to assistive technology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveRegion {
    /// Region role
    pub role: AriaRole,
    /// Announcement urgency
    pub politeness: Politeness,
    /// Text to announce
    pub message: String,
    /// Whether the host should announce this render
    ///
    /// True only for the first render after the slot entered its state.
    pub announce: bool,
}

impl LiveRegion {
    /// Create a status region
    #[must_use]
    pub fn status(message: impl Into<String>, politeness: Politeness) -> Self {
        Self {
            role: AriaRole::Status,
            politeness,
            message: message.into(),
            announce: true,
        }
    }

    /// Create an alert region
    #[must_use]
    pub fn alert(message: impl Into<String>, politeness: Politeness) -> Self {
        Self {
            role: AriaRole::Alert,
            politeness,
            message: message.into(),
            announce: true,
        }
    }

    /// With announce flag
    #[inline]
    #[must_use]
    pub fn with_announce(mut self, announce: bool) -> Self {
        self.announce = announce;
        self
    }
}

/// What the host should display for a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderDescriptor {
    /// Render nothing
    Nothing,
    /// Loading placeholder
    Loading {
        /// Status region for the loading condition
        status: LiveRegion,
    },
    /// Sanitized content
    Content {
        /// Pre-sanitized markup. This is the one field a host may inject as
        /// raw markup.
        trusted_markup: SafeMarkup,
        /// Accessible label for the content region
        label: String,
    },
    /// Fixed error message
    Error {
        /// Failure category
        reason: ErrorReason,
        /// Human-readable message for the reason
        message: String,
        /// Alert region carrying the message
        alert: LiveRegion,
    },
}

impl RenderDescriptor {
    /// Stable name of the variant
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Nothing => "nothing",
            Self::Loading { .. } => "loading",
            Self::Content { .. } => "content",
            Self::Error { .. } => "error",
        }
    }

    /// True for [`RenderDescriptor::Nothing`]
    #[inline]
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    /// Markup the host may inject, if any
    #[must_use]
    pub fn trusted_markup(&self) -> Option<&SafeMarkup> {
        match self {
            Self::Content { trusted_markup, .. } => Some(trusted_markup),
            _ => None,
        }
    }

    /// Live region to render, if any
    #[must_use]
    pub fn live_region(&self) -> Option<&LiveRegion> {
        match self {
            Self::Loading { status } => Some(status),
            Self::Error { alert, .. } => Some(alert),
            Self::Nothing | Self::Content { .. } => None,
        }
    }

    /// True if this render carries an announcement
    #[must_use]
    pub fn announces(&self) -> bool {
        self.live_region().is_some_and(|region| region.announce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_content_carries_markup() {
        let loading = RenderDescriptor::Loading {
            status: LiveRegion::status("Loading", Politeness::Polite),
        };
        assert!(loading.trusted_markup().is_none());
        assert!(loading.announces());
        assert!(RenderDescriptor::Nothing.trusted_markup().is_none());

        let content = RenderDescriptor::Content {
            trusted_markup: SafeMarkup::empty(),
            label: "Post".into(),
        };
        assert_eq!(content.trusted_markup(), Some(&SafeMarkup::empty()));
        assert!(content.live_region().is_none());
        assert!(!content.announces());
    }

    #[test]
    fn live_region_roles() {
        assert_eq!(LiveRegion::status("x", Politeness::Polite).role, AriaRole::Status);
        let alert = LiveRegion::alert("x", Politeness::Assertive).with_announce(false);
        assert_eq!(alert.role, AriaRole::Alert);
        assert!(!alert.announce);
    }

    #[test]
    fn display_names() {
        assert_eq!(AriaRole::Alert.to_string(), "alert");
        assert_eq!(Politeness::Polite.to_string(), "polite");
        assert_eq!(RenderDescriptor::Nothing.kind(), "nothing");
    }
}
