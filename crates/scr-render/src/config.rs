//! Renderer configuration

use crate::descriptor::Politeness;
use crate::messages::{ErrorMessages, LOADING};
use serde::{Deserialize, Serialize};

/// Presentation settings shared by the renderers of an application
///
/// Every field has a default, so an empty `[renderer]` table is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Text of the loading status region
    pub loading_message: String,
    /// Politeness of the loading status region
    pub loading_politeness: Politeness,
    /// Politeness of the error alert region
    pub error_politeness: Politeness,
    /// Error messages
    pub messages: ErrorMessages,
}

impl RendererConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With loading message
    #[must_use]
    pub fn with_loading_message(mut self, message: impl Into<String>) -> Self {
        self.loading_message = message.into();
        self
    }

    /// With loading politeness
    #[inline]
    #[must_use]
    pub fn with_loading_politeness(mut self, politeness: Politeness) -> Self {
        self.loading_politeness = politeness;
        self
    }

    /// With error politeness
    #[inline]
    #[must_use]
    pub fn with_error_politeness(mut self, politeness: Politeness) -> Self {
        self.error_politeness = politeness;
        self
    }

    /// With error messages
    #[must_use]
    pub fn with_messages(mut self, messages: ErrorMessages) -> Self {
        self.messages = messages;
        self
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            loading_message: LOADING.to_string(),
            loading_politeness: Politeness::Polite,
            error_politeness: Politeness::Assertive,
            messages: ErrorMessages::default(),
        }
    }
}
