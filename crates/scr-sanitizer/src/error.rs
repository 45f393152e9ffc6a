//! Error types for the sanitizer
//!
//! Provides error handling for:
//! - Sanitize operations (untrusted string → safe markup)
//! - Policy construction (builder validation)
//! - Configuration loading (file → policy)

use std::path::PathBuf;

/// Errors raised while sanitizing a single input
///
/// These never escape [`crate::sanitize`]; they travel in the side channel of
/// [`crate::Sanitized`] or as the `Err` of [`crate::try_sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    /// Input is larger than the policy allows
    #[error("input of {len} bytes exceeds the policy limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },

    /// The HTML cleaner failed internally
    #[error("sanitizer failed internally: {0}")]
    Internal(String),
}

/// Errors while building a [`crate::SanitizationPolicy`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Tag name is not a valid HTML element name
    #[error("invalid tag name: '{0}'")]
    InvalidTagName(String),

    /// Attribute name is not a valid HTML attribute name
    #[error("invalid attribute name '{attribute}' on <{tag}>")]
    InvalidAttributeName { tag: String, attribute: String },

    /// Tag can never be allowed
    #[error("tag <{0}> cannot be allowed")]
    ForbiddenTag(String),

    /// Event-handler attributes can never be allowed
    #[error("event handler attribute '{attribute}' on <{tag}> cannot be allowed")]
    EventHandlerAttribute { tag: String, attribute: String },

    /// Attribute allowed on a tag that is not itself allowed
    #[error("attribute '{attribute}' allowed on <{tag}>, but <{tag}> is not an allowed tag")]
    UnlistedTag { tag: String, attribute: String },

    /// URL scheme is not syntactically valid
    #[error("invalid url scheme: '{0}'")]
    InvalidUrlScheme(String),
}

impl PolicyError {
    /// Create invalid attribute error
    pub fn invalid_attribute(tag: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::InvalidAttributeName {
            tag: tag.into(),
            attribute: attribute.into(),
        }
    }
}

/// Errors while loading configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML syntax or shape error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or shape error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension has no known format
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Policy section failed validation
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_error_display() {
        let err = SanitizeError::InputTooLarge { len: 20, limit: 8 };
        assert_eq!(
            err.to_string(),
            "input of 20 bytes exceeds the policy limit of 8 bytes"
        );
    }

    #[test]
    fn policy_error_display() {
        let err = PolicyError::EventHandlerAttribute {
            tag: "div".to_string(),
            attribute: "onclick".to_string(),
        };
        assert!(err.to_string().contains("onclick"));
    }

    #[test]
    fn error_conversions() {
        let policy_err = PolicyError::ForbiddenTag("script".to_string());
        let config_err: ConfigError = policy_err.into();
        assert!(matches!(config_err, ConfigError::Policy(_)));
    }
}
