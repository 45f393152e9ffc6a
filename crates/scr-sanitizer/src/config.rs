//! Policy configuration files
//!
//! Policies are usually supplied by the embedding application as a file:
//!
//! ```toml
//! allowed_tags = ["p", "a", "b"]
//! url_schemes = ["https", "mailto"]
//! max_input_len = 65536
//!
//! [allowed_attributes]
//! a = ["href", "title"]
//! ```
//!
//! TOML, YAML and JSON are accepted, chosen by file extension.

use crate::error::{ConfigError, ConfigResult, PolicyError};
use crate::policy::SanitizationPolicy;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Serializable form of a [`SanitizationPolicy`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Allowed tag names
    pub allowed_tags: BTreeSet<String>,
    /// Allowed attributes per tag
    pub allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    /// Accepted URL schemes
    pub url_schemes: BTreeSet<String>,
    /// Input size limit in bytes
    pub max_input_len: Option<usize>,
}

impl PolicyConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With allowed tags
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Load from a TOML, YAML or JSON file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        load_config(path)
    }

    /// Validate into a policy
    ///
    /// # Errors
    /// Returns [`PolicyError`] if the builder rejects the configuration.
    pub fn into_policy(self) -> Result<SanitizationPolicy, PolicyError> {
        let mut builder = SanitizationPolicy::builder().allow_tags(self.allowed_tags);
        for (tag, attrs) in self.allowed_attributes {
            builder = builder.allow_attributes(tag, attrs);
        }
        for scheme in self.url_schemes {
            builder = builder.allow_url_scheme(scheme);
        }
        if let Some(limit) = self.max_input_len {
            builder = builder.max_input_len(limit);
        }
        builder.build()
    }
}

impl TryFrom<PolicyConfig> for SanitizationPolicy {
    type Error = PolicyError;

    fn try_from(config: PolicyConfig) -> Result<Self, Self::Error> {
        config.into_policy()
    }
}

impl From<&SanitizationPolicy> for PolicyConfig {
    fn from(policy: &SanitizationPolicy) -> Self {
        Self {
            allowed_tags: policy.allowed_tags().clone(),
            allowed_attributes: policy.allowed_attributes().clone(),
            url_schemes: policy.url_schemes().clone(),
            max_input_len: policy.max_input_len(),
        }
    }
}

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Parse a string in this format
    ///
    /// # Errors
    /// Returns the format's parse error wrapped in [`ConfigError`].
    pub fn parse<T: DeserializeOwned>(self, content: &str) -> ConfigResult<T> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Yaml => serde_yaml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Read and parse any deserializable config file by extension
///
/// # Errors
/// Returns [`ConfigError::UnsupportedFormat`] for unknown extensions, an IO
/// error if the file cannot be read, or the format's parse error.
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> ConfigResult<T> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;

    tracing::debug!(path = %path.display(), ?format, "loading config");
    format.parse(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn toml_policy_roundtrip() {
        let config: PolicyConfig = ConfigFormat::Toml
            .parse(
                r#"
                allowed_tags = ["a", "p"]
                url_schemes = ["https"]

                [allowed_attributes]
                a = ["href"]
                "#,
            )
            .unwrap();

        let policy = config.clone().into_policy().unwrap();
        assert!(policy.allows_attribute("a", "href"));
        assert_eq!(PolicyConfig::from(&policy), config);
    }

    #[test]
    fn yaml_and_json_formats() {
        let yaml: PolicyConfig = ConfigFormat::Yaml
            .parse("allowed_tags: [b]\nmax_input_len: 10\n")
            .unwrap();
        assert_eq!(yaml.max_input_len, Some(10));

        let json: PolicyConfig = ConfigFormat::Json
            .parse(r#"{"allowed_tags": ["i"]}"#)
            .unwrap();
        assert!(json.allowed_tags.contains("i"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: ConfigResult<PolicyConfig> =
            ConfigFormat::Toml.parse("allowed_tag = [\"p\"]");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn invalid_policy_is_reported() {
        let config = PolicyConfig::new().with_tags(["style"]);
        assert_eq!(
            SanitizationPolicy::try_from(config),
            Err(PolicyError::ForbiddenTag("style".to_string()))
        );
    }

    #[test]
    fn load_detects_format_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "allowed_tags: [p, em]").unwrap();

        let config = PolicyConfig::load(file.path()).unwrap();
        assert_eq!(config.allowed_tags.len(), 2);
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            PolicyConfig::load(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            PolicyConfig::load("/definitely/not/here.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
