//! Application configuration file
//!
//! ```toml
//! [policy]
//! allowed_tags = ["p", "a"]
//!
//! [policy.allowed_attributes]
//! a = ["href"]
//!
//! [renderer]
//! loading_message = "Loading post"
//!
//! [slot]
//! fetch_timeout_ms = 2000
//! ```

use anyhow::Context;
use scr_render::RendererConfig;
use scr_sanitizer::{load_config, PolicyConfig, SanitizationPolicy};
use scr_state::SlotConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Everything the binary reads from `--config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Sanitization policy
    pub policy: PolicyConfig,
    /// Presentation settings
    pub renderer: RendererConfig,
    /// Slot settings
    pub slot: SlotConfig,
}

impl AppConfig {
    /// Read a TOML, YAML or JSON file
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        load_config(path).with_context(|| format!("failed to load config {}", path.display()))
    }

    /// Validated policy
    ///
    /// # Errors
    /// Fails if the policy section is rejected by the policy builder.
    pub fn policy(&self) -> anyhow::Result<Arc<SanitizationPolicy>> {
        let policy = self
            .policy
            .clone()
            .into_policy()
            .context("invalid [policy] section")?;
        Ok(Arc::new(policy))
    }
}
