//! Subcommand implementations
//!
//! Each command returns its stdout text so it can be tested without a
//! process.

use crate::cli::Action;
use crate::config::AppConfig;
use crate::source::FileSource;
use anyhow::Context;
use scr_render::{ContentRenderer, RenderDescriptor};
use scr_sanitizer::try_sanitize;
use scr_state::{ContentRequest, ContentSlot};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Untrusted content handed to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentInput {
    /// Content fetched from a file
    File(PathBuf),
    /// Content already in memory
    Text(String),
}

impl ContentInput {
    async fn resolve(input: Option<&PathBuf>) -> anyhow::Result<Self> {
        match input {
            Some(path) => Ok(Self::File(path.clone())),
            None => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("failed to read stdin")?;
                Ok(Self::Text(text))
            }
        }
    }
}

/// Run a parsed action, reading stdin where no input file was given
///
/// # Errors
/// Propagates configuration, IO and sanitization failures.
pub async fn run(action: &Action) -> anyhow::Result<String> {
    match action {
        Action::Sanitize { config, input } => {
            let config = AppConfig::load(config)?;
            sanitize(&config, &ContentInput::resolve(input.as_ref()).await?).await
        }
        Action::Render {
            config,
            label,
            source_id,
            input,
        } => {
            let config = AppConfig::load(config)?;
            let input = ContentInput::resolve(input.as_ref()).await?;
            let descriptor = render(&config, label, source_id.as_deref(), &input).await?;
            serde_json::to_string_pretty(&descriptor).context("failed to encode descriptor")
        }
        Action::Check { config: path } => check(path),
    }
}

/// Sanitize input under the configured policy
///
/// # Errors
/// Fails if the input cannot be read or the sanitizer reports a failure.
pub async fn sanitize(config: &AppConfig, input: &ContentInput) -> anyhow::Result<String> {
    let policy = config.policy()?;
    let raw = match input {
        ContentInput::File(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        ContentInput::Text(text) => text.clone(),
    };

    let markup = try_sanitize(&raw, &policy).context("sanitization failed")?;
    tracing::info!(input_len = raw.len(), output_len = markup.len(), "sanitized input");
    Ok(markup.into_string())
}

/// Drive one slot with the input and describe the settled state
///
/// File input is fetched through a [`FileSource`]; text is submitted
/// directly.
///
/// # Errors
/// Fails on invalid configuration. Content failures are reported in the
/// descriptor, not as errors.
pub async fn render(
    config: &AppConfig,
    label: &str,
    source_id: Option<&str>,
    input: &ContentInput,
) -> anyhow::Result<RenderDescriptor> {
    let slot = ContentSlot::with_config(config.policy()?, config.slot.clone());
    let mut renderer = ContentRenderer::with_config(label, Arc::new(config.renderer.clone()));

    let snapshot = match input {
        ContentInput::File(path) => {
            let id = source_id.map_or_else(|| path.display().to_string(), str::to_string);
            let source = FileSource::new().with_file(id.clone(), path);
            slot.load(&source, &id).await?
        }
        ContentInput::Text(text) => {
            let id = source_id.unwrap_or("stdin");
            slot.submit(ContentRequest::new(id, text.clone()))?
        }
    };

    tracing::debug!(slot = %slot.id(), state = %snapshot.state.kind(), "slot settled");
    Ok(renderer.render(&snapshot))
}

/// Validate a configuration file and summarize it
///
/// # Errors
/// Fails if the file cannot be loaded or the policy is invalid.
pub fn check(path: &Path) -> anyhow::Result<String> {
    let config = AppConfig::load(path)?;
    let policy = config.policy()?;

    let mut out = String::new();
    let tags: Vec<&str> = policy.allowed_tags().iter().map(String::as_str).collect();
    writeln!(out, "{}: ok", path.display())?;
    writeln!(out, "allowed tags: {}", list_or_none(&tags))?;
    for (tag, attributes) in policy.allowed_attributes() {
        let attributes: Vec<&str> = attributes.iter().map(String::as_str).collect();
        writeln!(out, "  {tag}: {}", attributes.join(", "))?;
    }
    let schemes: Vec<&str> = policy.url_schemes().iter().map(String::as_str).collect();
    writeln!(out, "url schemes: {}", list_or_none(&schemes))?;
    match policy.max_input_len() {
        Some(limit) => writeln!(out, "max input: {limit} bytes")?,
        None => writeln!(out, "max input: unlimited")?,
    }
    match config.slot.fetch_timeout() {
        Some(timeout) => write!(out, "fetch timeout: {}ms", timeout.as_millis())?,
        None => write!(out, "fetch timeout: none")?,
    }
    Ok(out)
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
