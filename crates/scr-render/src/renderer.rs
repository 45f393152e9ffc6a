//! Mapping content states to render descriptors

use crate::config::RendererConfig;
use crate::descriptor::{LiveRegion, RenderDescriptor};
use scr_state::{ContentState, StateSnapshot};
use std::sync::Arc;

/// Describe a state, announcing any live region
///
/// Stateless form of [`ContentRenderer::render`] for hosts that track
/// announcements themselves.
#[must_use]
pub fn describe(state: &ContentState, label: &str, config: &RendererConfig) -> RenderDescriptor {
    build(state, label, config, true)
}

fn build(state: &ContentState, label: &str, config: &RendererConfig, announce: bool) -> RenderDescriptor {
    match state {
        ContentState::Idle => RenderDescriptor::Nothing,
        ContentState::Loading => RenderDescriptor::Loading {
            status: LiveRegion::status(config.loading_message.clone(), config.loading_politeness)
                .with_announce(announce),
        },
        ContentState::Ready { safe_content } => RenderDescriptor::Content {
            trusted_markup: safe_content.clone(),
            label: label.to_string(),
        },
        ContentState::Error { reason } => {
            let message = config.messages.for_reason(*reason).to_string();
            RenderDescriptor::Error {
                reason: *reason,
                alert: LiveRegion::alert(message.clone(), config.error_politeness)
                    .with_announce(announce),
                message,
            }
        }
    }
}

/// Per-slot renderer
///
/// Remembers which transition it last announced, so re-rendering the same
/// `Loading` or `Error` state does not announce it again.
#[derive(Debug, Clone)]
pub struct ContentRenderer {
    config: Arc<RendererConfig>,
    label: String,
    last_announced: Option<u64>,
}

impl ContentRenderer {
    /// Create renderer for a slot with an accessible label
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_config(label, Arc::new(RendererConfig::default()))
    }

    /// Create renderer sharing a configuration
    #[must_use]
    pub fn with_config(label: impl Into<String>, config: Arc<RendererConfig>) -> Self {
        Self {
            config,
            label: label.into(),
            last_announced: None,
        }
    }

    /// Accessible label of the content
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Shared configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Arc<RendererConfig> {
        &self.config
    }

    /// Describe a snapshot
    ///
    /// Live regions announce on the first render of each transition into
    /// `Loading` or `Error`.
    pub fn render(&mut self, snapshot: &StateSnapshot) -> RenderDescriptor {
        let needs_region = matches!(
            snapshot.state,
            ContentState::Loading | ContentState::Error { .. }
        );
        let announce = needs_region && self.last_announced != Some(snapshot.transition);
        if announce {
            tracing::trace!(
                label = %self.label,
                transition = snapshot.transition,
                state = %snapshot.state.kind(),
                "announcing live region"
            );
            self.last_announced = Some(snapshot.transition);
        }
        build(&snapshot.state, &self.label, &self.config, announce)
    }
}
