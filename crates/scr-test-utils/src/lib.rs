//! Testing utilities for SCR workspace
//!
//! Shared policies, sources, and helpers for integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use scr_sanitizer::SanitizationPolicy;
use scr_state::{ContentSource, FetchError, StateKind, TransitionRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn policy_allowing(tags: &[&str]) -> Arc<SanitizationPolicy> {
    Arc::new(SanitizationPolicy::builder().allow_tags(tags).build().unwrap())
}

pub fn policy_with_attributes(tags: &[&str], attributes: &[(&str, &str)]) -> Arc<SanitizationPolicy> {
    let builder = attributes
        .iter()
        .fold(SanitizationPolicy::builder().allow_tags(tags), |b, (tag, attr)| {
            b.allow_attribute(tag, attr)
        });
    Arc::new(builder.build().unwrap())
}

/// Policy whose sanitizer fails on anything longer than `limit` bytes
pub fn policy_failing_above(limit: usize) -> Arc<SanitizationPolicy> {
    Arc::new(
        SanitizationPolicy::builder()
            .allow_tags(["p", "b"])
            .max_input_len(limit)
            .build()
            .unwrap(),
    )
}

pub fn transition_path(history: &[TransitionRecord]) -> Vec<(StateKind, StateKind)> {
    history.iter().map(|r| (r.from, r.to)).collect()
}

/// Source answering each id after a fixed delay
#[derive(Debug, Default)]
pub struct DelayedSource {
    responses: HashMap<String, (Duration, Result<String, FetchError>)>,
    calls: AtomicUsize,
}

impl DelayedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(mut self, source_id: &str, delay_ms: u64, content: &str) -> Self {
        self.responses.insert(
            source_id.to_string(),
            (Duration::from_millis(delay_ms), Ok(content.to_string())),
        );
        self
    }

    pub fn with_failure(mut self, source_id: &str, delay_ms: u64, message: &str) -> Self {
        self.responses.insert(
            source_id.to_string(),
            (
                Duration::from_millis(delay_ms),
                Err(FetchError::unavailable(source_id, message)),
            ),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for DelayedSource {
    async fn fetch(&self, source_id: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((delay, response)) = self.responses.get(source_id) else {
            return Err(FetchError::NotFound(source_id.to_string()));
        };
        tokio::time::sleep(*delay).await;
        response.clone()
    }
}
