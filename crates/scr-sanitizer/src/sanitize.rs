//! Policy-driven HTML sanitization
//!
//! Parsing and cleaning is delegated to `ammonia` (html5ever underneath). The
//! cleaner is configured from the policy on every call so that nothing but the
//! policy's allow-list can leak through: ammonia's own default tags, generic
//! attributes and `rel` injection are all switched off.

use crate::error::SanitizeError;
use crate::markup::SafeMarkup;
use crate::policy::{SanitizationPolicy, RAW_TEXT_TAGS};
use ammonia::Builder;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};

/// Result of [`sanitize`]: markup plus a failure flag
///
/// On failure the markup is empty. The error is a side channel; the markup is
/// always usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sanitized {
    markup: SafeMarkup,
    failure: Option<SanitizeError>,
}

impl Sanitized {
    /// Sanitized markup (empty on failure)
    #[inline]
    #[must_use]
    pub fn markup(&self) -> &SafeMarkup {
        &self.markup
    }

    /// Failure reported by the sanitizer, if any
    #[inline]
    #[must_use]
    pub fn failure(&self) -> Option<&SanitizeError> {
        self.failure.as_ref()
    }

    /// True if the sanitizer failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Consume into markup, dropping the failure flag
    #[inline]
    #[must_use]
    pub fn into_markup(self) -> SafeMarkup {
        self.markup
    }

    /// Convert into a `Result`
    ///
    /// # Errors
    /// Returns the sanitizer failure, if one was reported.
    pub fn into_result(self) -> Result<SafeMarkup, SanitizeError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.markup),
        }
    }
}

impl From<Result<SafeMarkup, SanitizeError>> for Sanitized {
    fn from(result: Result<SafeMarkup, SanitizeError>) -> Self {
        match result {
            Ok(markup) => Self {
                markup,
                failure: None,
            },
            Err(err) => Self {
                markup: SafeMarkup::empty(),
                failure: Some(err),
            },
        }
    }
}

/// Sanitize untrusted markup against `policy`
///
/// Never panics. Failures yield empty markup and are reported through
/// [`Sanitized::failure`].
#[must_use]
pub fn sanitize(raw: &str, policy: &SanitizationPolicy) -> Sanitized {
    let result = try_sanitize(raw, policy);
    if let Err(err) = &result {
        tracing::warn!(error = %err, input_len = raw.len(), "sanitization failed");
    }
    result.into()
}

/// Sanitize possibly-missing markup; `None` is treated as `""`
#[must_use]
pub fn sanitize_nullable(raw: Option<&str>, policy: &SanitizationPolicy) -> Sanitized {
    sanitize(raw.unwrap_or_default(), policy)
}

/// Sanitize untrusted markup, returning failures as `Err`
///
/// # Errors
/// Returns [`SanitizeError::InputTooLarge`] if the input exceeds the policy's
/// limit, or [`SanitizeError::Internal`] if the cleaner panics or its output
/// does not settle within [`MAX_CLEAN_PASSES`].
pub fn try_sanitize(raw: &str, policy: &SanitizationPolicy) -> Result<SafeMarkup, SanitizeError> {
    if let Some(limit) = policy.max_input_len() {
        if raw.len() > limit {
            return Err(SanitizeError::InputTooLarge {
                len: raw.len(),
                limit,
            });
        }
    }

    if raw.is_empty() {
        return Ok(SafeMarkup::empty());
    }

    let cleaned = panic::catch_unwind(AssertUnwindSafe(|| clean_to_fixpoint(raw, policy)))
        .map_err(|payload| SanitizeError::Internal(panic_message(payload.as_ref())))??;

    Ok(SafeMarkup::from_sanitized(cleaned))
}

/// Upper bound on cleaning passes before the output must be stable
pub const MAX_CLEAN_PASSES: usize = 4;

/// Clean until re-cleaning the output changes nothing
///
/// The parser may restructure serialized output again when it reads it back
/// (list items and tables, for example), so a single pass is not idempotent.
fn clean_to_fixpoint(raw: &str, policy: &SanitizationPolicy) -> Result<String, SanitizeError> {
    let cleaner = cleaner(policy);
    let mut current = cleaner.clean(raw).to_string();
    for pass in 2..=MAX_CLEAN_PASSES {
        let next = cleaner.clean(&current).to_string();
        if next == current {
            return Ok(current);
        }
        tracing::trace!(pass, "sanitized output changed on re-clean");
        current = next;
    }
    Err(SanitizeError::Internal(format!(
        "output did not settle after {MAX_CLEAN_PASSES} passes"
    )))
}

fn cleaner(policy: &SanitizationPolicy) -> Builder<'_> {
    let tags: HashSet<&str> = policy.allowed_tags().iter().map(String::as_str).collect();
    let tag_attributes: HashMap<&str, HashSet<&str>> = policy
        .allowed_attributes()
        .iter()
        .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
        .collect();
    let url_schemes: HashSet<&str> = policy.url_schemes().iter().map(String::as_str).collect();

    let mut builder = Builder::default();
    builder
        .tags(tags)
        .clean_content_tags(RAW_TEXT_TAGS.into_iter().collect())
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .url_schemes(url_schemes)
        .link_rel(None)
        .strip_comments(true);
    builder
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
