//! Sanitized markup
//!
//! [`SafeMarkup`] can only be produced by the sanitizer (or be empty), so a
//! value of this type is proof that its contents passed a policy.

use serde::Serialize;
use std::fmt;

/// Markup that has passed a [`crate::SanitizationPolicy`]
///
/// Deliberately not `Deserialize` and not constructible from an arbitrary
/// string outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    /// Empty markup, which is safe under every policy
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    #[inline]
    pub(crate) fn from_sanitized(html: String) -> Self {
        Self(html)
    }

    /// The sanitized HTML, safe to inject as markup
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the sanitized HTML string
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty string
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for empty or whitespace-only markup
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for SafeMarkup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for SafeMarkup {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SafeMarkup {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
