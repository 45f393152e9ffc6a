//! Sanitization policies
//!
//! A [`SanitizationPolicy`] is the explicit allow-list every sanitize call is
//! checked against. Policies are built once, validated by [`PolicyBuilder`],
//! and shared read-only afterwards (usually behind an `Arc`).

use crate::error::PolicyError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Elements whose content the HTML parser keeps as raw text.
///
/// Their content is written back out unescaped, so they can never be allowed
/// and are always removed together with their content.
pub const RAW_TEXT_TAGS: [&str; 8] = [
    "script", "style", "noscript", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Immutable allow-list of tags, attributes and URL schemes
///
/// The empty policy removes every tag and keeps only text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizationPolicy {
    allowed_tags: BTreeSet<String>,
    allowed_attributes: BTreeMap<String, BTreeSet<String>>,
    url_schemes: BTreeSet<String>,
    max_input_len: Option<usize>,
}

impl SanitizationPolicy {
    /// Policy that allows nothing
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a policy
    #[inline]
    #[must_use]
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::new()
    }

    /// Allowed tag names (lowercase)
    #[inline]
    #[must_use]
    pub fn allowed_tags(&self) -> &BTreeSet<String> {
        &self.allowed_tags
    }

    /// Allowed attributes per tag
    #[inline]
    #[must_use]
    pub fn allowed_attributes(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.allowed_attributes
    }

    /// URL schemes accepted in URL-valued attributes
    #[inline]
    #[must_use]
    pub fn url_schemes(&self) -> &BTreeSet<String> {
        &self.url_schemes
    }

    /// Upper bound on input size in bytes
    #[inline]
    #[must_use]
    pub fn max_input_len(&self) -> Option<usize> {
        self.max_input_len
    }

    /// Check whether a tag is allowed
    #[must_use]
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(&tag.to_ascii_lowercase())
    }

    /// Check whether an attribute is allowed on a tag
    #[must_use]
    pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.allowed_attributes
            .get(&tag.to_ascii_lowercase())
            .is_some_and(|attrs| attrs.contains(&attribute.to_ascii_lowercase()))
    }

    /// True when nothing but text survives
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed_tags.is_empty()
    }
}

/// Validating builder for [`SanitizationPolicy`]
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    tags: BTreeSet<String>,
    attributes: BTreeMap<String, BTreeSet<String>>,
    url_schemes: BTreeSet<String>,
    max_input_len: Option<usize>,
}

impl PolicyBuilder {
    /// Create empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow a tag
    #[must_use]
    pub fn allow_tag(mut self, tag: impl AsRef<str>) -> Self {
        self.tags.insert(tag.as_ref().trim().to_ascii_lowercase());
        self
    }

    /// Allow several tags
    #[must_use]
    pub fn allow_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().fold(self, |builder, tag| builder.allow_tag(tag))
    }

    /// Allow an attribute on a tag
    #[must_use]
    pub fn allow_attribute(mut self, tag: impl AsRef<str>, attribute: impl AsRef<str>) -> Self {
        self.attributes
            .entry(tag.as_ref().trim().to_ascii_lowercase())
            .or_default()
            .insert(attribute.as_ref().trim().to_ascii_lowercase());
        self
    }

    /// Allow several attributes on a tag
    #[must_use]
    pub fn allow_attributes<I, S>(self, tag: impl AsRef<str>, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tag = tag.as_ref().to_string();
        attributes
            .into_iter()
            .fold(self, |builder, attr| builder.allow_attribute(&tag, attr))
    }

    /// Accept a URL scheme in URL-valued attributes
    #[must_use]
    pub fn allow_url_scheme(mut self, scheme: impl AsRef<str>) -> Self {
        self.url_schemes
            .insert(scheme.as_ref().trim().to_ascii_lowercase());
        self
    }

    /// Reject inputs larger than `limit` bytes
    #[must_use]
    pub fn max_input_len(mut self, limit: usize) -> Self {
        self.max_input_len = Some(limit);
        self
    }

    /// Validate and freeze the policy
    ///
    /// # Errors
    /// Returns [`PolicyError`] for malformed names, raw-text tags, event
    /// handler attributes, attributes on unlisted tags, or malformed schemes.
    pub fn build(self) -> Result<SanitizationPolicy, PolicyError> {
        for tag in &self.tags {
            if !is_valid_tag_name(tag) {
                return Err(PolicyError::InvalidTagName(tag.clone()));
            }
            if RAW_TEXT_TAGS.contains(&tag.as_str()) {
                return Err(PolicyError::ForbiddenTag(tag.clone()));
            }
        }

        for (tag, attrs) in &self.attributes {
            if !self.tags.contains(tag) {
                let attribute = attrs.iter().next().cloned().unwrap_or_default();
                return Err(PolicyError::UnlistedTag {
                    tag: tag.clone(),
                    attribute,
                });
            }
            for attr in attrs {
                if !is_valid_attribute_name(attr) {
                    return Err(PolicyError::invalid_attribute(tag, attr));
                }
                if attr.starts_with("on") {
                    return Err(PolicyError::EventHandlerAttribute {
                        tag: tag.clone(),
                        attribute: attr.clone(),
                    });
                }
            }
        }

        if let Some(scheme) = self.url_schemes.iter().find(|s| !is_valid_scheme(s)) {
            return Err(PolicyError::InvalidUrlScheme(scheme.clone()));
        }

        let mut attributes = self.attributes;
        attributes.retain(|_, attrs| !attrs.is_empty());

        Ok(SanitizationPolicy {
            allowed_tags: self.tags,
            allowed_attributes: attributes,
            url_schemes: self.url_schemes,
            max_input_len: self.max_input_len,
        })
    }
}

fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn is_valid_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | ':')
        })
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_normalizes_case() {
        let policy = SanitizationPolicy::builder()
            .allow_tags(["DIV", " b "])
            .allow_attribute("Div", "Title")
            .build()
            .unwrap();

        assert!(policy.allows_tag("div"));
        assert!(policy.allows_tag("B"));
        assert!(policy.allows_attribute("DIV", "title"));
        assert!(!policy.allows_attribute("b", "title"));
    }

    #[test]
    fn empty_policy_allows_nothing() {
        let policy = SanitizationPolicy::empty();
        assert!(policy.is_empty());
        assert!(!policy.allows_tag("p"));
        assert_eq!(policy.max_input_len(), None);
    }

    fn assert_forbidden(tag: &str) {
        let err = SanitizationPolicy::builder()
            .allow_tags(["p", tag])
            .build()
            .unwrap_err();
        assert_eq!(err, PolicyError::ForbiddenTag(tag.to_ascii_lowercase()));
    }

    #[test]
    fn rejects_script() {
        assert_forbidden("script");
    }

    #[test]
    fn rejects_style() {
        assert_forbidden("style");
    }

    #[test]
    fn rejects_noscript() {
        assert_forbidden("noscript");
    }

    #[test]
    fn rejects_xmp() {
        assert_forbidden("xmp");
    }

    #[test]
    fn rejects_iframe() {
        assert_forbidden("iframe");
    }

    #[test]
    fn rejects_noembed() {
        assert_forbidden("noembed");
    }

    #[test]
    fn rejects_noframes() {
        assert_forbidden("noframes");
    }

    #[test]
    fn rejects_plaintext() {
        assert_forbidden("PlainText");
    }

    #[test]
    fn rejects_event_handlers() {
        let err = SanitizationPolicy::builder()
            .allow_tag("div")
            .allow_attribute("div", "onclick")
            .build()
            .unwrap_err();
        assert!(matches!(err, PolicyError::EventHandlerAttribute { .. }));
    }

    #[test]
    fn rejects_attributes_on_unlisted_tag() {
        let err = SanitizationPolicy::builder()
            .allow_tag("p")
            .allow_attribute("a", "href")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            PolicyError::UnlistedTag {
                tag: "a".to_string(),
                attribute: "href".to_string()
            }
        );
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(matches!(
            SanitizationPolicy::builder().allow_tag("1up").build(),
            Err(PolicyError::InvalidTagName(_))
        ));
        assert!(matches!(
            SanitizationPolicy::builder()
                .allow_tag("a")
                .allow_attribute("a", "hr ef")
                .build(),
            Err(PolicyError::InvalidAttributeName { .. })
        ));
        assert!(matches!(
            SanitizationPolicy::builder()
                .allow_tag("a")
                .allow_attribute("a", "ng.click")
                .build(),
            Err(PolicyError::InvalidAttributeName { .. })
        ));
        assert!(matches!(
            SanitizationPolicy::builder().allow_url_scheme("ht tp").build(),
            Err(PolicyError::InvalidUrlScheme(_))
        ));
    }

    #[test]
    fn accepts_aria_and_data_attributes() {
        let policy = SanitizationPolicy::builder()
            .allow_tag("span")
            .allow_attributes("span", ["aria-label", "data-id", "xml:lang"])
            .allow_url_scheme("https")
            .max_input_len(1024)
            .build()
            .unwrap();

        assert_eq!(policy.allowed_attributes()["span"].len(), 3);
        assert!(policy.url_schemes().contains("https"));
        assert_eq!(policy.max_input_len(), Some(1024));
    }
}
