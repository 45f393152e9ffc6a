//! Content requests and their identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one accepted request within a state machine
///
/// Ids are issued in increasing order, so a larger id is always newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Wrap a raw sequence number
    #[inline]
    #[must_use]
    pub const fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Raw sequence number
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of untrusted content to display
///
/// Never mutated: new content is a new request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    /// Where the content came from (post id, URL, prop name)
    pub source_id: String,
    /// Untrusted markup; `None` when the caller had nothing to pass
    pub raw_content: Option<String>,
}

impl ContentRequest {
    /// Request carrying content
    #[inline]
    #[must_use]
    pub fn new(source_id: impl Into<String>, raw_content: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_content: Some(raw_content.into()),
        }
    }

    /// Request with no content (null/undefined input)
    #[inline]
    #[must_use]
    pub fn missing(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_content: None,
        }
    }

    /// Request from optional content
    #[inline]
    #[must_use]
    pub fn from_option(source_id: impl Into<String>, raw_content: Option<String>) -> Self {
        Self {
            source_id: source_id.into(),
            raw_content,
        }
    }

    /// True when `raw_content` is `None`
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.raw_content.is_none()
    }
}

/// Receipt for an accepted request, presented when resolving it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    id: RequestId,
    source_id: String,
}

impl RequestTicket {
    #[inline]
    pub(crate) fn new(id: RequestId, source_id: impl Into<String>) -> Self {
        Self {
            id,
            source_id: source_id.into(),
        }
    }

    /// Request identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Source id of the request
    #[inline]
    #[must_use]
    pub fn source_id(&self) -> &str {
        &self.source_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_order_by_sequence() {
        assert!(RequestId::new(2) > RequestId::new(1));
        assert_eq!(RequestId::new(7).to_string(), "#7");
        assert_eq!(RequestId::new(7).get(), 7);
    }

    #[test]
    fn request_constructors() {
        assert!(!ContentRequest::new("a", "<p>x</p>").is_missing());
        assert!(ContentRequest::missing("a").is_missing());
        assert_eq!(
            ContentRequest::from_option("a", None),
            ContentRequest::missing("a")
        );
    }
}
