//! SCR Sanitizer
//!
//! Allow-list HTML sanitization driven by an explicit, injected policy.
//!
//! # Core Concepts
//!
//! - [`SanitizationPolicy`]: Immutable allow-list of tags, attributes and URL schemes
//! - [`PolicyBuilder`]: Validating builder for policies
//! - [`sanitize`]: Never-failing sanitize with a side-channel failure flag
//! - [`try_sanitize`]: The same operation returning `Result`
//! - [`SafeMarkup`]: Markup that has passed a policy
//!
//! # Example
//!
//! ```rust
//! use scr_sanitizer::{sanitize, SanitizationPolicy};
//!
//! let policy = SanitizationPolicy::builder()
//!     .allow_tags(["div", "b"])
//!     .build()
//!     .unwrap();
//!
//! let out = sanitize("<div onclick='steal()'>Hello <b>World</b></div>", &policy);
//! assert!(!out.is_failed());
//! assert_eq!(out.markup().as_str(), "<div>Hello <b>World</b></div>");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod markup;
pub mod policy;
pub mod sanitize;

// Re-exports for convenience
pub use config::{load_config, ConfigFormat, PolicyConfig};
pub use error::{ConfigError, ConfigResult, PolicyError, SanitizeError};
pub use markup::SafeMarkup;
pub use policy::{PolicyBuilder, SanitizationPolicy, RAW_TEXT_TAGS};
pub use sanitize::{sanitize, sanitize_nullable, try_sanitize, Sanitized, MAX_CLEAN_PASSES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for sanitizing content
    pub use crate::{
        sanitize, try_sanitize, PolicyBuilder, PolicyConfig, SafeMarkup, SanitizationPolicy,
        SanitizeError, Sanitized,
    };
}
