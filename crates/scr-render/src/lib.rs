//! SCR Render
//!
//! Turns content states into [`RenderDescriptor`]s: plain data a host UI
//! draws without making any safety decisions of its own.
//!
//! | State     | Descriptor                                   |
//! |-----------|----------------------------------------------|
//! | `Idle`    | `Nothing`                                    |
//! | `Loading` | `Loading` with a polite status region        |
//! | `Ready`   | `Content` with trusted markup and a label    |
//! | `Error`   | `Error` with a fixed message and an alert    |
//!
//! `RenderDescriptor::Content::trusted_markup` is the only value a host may
//! inject as raw markup.
//!
//! # Example
//!
//! ```rust
//! use scr_render::{ContentRenderer, RenderDescriptor};
//! use scr_sanitizer::SanitizationPolicy;
//! use scr_state::{ContentRequest, ContentSlot};
//! use std::sync::Arc;
//!
//! let policy = SanitizationPolicy::builder().allow_tags(["p"]).build().unwrap();
//! let slot = ContentSlot::new(Arc::new(policy));
//! let mut renderer = ContentRenderer::new("Comment");
//!
//! let snapshot = slot.submit(ContentRequest::new("c1", "<p>hi<img src=x></p>")).unwrap();
//! let descriptor = renderer.render(&snapshot);
//! assert_eq!(descriptor.trusted_markup().unwrap().as_str(), "<p>hi</p>");
//! assert!(matches!(descriptor, RenderDescriptor::Content { ref label, .. } if label == "Comment"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod descriptor;
pub mod messages;
pub mod renderer;

// Re-exports
pub use config::RendererConfig;
pub use descriptor::{AriaRole, LiveRegion, Politeness, RenderDescriptor};
pub use messages::ErrorMessages;
pub use renderer::{describe, ContentRenderer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for rendering content slots
    pub use crate::{describe, ContentRenderer, LiveRegion, RenderDescriptor, RendererConfig};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
