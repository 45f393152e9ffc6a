//! SCR State
//!
//! Tracks one slot of untrusted content through
//! `Idle -> Loading -> {Ready, Error}` with last-request-wins semantics.
//!
//! # Overview
//!
//! - **ContentStateMachine**: Synchronous state machine, one per slot
//! - **ContentSlot**: Async owner of a machine, drives fetches from a source
//! - **ContentSource**: External collaborator that supplies raw markup
//!
//! # Example
//!
//! ```rust
//! use scr_sanitizer::SanitizationPolicy;
//! use scr_state::{ContentRequest, ContentStateMachine, ErrorReason};
//! use std::sync::Arc;
//!
//! let policy = SanitizationPolicy::builder().allow_tags(["div", "b"]).build().unwrap();
//! let mut machine = ContentStateMachine::new(Arc::new(policy));
//!
//! machine
//!     .submit(ContentRequest::new("greeting", "<div onclick='steal()'>Hello <b>World</b></div>"))
//!     .unwrap();
//! assert_eq!(
//!     machine.state().safe_content().unwrap().as_str(),
//!     "<div>Hello <b>World</b></div>"
//! );
//!
//! machine.submit(ContentRequest::missing("greeting")).unwrap();
//! assert_eq!(machine.state().error_reason(), Some(ErrorReason::EmptyInput));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod machine;
pub mod request;
pub mod slot;
pub mod source;
pub mod state;
pub mod transitions;

// Re-exports
pub use error::{FetchError, StateMachineError};
pub use machine::{ContentStateMachine, StateSnapshot, TransitionRecord, DEFAULT_HISTORY_LIMIT};
pub use request::{ContentRequest, RequestId, RequestTicket};
pub use slot::{ContentSlot, SlotConfig, SlotId};
pub use source::{ContentSource, StaticSource};
pub use state::{ContentState, ErrorReason, StateKind};
pub use transitions::{allowed_transitions, validate_transition};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving content slots
    pub use crate::{
        ContentRequest, ContentSlot, ContentSource, ContentState, ContentStateMachine,
        ErrorReason, FetchError, StateMachineError, StateSnapshot,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check if running with strict debugging enabled
#[must_use]
pub const fn strict_debug() -> bool {
    cfg!(feature = "strict-debug")
}
