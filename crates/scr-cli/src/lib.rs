//! `safe-content` command-line host
//!
//! Loads a policy and renderer configuration, then sanitizes or renders
//! untrusted markup from a file or stdin.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod source;

pub use cli::{Action, Cli};
pub use commands::ContentInput;
pub use config::AppConfig;
pub use source::FileSource;
