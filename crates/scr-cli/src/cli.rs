//! Command-line arguments

use crate::logging::LogFormat;
use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Parsed invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Log line format
    pub log_format: LogFormat,
    /// Number of `-v` flags
    pub verbosity: u8,
    /// Subcommand
    pub action: Action,
}

/// What to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print sanitized markup
    Sanitize {
        /// Configuration file
        config: PathBuf,
        /// Input file, stdin if absent
        input: Option<PathBuf>,
    },
    /// Drive a slot and print its render descriptor
    Render {
        /// Configuration file
        config: PathBuf,
        /// Accessible label of the content
        label: String,
        /// Source id, defaults to the input path or `stdin`
        source_id: Option<String>,
        /// Input file, stdin if absent
        input: Option<PathBuf>,
    },
    /// Validate configuration
    Check {
        /// Configuration file
        config: PathBuf,
    },
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Configuration file (.toml, .yaml, .yml or .json)")
}

fn input_arg() -> Arg {
    Arg::new("input")
        .value_parser(value_parser!(PathBuf))
        .help("Input file; reads stdin when omitted")
}

/// Build the argument parser
#[must_use]
pub fn command() -> Command {
    Command::new("safe-content")
        .version(scr_sanitizer::VERSION)
        .about("Sanitize untrusted markup and describe how to render it")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(LogFormat::NAMES)
                .help("Log output format"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (RUST_LOG overrides)"),
        )
        .subcommand(
            Command::new("sanitize")
                .about("Print the sanitized form of the input")
                .arg(config_arg())
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("render")
                .about("Print the render descriptor for the input as JSON")
                .arg(config_arg())
                .arg(
                    Arg::new("label")
                        .long("label")
                        .required(true)
                        .help("Accessible label of the content"),
                )
                .arg(
                    Arg::new("source-id")
                        .long("source-id")
                        .help("Source id used in logs"),
                )
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Validate a configuration file")
                .arg(config_arg()),
        )
}

impl Cli {
    /// Parse the process arguments, exiting on usage errors
    ///
    /// # Errors
    /// Fails only if parsed matches are inconsistent with [`command`].
    pub fn parse() -> anyhow::Result<Self> {
        Self::from_matches(&command().get_matches())
    }

    /// Parse an explicit argument list
    ///
    /// # Errors
    /// Returns the usage error for invalid arguments.
    pub fn try_parse_from<I, T>(args: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_matches(&command().try_get_matches_from(args)?)
    }

    fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let log_format = matches
            .get_one::<String>("log-format")
            .and_then(|name| LogFormat::from_name(name))
            .unwrap_or_default();
        let verbosity = matches.get_count("verbose");

        let action = match matches.subcommand() {
            Some(("sanitize", args)) => Action::Sanitize {
                config: required(args, "config")?,
                input: args.get_one::<PathBuf>("input").cloned(),
            },
            Some(("render", args)) => Action::Render {
                config: required(args, "config")?,
                label: required(args, "label")?,
                source_id: args.get_one::<String>("source-id").cloned(),
                input: args.get_one::<PathBuf>("input").cloned(),
            },
            Some(("check", args)) => Action::Check {
                config: required(args, "config")?,
            },
            other => anyhow::bail!("unknown subcommand {:?}", other.map(|(name, _)| name)),
        };

        Ok(Self {
            log_format,
            verbosity,
            action,
        })
    }
}

fn required<T>(args: &ArgMatches, name: &str) -> anyhow::Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing --{name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn parse_render() {
        let cli = Cli::try_parse_from([
            "safe-content",
            "-vv",
            "render",
            "--config",
            "app.toml",
            "--label",
            "Post",
            "post.html",
        ])
        .unwrap();

        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.log_format, LogFormat::Text);
        assert_eq!(
            cli.action,
            Action::Render {
                config: PathBuf::from("app.toml"),
                label: "Post".to_string(),
                source_id: None,
                input: Some(PathBuf::from("post.html")),
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["safe-content", "check", "-c", "a.yaml", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(
            cli.action,
            Action::Check {
                config: PathBuf::from("a.yaml")
            }
        );
    }

    #[test]
    fn render_requires_label() {
        assert!(Cli::try_parse_from(["safe-content", "render", "--config", "a.toml"]).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(
            Cli::try_parse_from(["safe-content", "--log-format", "xml", "check", "-c", "a.toml"])
                .is_err()
        );
    }
}
