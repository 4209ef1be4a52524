//! Application layer errors

use thiserror::Error;

/// Reasons a command plugin is refused by the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid manifest for `{command}`: {reason}")]
    InvalidManifest { command: String, reason: String },

    #[error("command name `{0}` is already registered")]
    DuplicateName(String),

    #[error("alias `{alias}` is already taken by `{owner}`")]
    DuplicateAlias { alias: String, owner: String },
}

/// User-facing argument problems
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("Missing required argument `{0}`")]
    MissingArgument(String),

    #[error("Argument `{name}` expects {expected}, got `{value}`")]
    TypeError {
        name: String,
        expected: String,
        value: String,
    },

    #[error("Argument `{name}` must be one of {}, got `{value}`", .choices.join(", "))]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Unknown option `{0}`")]
    UnknownFlag(String),

    #[error("Option `{0}` needs a value")]
    MissingFlagValue(String),

    #[error("Unexpected argument `{0}`")]
    UnexpectedArgument(String),

    #[error("Unterminated quote in arguments")]
    UnterminatedQuote,
}

/// A failed parse, with the usage line of the command it was parsed against
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ArgumentError,
    pub usage: String,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
