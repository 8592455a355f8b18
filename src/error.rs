//! Error types returned by registration and dispatch.
//!
//! Tokenizer and coercion failures live next to the code that raises them
//! ([`ParseError`], [`ConversionError`]) and convert into [`ShellError`].

use crate::lexer::ParseError;
use crate::value::{ConversionError, DataType};
use thiserror::Error;

/// Failure while declaring commands or flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The default value's type differs from the declared type of the flag.
    #[error("default value {value} of flag '{flag}' is of type {actual}, expecting type {expected}")]
    TypeMismatch {
        flag: String,
        value: String,
        expected: DataType,
        actual: DataType,
    },

    /// The name or alias cannot be typed on a command line.
    #[error("'{0}' is not a valid flag name")]
    InvalidFlagName(String),

    /// The name or alias is already used by another flag of the same command.
    #[error("flag '{flag}' reuses '{identifier}', already taken by flag '{existing}'")]
    FlagConflict {
        flag: String,
        identifier: String,
        existing: String,
    },

    /// The command name is handled by the shell itself.
    #[error("'{0}' is a reserved command name")]
    ReservedName(String),
}

/// Failure while executing a line.
///
/// None of these end the session; the read loop prints them and moves on.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to parse line: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to find command '{0}'")]
    UnknownCommand(String),

    /// A required flag is absent or empty. `usage` holds the command's help text.
    #[error("command '{command}' requires flag '-{flag}'")]
    MissingRequiredFlag {
        command: String,
        flag: String,
        usage: String,
    },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// A handler asked for a flag its command never declared.
    #[error("couldn't find flag '{flag}' in command '{command}'")]
    UnknownFlag { command: String, flag: String },

    #[error("there is no handler for the command '{0}'")]
    NoHandler(String),

    /// The handler ran and returned an error.
    #[error("command '{command}' failed: {source:#}")]
    Handler {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}
