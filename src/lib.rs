//! An embeddable interactive command shell.
//!
//! Applications register commands and their flags in a [`Registry`], hand it
//! to a [`Shell`] and either feed it lines with [`Shell::execute`] or let
//! [`Shell::repl`] read them from the terminal.
//!
//! A line is a command name followed by flags:
//!
//! ```text
//! get -d dir --file name -e -m a multi word value
//! ```
//!
//! `-h`, `--help` and `help <command>` print help instead of running the
//! command, and `quit`/`q` end the session. Handlers read typed flag values
//! through [`Invocation`], which falls back to declared defaults.

pub mod command;
pub mod config;
pub mod error;
pub mod flag;
mod help;
pub mod lexer;
pub mod registry;
mod shell;
pub mod validate;
pub mod value;

pub use command::{CommandDefinition, Handler, Invocation};
pub use config::{ConfigError, ShellConfig};
pub use error::{RegistrationError, ShellError};
pub use flag::FlagDefinition;
pub use lexer::{tokenize, Flags, ParseError, ParsedCommand};
pub use registry::Registry;
pub use shell::{Outcome, Shell};
pub use value::{coerce, ConversionError, DataType, Value};
