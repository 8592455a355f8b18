use crate::value::{DataType, Value};
use std::fmt;

/// A flag declared by a command.
///
/// Definitions are created through the registration methods of
/// [`CommandDefinition`](crate::command::CommandDefinition), which check the
/// default value against `data_type` and reject colliding names.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDefinition {
    /// Canonical identifier, typed as `-name`.
    pub name: String,
    /// Optional second identifier, typed as `--alias`.
    pub alias: Option<String>,
    pub data_type: DataType,
    pub default: Option<Value>,
    pub description: String,
    pub required: bool,
}

impl FlagDefinition {
    /// Whether `identifier` is this flag's name or alias.
    pub fn matches(&self, identifier: &str) -> bool {
        self.name == identifier || self.alias.as_deref() == Some(identifier)
    }

    /// Renders the default value the way a user would have typed it.
    ///
    /// Returns an empty string when the flag has no default.
    pub fn default_value_to_string(&self) -> String {
        self.default
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default()
    }

    /// The identifiers this flag answers to, name first.
    pub(crate) fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.alias.as_deref())
    }

    /// Implicit `-h --help` entry shown in help text.
    pub(crate) fn help() -> Self {
        Self {
            name: "h".to_string(),
            alias: Some("help".to_string()),
            data_type: DataType::Bool,
            default: Some(Value::Bool(false)),
            description: "prints out information about the command".to_string(),
            required: false,
        }
    }
}

/// One help line: `\t-name\t--alias\tdescription (required: bool)\n`.
impl fmt::Display for FlagDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t-{}\t", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, "--{alias}")?;
        }
        writeln!(f, "\t{} (required: {})", self.description, self.required)
    }
}
