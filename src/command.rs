use crate::error::{RegistrationError, ShellError};
use crate::flag::FlagDefinition;
use crate::lexer::Flags;
use crate::value::{coerce, DataType, Value};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// Identifiers the tokenizer can produce: no spaces, no leading dash.
static FLAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("flag name pattern"));

/// Function executed when a command is dispatched.
///
/// Handlers must be `Send + Sync` so a populated registry can be shared
/// read-only between threads.
pub type Handler = Box<dyn Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A command known to the shell: its descriptions, flags and handler.
pub struct CommandDefinition {
    pub(crate) name: String,
    pub(crate) short_description: String,
    pub(crate) description: String,
    /// Insertion order is kept; lookups scan it front to back.
    flags: Vec<FlagDefinition>,
    handler: Option<Handler>,
}

impl CommandDefinition {
    pub(crate) fn new(name: &str, short_description: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            short_description: short_description.to_string(),
            description: description.to_string(),
            flags: Vec::new(),
            handler: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_description(&self) -> &str {
        &self.short_description
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets or replaces the handler. Declared flags are left untouched.
    pub fn handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Declares a flag.
    ///
    /// An empty `alias` means the flag has none. Declaring a flag under an
    /// existing name replaces that flag in place.
    ///
    /// # Errors
    /// * [`RegistrationError::TypeMismatch`] if `default` is not a `data_type` value.
    /// * [`RegistrationError::InvalidFlagName`] if the name or alias cannot be typed.
    /// * [`RegistrationError::FlagConflict`] if the name or alias belongs to another flag.
    pub fn add_flag(
        &mut self,
        name: &str,
        alias: &str,
        data_type: DataType,
        default: Option<Value>,
        description: &str,
        required: bool,
    ) -> Result<&mut Self, RegistrationError> {
        let flag = FlagDefinition {
            name: name.to_string(),
            alias: (!alias.is_empty()).then(|| alias.to_string()),
            data_type,
            default,
            description: description.to_string(),
            required,
        };
        if let Err(err) = self.check(&flag) {
            warn!(command = %self.name, error = %err, "rejected flag");
            return Err(err);
        }

        match self.flags.iter_mut().find(|f| f.name == flag.name) {
            Some(existing) => *existing = flag,
            None => self.flags.push(flag),
        }
        Ok(self)
    }

    fn check(&self, flag: &FlagDefinition) -> Result<(), RegistrationError> {
        if let Some(default) = &flag.default {
            if default.data_type() != flag.data_type {
                return Err(RegistrationError::TypeMismatch {
                    flag: flag.name.clone(),
                    value: default.to_string(),
                    expected: flag.data_type,
                    actual: default.data_type(),
                });
            }
        }

        for identifier in flag.identifiers() {
            if !FLAG_NAME.is_match(identifier) {
                return Err(RegistrationError::InvalidFlagName(identifier.to_string()));
            }
        }

        let others = self.flags.iter().filter(|f| f.name != flag.name);
        for other in others {
            if let Some(identifier) = flag.identifiers().find(|id| other.matches(id)) {
                return Err(RegistrationError::FlagConflict {
                    flag: flag.name.clone(),
                    identifier: identifier.to_string(),
                    existing: other.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn int_flag(
        &mut self,
        name: &str,
        alias: &str,
        default: i64,
        description: &str,
        required: bool,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_flag(name, alias, DataType::Int, Some(Value::Int(default)), description, required)
    }

    pub fn float_flag(
        &mut self,
        name: &str,
        alias: &str,
        default: f64,
        description: &str,
        required: bool,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_flag(name, alias, DataType::Float, Some(Value::Float(default)), description, required)
    }

    /// Declares a presence flag. Its default is `false`.
    pub fn bool_flag(
        &mut self,
        name: &str,
        alias: &str,
        description: &str,
        required: bool,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_flag(name, alias, DataType::Bool, Some(Value::Bool(false)), description, required)
    }

    pub fn string_flag(
        &mut self,
        name: &str,
        alias: &str,
        default: &str,
        description: &str,
        required: bool,
    ) -> Result<&mut Self, RegistrationError> {
        self.add_flag(name, alias, DataType::String, Some(Value::from(default)), description, required)
    }

    /// Finds a flag by name or alias. The first declared match wins.
    pub fn flag(&self, identifier: &str) -> Option<&FlagDefinition> {
        self.flags.iter().find(|f| f.matches(identifier))
    }

    /// Declared flags in declaration order.
    pub fn flags(&self) -> impl Iterator<Item = &FlagDefinition> {
        self.flags.iter()
    }

    pub(crate) fn invoke(&self, flags: &Flags) -> Result<(), ShellError> {
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| ShellError::NoHandler(self.name.clone()))?;
        handler(&Invocation::new(self, flags)).map_err(|source| ShellError::Handler {
            command: self.name.clone(),
            source,
        })
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("short_description", &self.short_description)
            .field("flags", &self.flags)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

/// What a handler sees: the parsed flags plus the command that declared them.
///
/// Values are looked up by name or alias, fall back to the declared default
/// and go through [`coerce`] either way.
pub struct Invocation<'a> {
    command: &'a CommandDefinition,
    flags: &'a Flags,
}

impl<'a> Invocation<'a> {
    pub fn new(command: &'a CommandDefinition, flags: &'a Flags) -> Self {
        Self { command, flags }
    }

    pub fn command(&self) -> &CommandDefinition {
        self.command
    }

    /// Flags exactly as parsed.
    pub fn flags(&self) -> &Flags {
        self.flags
    }

    fn definition(&self, identifier: &str) -> Result<&'a FlagDefinition, ShellError> {
        self.command
            .flag(identifier)
            .ok_or_else(|| ShellError::UnknownFlag {
                command: self.command.name.clone(),
                flag: identifier.to_string(),
            })
    }

    /// The string a flag stands for.
    ///
    /// A bool flag that appears on the line resolves to `"true"` whatever
    /// follows it. An absent flag resolves to its default, or `None`.
    pub fn raw(&self, identifier: &str) -> Result<Option<String>, ShellError> {
        let flag = self.definition(identifier)?;
        let typed = flag.identifiers().find_map(|id| self.flags.get(id));
        Ok(match typed {
            Some(_) if flag.data_type == DataType::Bool => Some("true".to_string()),
            Some(value) => Some(value.to_string()),
            None => flag.default.as_ref().map(Value::to_string),
        })
    }

    /// The flag's value converted to its declared type.
    pub fn value(&self, identifier: &str) -> Result<Option<Value>, ShellError> {
        let data_type = self.definition(identifier)?.data_type;
        self.coerced(identifier, data_type)
    }

    fn coerced(&self, identifier: &str, data_type: DataType) -> Result<Option<Value>, ShellError> {
        match self.raw(identifier)? {
            Some(raw) => Ok(Some(coerce(&raw, data_type)?)),
            None => Ok(None),
        }
    }

    pub fn string(&self, identifier: &str) -> Result<Option<String>, ShellError> {
        self.raw(identifier)
    }

    pub fn int(&self, identifier: &str) -> Result<Option<i64>, ShellError> {
        Ok(self
            .coerced(identifier, DataType::Int)?
            .and_then(|v| v.as_int()))
    }

    pub fn float(&self, identifier: &str) -> Result<Option<f64>, ShellError> {
        Ok(self
            .coerced(identifier, DataType::Float)?
            .and_then(|v| v.as_float()))
    }

    /// Boolean value, `false` when absent without a default.
    pub fn boolean(&self, identifier: &str) -> Result<bool, ShellError> {
        Ok(self
            .coerced(identifier, DataType::Bool)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    /// Whether the flag was typed on the line under its name or alias.
    pub fn is_set(&self, identifier: &str) -> Result<bool, ShellError> {
        let flag = self.definition(identifier)?;
        Ok(flag.identifiers().any(|id| self.flags.contains(id)))
    }
}
