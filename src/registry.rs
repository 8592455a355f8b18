use crate::command::{CommandDefinition, Invocation};
use crate::error::RegistrationError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Names the shell handles itself; they can't be registered.
pub const RESERVED: [&str; 3] = ["quit", "q", "help"];

/// Name of the root command, which owns the top-level flags.
pub const ROOT: &str = "";

/// The set of commands a [`Shell`](crate::Shell) can dispatch to.
///
/// Populate it during setup, then hand it to the shell. The empty name
/// [`ROOT`] addresses the global command used for lines that start with a flag.
#[derive(Debug, Default)]
pub struct Registry {
    commands: HashMap<String, CommandDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a command and returns it so flags can be declared on it.
    ///
    /// Registering an existing name updates its descriptions and keeps the
    /// flags and handler already attached.
    pub fn register(
        &mut self,
        name: &str,
        short_description: &str,
        description: &str,
    ) -> Result<&mut CommandDefinition, RegistrationError> {
        if RESERVED.contains(&name) {
            warn!(command = name, "attempt to register a reserved name");
            return Err(RegistrationError::ReservedName(name.to_string()));
        }
        debug!(command = name, "registering command");
        let cmd = self
            .commands
            .entry(name.to_string())
            .or_insert_with(|| CommandDefinition::new(name, "", ""));
        cmd.short_description = short_description.to_string();
        cmd.description = description.to_string();
        Ok(cmd)
    }

    /// Registers a command together with its handler.
    pub fn command<F>(
        &mut self,
        name: &str,
        short_description: &str,
        description: &str,
        handler: F,
    ) -> Result<&mut CommandDefinition, RegistrationError>
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Ok(self
            .register(name, short_description, description)?
            .handler(handler))
    }

    /// Registers a command whose handler does nothing.
    ///
    /// Useful for the root command, which mostly exists to carry global flags.
    pub fn simple(
        &mut self,
        name: &str,
        short_description: &str,
        description: &str,
    ) -> Result<&mut CommandDefinition, RegistrationError> {
        self.command(name, short_description, description, |_| Ok(()))
    }

    /// Attaches a handler, creating a bare command if `name` is unknown.
    pub fn set_handler<F>(&mut self, name: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        match self.commands.get_mut(name) {
            Some(cmd) => {
                cmd.handler(handler);
            }
            None => {
                self.register(name, "", "")?.handler(handler);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandDefinition> {
        self.commands.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered command names in lexicographic order, without the root command.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .commands
            .keys()
            .map(String::as_str)
            .filter(|name| *name != ROOT)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
