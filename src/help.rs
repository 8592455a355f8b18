//! Help and usage text.
//!
//! Output is deterministic: flags are sorted by name and commands by name, so
//! rendering the same registry twice yields the same text.

use crate::command::CommandDefinition;
use crate::flag::FlagDefinition;
use crate::registry::{Registry, ROOT};
use std::fmt::Write;

/// Help for one command.
///
/// ```text
/// usage: get [get flags]
///
/// get gets a file
///
/// Flags:
///     -f  --file  file to get (required: true)
///     -h  --help  prints out information about the command (required: false)
/// ```
pub fn command_help(command: &CommandDefinition) -> String {
    let name = command.name();
    let mut out = format!(
        "usage: {name} [{name} flags]\n\n{}\n\nFlags:\n",
        command.description()
    );
    for flag in sorted_flags(command) {
        out.push_str(&flag.to_string());
    }
    out
}

/// Declared flags plus the implicit `-h` entry, sorted by name.
fn sorted_flags(command: &CommandDefinition) -> Vec<FlagDefinition> {
    let mut flags: Vec<FlagDefinition> = command.flags().cloned().collect();
    if command.flag("h").is_none() {
        flags.push(FlagDefinition::help());
    }
    flags.sort_by(|a, b| a.name.cmp(&b.name));
    flags
}

/// The global usage banner: root flags, then every command with its short
/// description.
pub fn usage(app: &str, registry: &Registry) -> String {
    let mut out = format!("Usage:\n\n\t{app} <command> [options]\n\n");

    if let Some(root) = registry.get(ROOT) {
        out.push_str("Flags:\n");
        for flag in sorted_flags(root) {
            out.push_str(&flag.to_string());
        }
        out.push('\n');
    }

    out.push_str("Commands:\n");
    let names = registry.names();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    for name in names {
        let short = registry
            .get(name)
            .map(CommandDefinition::short_description)
            .unwrap_or_default();
        // writing to a String can't fail
        let _ = writeln!(out, "\t{name:<width$}  {short}");
    }

    let _ = write!(
        out,
        "\nUse \"{app} <command> -h\" for more information about a command."
    );
    out
}
