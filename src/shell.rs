use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::help;
use crate::lexer;
use crate::registry::{Registry, ROOT};
use crate::validate::missing_required;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};
use std::io::{self, Write};
use tracing::{debug, info, warn};

/// Commands that end the session. They never reach the registry.
const QUIT: [&str; 2] = ["quit", "q"];

/// How a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The line was blank.
    Idle,
    /// Help was requested; the text is ready to print.
    Help(String),
    /// The handler ran and succeeded.
    Dispatched,
    /// The session should end.
    Quit,
}

/// An interactive command shell over a [`Registry`].
///
/// Each line goes through tokenizing, quit detection, help interception,
/// command lookup, required-flag validation and finally the handler.
///
/// Example
/// ```
/// use cmdshell::{Outcome, Registry, Shell, ShellConfig};
///
/// let mut registry = Registry::new();
/// registry
///     .command("greet", "say hello", "Prints a greeting.", |inv| {
///         let name = inv.string("name")?.unwrap_or_default();
///         println!("hello {name}");
///         Ok(())
///     })
///     .unwrap()
///     .string_flag("n", "name", "world", "who to greet", false)
///     .unwrap();
///
/// let shell = Shell::new(registry, ShellConfig::default());
/// assert_eq!(shell.execute("greet --name you").unwrap(), Outcome::Dispatched);
/// assert_eq!(shell.execute("q").unwrap(), Outcome::Quit);
/// ```
pub struct Shell {
    registry: Registry,
    config: ShellConfig,
}

impl Shell {
    pub fn new(registry: Registry, config: ShellConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Executes one line.
    ///
    /// Errors are per-line: the session stays usable after any of them.
    pub fn execute(&self, line: &str) -> Result<Outcome, ShellError> {
        if line.trim_matches(' ').is_empty() {
            return Ok(Outcome::Idle);
        }

        let parsed = lexer::tokenize(line)?;
        debug!(command = %parsed.name, flags = parsed.flags.len(), "parsed line");

        if QUIT.contains(&parsed.name.as_str()) {
            return Ok(Outcome::Quit);
        }

        if parsed.flags.is_help_request() && parsed.name == ROOT {
            return Ok(Outcome::Help(self.usage()));
        }

        let command = self
            .registry
            .get(&parsed.name)
            .ok_or_else(|| ShellError::UnknownCommand(parsed.name.clone()))?;

        if parsed.flags.is_help_request() {
            return Ok(Outcome::Help(help::command_help(command)));
        }

        if let Some(flag) = missing_required(command, &parsed.flags) {
            return Err(ShellError::MissingRequiredFlag {
                command: parsed.name.clone(),
                flag: flag.name.clone(),
                usage: help::command_help(command),
            });
        }

        debug!(command = %parsed.name, "dispatching");
        command.invoke(&parsed.flags)?;
        Ok(Outcome::Dispatched)
    }

    /// The global usage banner.
    pub fn usage(&self) -> String {
        help::usage(&self.config.name, &self.registry)
    }

    /// Help text of a registered command.
    pub fn help(&self, name: &str) -> Option<String> {
        self.registry.get(name).map(help::command_help)
    }

    /// Executes a line and reports the result the way the read loop does.
    ///
    /// Returns `false` once the session should end.
    pub fn handle_line(
        &self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> io::Result<bool> {
        match self.execute(line) {
            Ok(Outcome::Quit) => return Ok(false),
            Ok(Outcome::Help(text)) => writeln!(stdout, "{text}")?,
            Ok(Outcome::Idle | Outcome::Dispatched) => {}
            Err(ShellError::MissingRequiredFlag { usage, flag, .. }) => {
                writeln!(stderr, "command failed: missing required flag '-{flag}'")?;
                write!(stdout, "{usage}")?;
            }
            Err(err) => writeln!(stderr, "command failed: {err}")?,
        }
        Ok(true)
    }

    /// Reads lines from the terminal until `quit`, `q`, Ctrl-C or Ctrl-D.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let editor_config = EditorConfig::builder()
            .max_history_size(self.config.max_history)?
            .auto_add_history(false)
            .build();
        let mut rl = DefaultEditor::with_config(editor_config)?;

        if let Some(path) = &self.config.history_file {
            if let Err(err) = rl.load_history(path) {
                debug!(path = %path.display(), error = %err, "no history loaded");
            }
        }

        info!(commands = self.registry.len(), "shell started");
        let stdout = io::stdout();
        let stderr = io::stderr();
        loop {
            match rl.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    let keep_going =
                        self.handle_line(&line, &mut stdout.lock(), &mut stderr.lock())?;
                    if !keep_going {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    warn!(error = %err, "failed to read line");
                    return Err(err);
                }
            }
        }

        if let Some(path) = &self.config.history_file {
            if let Err(err) = rl.save_history(path) {
                warn!(path = %path.display(), error = %err, "failed to save history");
            }
        }
        info!("shell closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn create_shell() -> (Shell, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut registry = Registry::new();
        registry
            .command("get", "get gets", "get gets", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap()
            .string_flag("f", "file", "", "", true)
            .unwrap()
            .int_flag("g", "", 1, "", false)
            .unwrap();
        (Shell::new(registry, ShellConfig::default()), calls)
    }

    #[test]
    fn test_execute() {
        let (shell, _) = create_shell();
        let cases = [
            ("quit", Some(Outcome::Quit)),
            ("q -f x", Some(Outcome::Quit)),
            ("get -f x", Some(Outcome::Dispatched)),
            ("get -f", None),
            ("asdf", None),
            ("   ", Some(Outcome::Idle)),
        ];
        for (line, expected) in cases {
            let result = shell.execute(line);
            match expected {
                Some(outcome) => assert_eq!(result.unwrap(), outcome, "{line}"),
                None => assert!(result.is_err(), "{line}"),
            }
        }
    }

    #[test]
    fn test_help_short_circuits_validation() {
        let (shell, calls) = create_shell();
        for line in ["get -h", "get --help", "help get"] {
            let outcome = shell.execute(line).unwrap();
            assert!(matches!(outcome, Outcome::Help(ref text) if text.starts_with("usage: get")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_required_flag() {
        let (shell, calls) = create_shell();
        let err = shell.execute("get -g 3").unwrap_err();
        match err {
            ShellError::MissingRequiredFlag { command, flag, usage } => {
                assert_eq!(command, "get");
                assert_eq!(flag, "f");
                assert_eq!(Some(usage), shell.help("get"));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        shell.execute("get --file x").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_command_with_help() {
        let (shell, _) = create_shell();
        assert!(matches!(
            shell.execute("nope -h"),
            Err(ShellError::UnknownCommand(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_root_help_without_root_command() {
        let (shell, _) = create_shell();
        for line in ["-h", "--help", "help"] {
            let outcome = shell.execute(line).unwrap();
            assert_eq!(outcome, Outcome::Help(shell.usage()), "{line}");
        }
        assert!(matches!(
            shell.execute("-v"),
            Err(ShellError::UnknownCommand(name)) if name.is_empty()
        ));
    }

    #[test]
    fn test_no_handler() {
        let mut registry = Registry::new();
        registry.register("bare", "", "").unwrap();
        let shell = Shell::new(registry, ShellConfig::default());
        assert!(matches!(
            shell.execute("bare"),
            Err(ShellError::NoHandler(name)) if name == "bare"
        ));
    }

    #[test]
    fn test_parse_error_is_reported() {
        let (shell, _) = create_shell();
        assert!(matches!(shell.execute("get - x"), Err(ShellError::Parse(_))));
    }

    #[test]
    fn test_handle_line_output() {
        let (shell, _) = create_shell();
        let mut out = Vec::new();
        let mut err = Vec::new();

        assert!(shell.handle_line("get", &mut out, &mut err).unwrap());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "command failed: missing required flag '-f'\n"
        );
        assert!(String::from_utf8(out).unwrap().starts_with("usage: get [get flags]"));

        let mut out = Vec::new();
        let mut err = Vec::new();
        assert!(shell.handle_line("asdf", &mut out, &mut err).unwrap());
        assert_eq!(
            String::from_utf8(err.clone()).unwrap(),
            "command failed: failed to find command 'asdf'\n"
        );
        assert!(out.is_empty());

        assert!(!shell.handle_line("quit", &mut out, &mut err).unwrap());
    }
}
