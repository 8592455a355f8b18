//! Splits a raw input line into a command name and its flags.
//!
//! The grammar is deliberately loose:
//!
//! ```text
//! get -d dir -f filename          key/value flags
//! del -d dir -e                   `-e` is a presence flag with an empty value
//! rem -m This is one              multi-word values are joined with single spaces
//! add -m "This is one"            quotes are cosmetic and get removed
//! ls --all                        `--all` and `-all` land on the same key
//! -v                              a leading flag addresses the root command ""
//! help get                        same as `get -h`
//! ```

use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// Sequence separating consecutive flags.
const FLAG_SEPARATOR: &str = " -";

/// Word that turns `help <command>` into `<command> -h`.
const HELP_COMMAND: &str = "help";

/// Key injected by the `help <command>` rewrite.
pub const HELP_SHORT: &str = "h";
pub const HELP_LONG: &str = "help";

/// Errors that can occur while tokenizing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line is empty or contains only spaces.
    #[error("line is empty")]
    EmptyLine,
    /// A `-` or `--` marker was not followed by a flag name.
    #[error("flag marker without a name at segment '{0}'")]
    MissingFlagName(String),
}

/// Flags of a parsed line, keyed by identifier with the leading dashes stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags(HashMap<String, String>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for `key`, exactly as typed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a flag, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the line asked for help with `-h` or `--help`.
    pub fn is_help_request(&self) -> bool {
        self.contains(HELP_SHORT) || self.contains(HELP_LONG)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Flags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Flags(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Result of tokenizing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Command name; empty for the root command.
    pub name: String,
    pub flags: Flags,
}

/// Tokenizes a single input line.
///
/// # Arguments
/// * `line` - The raw line, without a trailing newline.
///
/// # Returns
/// The command name and its flags, or a [`ParseError`] when the line is blank
/// or contains a flag marker without a name.
pub fn tokenize(line: &str) -> Result<ParsedCommand, ParseError> {
    let line = line.trim_matches(' ');
    if line.is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let name = command_name(line);
    let mut flags = parse_flags(line)?;

    if name != HELP_COMMAND {
        return Ok(ParsedCommand {
            name: name.to_string(),
            flags,
        });
    }

    // `help` alone asks for the global usage, `help <cmd>` for a command's.
    let target = line
        .split(' ')
        .skip(1)
        .find(|word| !word.is_empty())
        .filter(|word| !word.starts_with('-'))
        .unwrap_or("");
    flags.insert(HELP_SHORT, "");
    Ok(ParsedCommand {
        name: target.to_string(),
        flags,
    })
}

fn command_name(line: &str) -> &str {
    if line.starts_with('-') {
        return "";
    }
    line.split_once(' ').map_or(line, |(name, _)| name)
}

fn parse_flags(line: &str) -> Result<Flags, ParseError> {
    // A leading separator lets a root-command line split like any other.
    let padded;
    let line = if line.starts_with('-') {
        padded = format!(" {line}");
        padded.as_str()
    } else {
        line
    };

    let mut flags = Flags::new();
    for segment in line.split(FLAG_SEPARATOR).skip(1) {
        // `--name` arrives here as `-name`
        let segment = segment.strip_prefix('-').unwrap_or(segment);
        let (key, value) = key_value(segment);
        if key.is_empty() {
            return Err(ParseError::MissingFlagName(segment.to_string()));
        }
        trace!(key, value = value.as_str(), "flag");
        flags.insert(key, value);
    }
    Ok(flags)
}

fn key_value(segment: &str) -> (&str, String) {
    match segment.split_once(' ') {
        None => (segment.trim_matches(' '), String::new()),
        Some((key, rest)) => {
            let value = rest
                .split(' ')
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .replace('"', "");
            (key.trim_matches(' '), value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_empty_values(flags: &Flags) -> usize {
        flags.iter().filter(|(_, v)| !v.is_empty()).count()
    }

    #[test]
    fn test_flag_counts() {
        let cases = [
            ("get -d dir -f filename", "get", 2, 2),
            ("del -d dir -f filename -e", "del", 3, 2),
            ("rem -d dir -f filename -e --m This is one", "rem", 4, 3),
            ("add -d dir -f filename -e -m \"This is one\"", "add", 4, 3),
        ];
        for (line, name, count, non_empty) in cases {
            let parsed = tokenize(line).unwrap();
            assert_eq!(parsed.name, name, "{line}");
            assert_eq!(parsed.flags.len(), count, "{line}");
            assert_eq!(non_empty_values(&parsed.flags), non_empty, "{line}");
        }
    }

    #[test]
    fn test_key_value_flags() {
        let parsed = tokenize("cmd -a 1 -b 2").unwrap();
        assert_eq!(parsed.name, "cmd");
        assert_eq!(parsed.flags.len(), 2);
        assert_eq!(parsed.flags.get("a"), Some("1"));
        assert_eq!(parsed.flags.get("b"), Some("2"));
    }

    #[test]
    fn test_presence_flag_is_empty() {
        let parsed = tokenize("cmd -e").unwrap();
        assert_eq!(parsed.flags.get("e"), Some(""));
    }

    #[test]
    fn test_multi_word_value() {
        let parsed = tokenize("cmd -m one two three").unwrap();
        assert_eq!(parsed.flags.get("m"), Some("one two three"));

        let parsed = tokenize("cmd -m one   two -x").unwrap();
        assert_eq!(parsed.flags.get("m"), Some("one two"));
        assert_eq!(parsed.flags.get("x"), Some(""));
    }

    #[test]
    fn test_quotes_are_stripped() {
        let parsed = tokenize("cmd -m \"one two\"").unwrap();
        assert_eq!(parsed.flags.get("m"), Some("one two"));

        let parsed = tokenize("cmd -f \"file\"").unwrap();
        assert_eq!(parsed.flags.get("f"), Some("file"));
    }

    #[test]
    fn test_long_and_short_share_key_space() {
        let long = tokenize("ls --all yes").unwrap();
        let short = tokenize("ls -all yes").unwrap();
        assert_eq!(long, short);
        assert_eq!(long.flags.get("all"), Some("yes"));
    }

    #[test]
    fn test_surrounding_spaces_are_trimmed() {
        let parsed = tokenize("   get -f name   ").unwrap();
        assert_eq!(parsed.name, "get");
        assert_eq!(parsed.flags.get("f"), Some("name"));
    }

    #[test]
    fn test_command_without_flags() {
        let parsed = tokenize("status").unwrap();
        assert_eq!(parsed.name, "status");
        assert!(parsed.flags.is_empty());
    }

    #[test]
    fn test_leading_flag_addresses_root_command() {
        let parsed = tokenize("-v --level 3").unwrap();
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.flags.get("v"), Some(""));
        assert_eq!(parsed.flags.get("level"), Some("3"));
    }

    #[test]
    fn test_positional_words_are_ignored() {
        let parsed = tokenize("get stray words -f x").unwrap();
        assert_eq!(parsed.name, "get");
        assert_eq!(parsed.flags.len(), 1);
        assert_eq!(parsed.flags.get("f"), Some("x"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let parsed = tokenize("get -f a -f b").unwrap();
        assert_eq!(parsed.flags.get("f"), Some("b"));
    }

    #[test]
    fn test_empty_line_is_rejected() {
        assert_eq!(tokenize(""), Err(ParseError::EmptyLine));
        assert_eq!(tokenize("    "), Err(ParseError::EmptyLine));
    }

    #[test]
    fn test_bare_marker_is_rejected() {
        assert!(matches!(
            tokenize("get - x"),
            Err(ParseError::MissingFlagName(_))
        ));
        assert!(matches!(
            tokenize("get --"),
            Err(ParseError::MissingFlagName(_))
        ));
    }

    #[test]
    fn test_help_rewrite() {
        let rewritten = tokenize("help get").unwrap();
        assert_eq!(rewritten.name, "get");
        assert!(rewritten.flags.is_help_request());
        assert_eq!(rewritten, tokenize("get -h").unwrap());
    }

    #[test]
    fn test_bare_help_targets_root() {
        let parsed = tokenize("help").unwrap();
        assert_eq!(parsed.name, "");
        assert!(parsed.flags.is_help_request());
    }

    #[test]
    fn test_help_flags() {
        assert!(tokenize("get -h").unwrap().flags.is_help_request());
        assert!(tokenize("get --help").unwrap().flags.is_help_request());
        assert!(!tokenize("get -f x").unwrap().flags.is_help_request());
    }
}
