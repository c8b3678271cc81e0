//! Command trait, registry, and the shell tokenizer.
//!
//! Handlers receive a split borrow of the engine state through
//! [`Environment`] and answer with a [`CommandOutput`]. Failures are
//! returned as [`FolioError::Command`] and printed verbatim by the engine.

use std::collections::{BTreeMap, HashMap};

use folio_programs::{LaunchArgs, ProgramKind};
use folio_types::config::Messages;
use folio_types::error::{FolioError, Result};
use folio_vfs::MemoryVfs;

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text, one terminal line per `\n`-separated line.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to clear the terminal output buffer.
    Clear,
    /// Ask the hosting page to scroll to a section.
    Navigate {
        section: String,
    },
    /// Hand input and rendering to an embedded program.
    Launch {
        kind: ProgramKind,
        args: LaunchArgs,
    },
}

/// Engine state a command may read or modify.
pub struct Environment<'a> {
    /// The virtual file system, including the working directory.
    pub vfs: &'a mut MemoryVfs,
    /// Shell variables used for `$VAR` expansion.
    pub vars: &'a mut BTreeMap<String, String>,
    /// Command aliases, expanded one level deep.
    pub aliases: &'a mut BTreeMap<String, String>,
    /// Raw command lines, oldest first.
    pub history: &'a mut Vec<String>,
    /// Localized output templates.
    pub messages: &'a Messages,
}

impl Environment<'_> {
    /// A user-facing error built from a message template.
    pub fn error(&self, template: &str, vars: &[(&str, &str)]) -> FolioError {
        FolioError::Command(Messages::fill(template, vars))
    }

    /// The configured usage error for `usage`.
    pub fn usage_error(&self, usage: &str) -> FolioError {
        self.error(&self.messages.usage, &[("usage", usage)])
    }
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-a\] \[-l\] \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Commands answered by the registry or the engine rather than a handler.
const BUILTINS: [(&str, &str); 3] = [
    ("exit", "Leave the running program"),
    ("help", "List commands or describe one"),
    ("which", "Show what a command name refers to"),
];

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    /// Whether `name` is registered or answered by the registry itself.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name) || matches!(name, "help" | "which")
    }

    /// Run `name` with `args`. Returns `None` when no such command exists.
    ///
    /// `help` and `which` are intercepted here because they need the
    /// registry itself.
    pub fn dispatch(
        &self,
        name: &str,
        args: &[&str],
        env: &mut Environment<'_>,
    ) -> Option<Result<CommandOutput>> {
        match name {
            "help" => Some(self.execute_help(args)),
            "which" => Some(self.execute_which(args, env)),
            _ => {
                let cmd = self.commands.get(name)?;
                log::debug!("dispatch {name} {args:?}");
                Some(cmd.execute(args, env))
            },
        }
    }

    /// Built-in `help` command.
    fn execute_help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            let name_lower = name.to_ascii_lowercase();
            if let Some(cmd) = self.commands.get(name_lower.as_str()) {
                let mut out = format!("{} ({})\n", cmd.name(), cmd.category());
                out.push_str(&format!("  {}\n", cmd.description()));
                out.push_str(&format!("  Usage: {}", cmd.usage()));
                return Ok(CommandOutput::Text(out));
            }
            return match BUILTINS.iter().find(|(n, _)| *n == name_lower) {
                Some((n, desc)) => Ok(CommandOutput::Text(format!(
                    "{n} (general)\n  {desc}\n  Usage: {n}"
                ))),
                None => Err(FolioError::Command(format!("unknown command: {name}"))),
            };
        }

        // Group commands by category.
        let mut categories: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for (name, desc) in BUILTINS {
            categories.entry("general").or_default().push((name, desc));
        }
        for cmd in self.commands.values() {
            categories
                .entry(cmd.category())
                .or_default()
                .push((cmd.name(), cmd.description()));
        }

        let total: usize = categories.values().map(Vec::len).sum();
        let mut out = format!("Commands ({total}):\n");
        for (cat, cmds) in &mut categories {
            cmds.sort_by_key(|(name, _)| *name);
            out.push_str(&format!("\n  [{cat}]\n"));
            for (name, desc) in cmds.iter() {
                out.push_str(&format!("    {name:12} {desc}\n"));
            }
        }
        out.push_str("\nType 'help <command>' for details.");
        Ok(CommandOutput::Text(out))
    }

    /// Built-in `which` command.
    fn execute_which(&self, args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
        let Some(first) = args.first() else {
            return Err(env.usage_error("which <command>"));
        };
        let name = first.to_ascii_lowercase();
        if let Some(expansion) = env.aliases.get(&name) {
            return Ok(CommandOutput::Text(format!(
                "{name}: aliased to '{expansion}'"
            )));
        }
        if BUILTINS.iter().any(|(n, _)| *n == name) {
            return Ok(CommandOutput::Text(format!("{name}: shell built-in")));
        }
        match self.commands.get(name.as_str()) {
            Some(cmd) => Ok(CommandOutput::Text(format!(
                "{}: {} ({})",
                cmd.name(),
                cmd.description(),
                cmd.category()
            ))),
            None => Err(FolioError::Command(format!("{name}: not found"))),
        }
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }

    /// Return sorted completions for a partial command name.
    pub fn completions(&self, partial: &str) -> Vec<String> {
        let lower = partial.to_ascii_lowercase();
        let mut names: Vec<String> = self
            .commands
            .keys()
            .map(String::as_str)
            .chain(BUILTINS.iter().map(|(n, _)| *n))
            .filter(|name| name.starts_with(&lower))
            .map(str::to_string)
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: quotes, backslash escapes, and variable expansion.
// ---------------------------------------------------------------------------

type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// `$VAR` references are kept literally; see [`tokenize_with`].
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    split_words(input, None)
}

/// Tokenize and expand `$VAR` / `${VAR}` through `lookup`.
///
/// - Single-quoted strings preserve all characters literally.
/// - Double-quoted strings expand variables and honour `\"`, `\\`, `\$`.
/// - Backslash escapes the next character outside of quotes.
/// - Undefined variables expand to nothing.
pub fn tokenize_with<F>(input: &str, lookup: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    split_words(input, Some(&lookup))
}

fn split_words(input: &str, lookup: Option<Lookup<'_>>) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Set once the word has any content, so `""` still yields a token.
    let mut started = false;
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            match ch {
                '"' => in_double = false,
                '\\' => match chars.peek() {
                    Some(&next) if matches!(next, '"' | '\\' | '$') => {
                        current.push(next);
                        chars.next();
                    },
                    _ => current.push('\\'),
                },
                '$' => expand_var(&mut chars, lookup, &mut current)?,
                _ => current.push(ch),
            }
        } else {
            match ch {
                '\'' => {
                    in_single = true;
                    started = true;
                },
                '"' => {
                    in_double = true;
                    started = true;
                },
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        started = true;
                    }
                },
                '$' => {
                    expand_var(&mut chars, lookup, &mut current)?;
                    started |= !current.is_empty();
                },
                c if c.is_whitespace() => {
                    if started {
                        tokens.push(std::mem::take(&mut current));
                        started = false;
                    }
                },
                _ => {
                    current.push(ch);
                    started = true;
                },
            }
        }
    }

    if in_single {
        return Err(FolioError::Command("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(FolioError::Command("unterminated double quote".to_string()));
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Expand the reference following a `$` into `out`.
fn expand_var(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    lookup: Option<Lookup<'_>>,
    out: &mut String,
) -> Result<()> {
    let Some(lookup) = lookup else {
        out.push('$');
        return Ok(());
    };

    let mut name = String::new();
    if chars.peek() == Some(&'{') {
        chars.next();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => return Err(FolioError::Command("bad substitution".to_string())),
            }
        }
    } else {
        while let Some(&c) = chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            out.push('$');
            return Ok(());
        }
    }

    if let Some(value) = lookup(&name) {
        out.push_str(&value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::config::SeedFile;

    struct EchoCmd;
    impl Command for EchoCmd {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Print arguments"
        }
        fn usage(&self) -> &str {
            "echo [text...]"
        }
        fn category(&self) -> &str {
            "text"
        }
        fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Text(args.join(" ")))
        }
    }

    struct State {
        vfs: MemoryVfs,
        vars: BTreeMap<String, String>,
        aliases: BTreeMap<String, String>,
        history: Vec<String>,
        messages: Messages,
    }

    impl State {
        fn new() -> Self {
            Self {
                vfs: MemoryVfs::from_seeds(&[SeedFile::file("/a.txt", "x")], "/home/u"),
                vars: BTreeMap::new(),
                aliases: BTreeMap::new(),
                history: Vec::new(),
                messages: Messages::default(),
            }
        }

        fn env(&mut self) -> Environment<'_> {
            Environment {
                vfs: &mut self.vfs,
                vars: &mut self.vars,
                aliases: &mut self.aliases,
                history: &mut self.history,
                messages: &self.messages,
            }
        }
    }

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(EchoCmd));
        reg
    }

    fn text(out: Option<Result<CommandOutput>>) -> String {
        match out {
            Some(Ok(CommandOutput::Text(s))) => s,
            Some(Err(e)) => e.to_string(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn register_and_dispatch() {
        let reg = registry();
        let mut state = State::new();
        let out = reg.dispatch("echo", &["hello", "world"], &mut state.env());
        assert_eq!(text(out), "hello world");
    }

    #[test]
    fn unknown_command_is_none() {
        let reg = registry();
        let mut state = State::new();
        assert!(reg.dispatch("nonexistent", &[], &mut state.env()).is_none());
        assert!(!reg.contains("nonexistent"));
        assert!(reg.contains("help"));
    }

    #[test]
    fn help_groups_by_category() {
        let reg = registry();
        let mut state = State::new();
        let out = text(reg.dispatch("help", &[], &mut state.env()));
        assert!(out.starts_with("Commands (4):"));
        assert!(out.contains("[text]"));
        assert!(out.contains("[general]"));
        assert!(out.contains("    echo         Print arguments"));
    }

    #[test]
    fn help_for_one_command() {
        let reg = registry();
        let mut state = State::new();
        let out = text(reg.dispatch("help", &["ECHO"], &mut state.env()));
        assert_eq!(out, "echo (text)\n  Print arguments\n  Usage: echo [text...]");
        let out = text(reg.dispatch("help", &["nope"], &mut state.env()));
        assert_eq!(out, "unknown command: nope");
    }

    #[test]
    fn which_reports_kind() {
        let reg = registry();
        let mut state = State::new();
        state.aliases.insert("ll".into(), "ls -al".into());
        let mut env = state.env();
        assert_eq!(
            text(reg.dispatch("which", &["echo"], &mut env)),
            "echo: Print arguments (text)"
        );
        assert_eq!(
            text(reg.dispatch("which", &["help"], &mut env)),
            "help: shell built-in"
        );
        assert_eq!(
            text(reg.dispatch("which", &["ll"], &mut env)),
            "ll: aliased to 'ls -al'"
        );
        assert_eq!(text(reg.dispatch("which", &["zzz"], &mut env)), "zzz: not found");
        assert_eq!(
            text(reg.dispatch("which", &[], &mut env)),
            "usage: which <command>"
        );
    }

    #[test]
    fn completions_include_builtins() {
        let reg = registry();
        assert_eq!(reg.completions("e"), vec!["echo", "exit"]);
        assert_eq!(reg.completions("WH"), vec!["which"]);
        assert!(reg.completions("q").is_empty());
    }

    #[test]
    fn list_commands_sorted() {
        let reg = registry();
        let cmds = reg.list_commands();
        assert_eq!(cmds, vec![("echo", "Print arguments")]);
    }

    // -- Tokenizer --

    #[test]
    fn tokenize_quotes_and_escapes() {
        let tokens = tokenize(r#"echo "a b" 'c d' e\ f"#).unwrap();
        assert_eq!(tokens, vec!["echo", "a b", "c d", "e f"]);
    }

    #[test]
    fn tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  ls   -a\t/x  ").unwrap(), vec!["ls", "-a", "/x"]);
        assert!(tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn tokenize_keeps_empty_quoted_word() {
        assert_eq!(tokenize(r#"echo "" x"#).unwrap(), vec!["echo", "", "x"]);
    }

    #[test]
    fn tokenize_joins_adjacent_quoted_parts() {
        assert_eq!(tokenize(r#"a"b c"'d'"#).unwrap(), vec!["ab cd"]);
    }

    #[test]
    fn double_quote_escapes() {
        let tokens = tokenize(r#""say \"hi\" \\ \n""#).unwrap();
        assert_eq!(tokens, vec![r#"say "hi" \ \n"#]);
    }

    #[test]
    fn unterminated_quotes_are_errors() {
        let err = tokenize("echo 'oops").unwrap_err();
        assert_eq!(err.to_string(), "unterminated single quote");
        let err = tokenize("echo \"oops").unwrap_err();
        assert_eq!(err.to_string(), "unterminated double quote");
    }

    fn vars(name: &str) -> Option<String> {
        match name {
            "USER" => Some("ada".to_string()),
            "EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[test]
    fn expands_bare_and_braced_vars() {
        let tokens = tokenize_with("echo $USER ${USER}x \"hi $USER\"", vars).unwrap();
        assert_eq!(tokens, vec!["echo", "ada", "adax", "hi ada"]);
    }

    #[test]
    fn single_quotes_block_expansion() {
        let tokens = tokenize_with("echo '$USER' \\$USER \"\\$USER\"", vars).unwrap();
        assert_eq!(tokens, vec!["echo", "$USER", "$USER", "$USER"]);
    }

    #[test]
    fn undefined_vars_expand_to_nothing() {
        assert_eq!(tokenize_with("echo $NOPE", vars).unwrap(), vec!["echo"]);
        assert_eq!(tokenize_with("echo a$NOPE", vars).unwrap(), vec!["echo", "a"]);
        assert_eq!(
            tokenize_with("echo \"$EMPTY\"", vars).unwrap(),
            vec!["echo", ""]
        );
    }

    #[test]
    fn lone_dollar_is_literal() {
        assert_eq!(tokenize_with("echo $ 5$", vars).unwrap(), vec!["echo", "$", "5$"]);
    }

    #[test]
    fn plain_tokenize_does_not_expand() {
        assert_eq!(tokenize("echo $USER").unwrap(), vec!["echo", "$USER"]);
    }

    #[test]
    fn unclosed_brace_is_error() {
        assert!(tokenize_with("echo ${USER", vars).is_err());
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn plain_words_roundtrip(words in proptest::collection::vec("[a-zA-Z0-9_./-]{1,8}", 0..8)) {
                let line = words.join(" ");
                prop_assert_eq!(tokenize(&line).unwrap(), words);
            }

            #[test]
            fn single_quoting_preserves_text(text in "[^']{0,30}") {
                let line = format!("'{text}'");
                prop_assert_eq!(tokenize_with(&line, vars).unwrap(), vec![text]);
            }

            #[test]
            fn tokenize_never_panics(line in ".{0,60}") {
                let _ = tokenize_with(&line, vars);
            }
        }
    }
}
