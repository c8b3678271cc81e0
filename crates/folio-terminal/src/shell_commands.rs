//! Shell state commands: clear, whoami, history, env, export, unset, alias,
//! unalias, man.

use folio_types::config::Messages;
use folio_types::error::Result;

use crate::interpreter::{Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear the terminal"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Clear)
    }
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Print the current user"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let user = env.vars.get("USER").map_or("visitor", String::as_str);
        Ok(CommandOutput::Text(user.to_string()))
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "Show or clear command history"
    }
    fn usage(&self) -> &str {
        "history [-c]"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args {
            [] => {},
            ["-c"] => {
                env.history.clear();
                return Ok(CommandOutput::Text(env.messages.history_cleared.clone()));
            },
            _ => return Err(env.usage_error(self.usage())),
        }
        if env.history.is_empty() {
            return Ok(CommandOutput::Text(env.messages.no_history.clone()));
        }
        let lines: Vec<String> = env
            .history
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{:4}  {entry}", i + 1))
            .collect();
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// env / export / unset
// ---------------------------------------------------------------------------

fn list_vars(env: &Environment<'_>) -> CommandOutput {
    if env.vars.is_empty() {
        return CommandOutput::None;
    }
    let lines: Vec<String> = env.vars.iter().map(|(k, v)| format!("{k}={v}")).collect();
    CommandOutput::Text(lines.join("\n"))
}

fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

struct EnvCmd;
impl Command for EnvCmd {
    fn name(&self) -> &str {
        "env"
    }
    fn description(&self) -> &str {
        "List shell variables"
    }
    fn usage(&self) -> &str {
        "env"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(list_vars(env))
    }
}

struct ExportCmd;
impl Command for ExportCmd {
    fn name(&self) -> &str {
        "export"
    }
    fn description(&self) -> &str {
        "Set shell variables"
    }
    fn usage(&self) -> &str {
        "export NAME=value..."
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Ok(list_vars(env));
        }
        for &arg in args {
            let (name, value) = arg.split_once('=').unwrap_or((arg, ""));
            if !valid_name(name) {
                return Err(env.usage_error(self.usage()));
            }
            // `export NAME` keeps an existing value.
            if value.is_empty() && !arg.contains('=') {
                env.vars.entry(name.to_string()).or_default();
            } else {
                env.vars.insert(name.to_string(), value.to_string());
            }
        }
        Ok(CommandOutput::None)
    }
}

struct UnsetCmd;
impl Command for UnsetCmd {
    fn name(&self) -> &str {
        "unset"
    }
    fn description(&self) -> &str {
        "Remove shell variables"
    }
    fn usage(&self) -> &str {
        "unset NAME..."
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(env.usage_error(self.usage()));
        }
        for name in args {
            env.vars.remove(*name);
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// alias / unalias
// ---------------------------------------------------------------------------

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

struct AliasCmd;
impl Command for AliasCmd {
    fn name(&self) -> &str {
        "alias"
    }
    fn description(&self) -> &str {
        "Define or list command aliases"
    }
    fn usage(&self) -> &str {
        "alias [name[=value]]"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            if env.aliases.is_empty() {
                return Ok(CommandOutput::Text(env.messages.no_aliases.clone()));
            }
            let lines: Vec<String> = env
                .aliases
                .iter()
                .map(|(k, v)| format!("alias {k}='{v}'"))
                .collect();
            return Ok(CommandOutput::Text(lines.join("\n")));
        }

        // `alias ll=ls -al` arrives split, so rejoin before parsing.
        let joined = args.join(" ");
        match joined.split_once('=') {
            Some((name, value)) => {
                let name = name.trim();
                if name.is_empty() || name.contains(char::is_whitespace) {
                    return Err(env.usage_error(self.usage()));
                }
                let value = strip_quotes(value);
                log::debug!("alias {name}='{value}'");
                env.aliases.insert(name.to_string(), value.to_string());
                Ok(CommandOutput::None)
            },
            None => match env.aliases.get(args[0]) {
                Some(value) => Ok(CommandOutput::Text(format!("alias {}='{value}'", args[0]))),
                None => Err(env.error(&env.messages.not_aliased, &[("name", args[0])])),
            },
        }
    }
}

struct UnaliasCmd;
impl Command for UnaliasCmd {
    fn name(&self) -> &str {
        "unalias"
    }
    fn description(&self) -> &str {
        "Remove command aliases"
    }
    fn usage(&self) -> &str {
        "unalias <name...>"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(env.usage_error(self.usage()));
        }
        let mut missing = Vec::new();
        for &name in args {
            if env.aliases.remove(name).is_none() {
                missing.push(Messages::fill(&env.messages.not_aliased, &[("name", name)]));
            }
        }
        if missing.is_empty() {
            Ok(CommandOutput::None)
        } else {
            Ok(CommandOutput::Text(missing.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// man
// ---------------------------------------------------------------------------

/// Static manual pages: `(topic, synopsis, description)`.
const MANUAL: &[(&str, &str, &str)] = &[
    ("alias", "alias [name[=value]]", "Define an alias, show one, or list all of them."),
    ("cat", "cat <file...>", "Print the contents of one or more files."),
    ("cd", "cd [path]", "Change the working directory. With no path, go home."),
    ("chess", "chess [--two-player] [--seed N]", "Play chess against a bot that plays black."),
    ("clear", "clear", "Erase the terminal output."),
    ("cp", "cp [-r] <source> <dest>", "Copy a file or a whole directory tree."),
    ("echo", "echo [text...]", "Print the arguments separated by spaces."),
    ("env", "env", "List shell variables as NAME=value."),
    ("exit", "exit", "Leave the running program and return to the shell."),
    ("export", "export NAME=value...", "Set shell variables for $NAME expansion."),
    ("find", "find [path] [-name <glob>]", "List paths below a directory, optionally by name."),
    ("grep", "grep [-i] [-r] <pattern> <path...>", "Print lines matching a pattern (* matches anything) as path:line:text."),
    ("head", "head [-n N] <file>", "Print the first N lines of a file (default 10)."),
    ("help", "help [command]", "List every command, or describe one."),
    ("history", "history [-c]", "List previous command lines, or clear them with -c."),
    ("ls", "ls [-a] [-l] [path]", "List a directory. -a shows dotfiles, -l shows types."),
    ("man", "man <topic>", "Show the manual page for a topic."),
    ("mkdir", "mkdir [-p] <dir...>", "Create directories. -p creates missing parents."),
    ("music", "music [track]", "Open the music player."),
    ("mv", "mv <source> <dest>", "Move or rename a file or directory."),
    ("nano", "nano [file]", "Edit a file. Press Escape to leave."),
    ("open", "open <file>", "Open a file in the page, a viewer, or the terminal."),
    ("pacman", "pacman [--seed N]", "Eat every pellet while avoiding three ghosts."),
    ("pong", "pong [--seed N]", "Keep the ball in play with the left and right keys."),
    ("pwd", "pwd", "Print the working directory."),
    ("rm", "rm [-r] [-f] <path...>", "Remove files. Directories with contents need -r."),
    ("rmdir", "rmdir <dir...>", "Remove empty directories."),
    ("show", "show <section|file>", "Scroll the page to a section."),
    ("snake", "snake [--seed N]", "Grow the snake by eating food. Avoid walls and yourself."),
    ("tail", "tail [-n N] <file>", "Print the last N lines of a file (default 10)."),
    ("touch", "touch <file...>", "Create empty files."),
    ("tree", "tree [path]", "Draw the directory tree."),
    ("unalias", "unalias <name...>", "Remove aliases."),
    ("unset", "unset NAME...", "Remove shell variables."),
    ("view", "view [file]", "Show an image file."),
    ("wc", "wc <file>", "Count lines, words and characters."),
    ("which", "which <command>", "Tell whether a name is a command, a built-in or an alias."),
    ("whoami", "whoami", "Print the current user."),
];

struct ManCmd;
impl Command for ManCmd {
    fn name(&self) -> &str {
        "man"
    }
    fn description(&self) -> &str {
        "Show the manual for a command"
    }
    fn usage(&self) -> &str {
        "man <topic>"
    }
    fn category(&self) -> &str {
        "shell"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [topic] = args else {
            return Err(env.usage_error(self.usage()));
        };
        let topic = topic.to_ascii_lowercase();
        match MANUAL.iter().find(|(name, _, _)| *name == topic) {
            Some((name, synopsis, description)) => Ok(CommandOutput::Text(format!(
                "NAME\n    {name}\n\nSYNOPSIS\n    {synopsis}\n\nDESCRIPTION\n    {description}"
            ))),
            None => Err(env.error(
                &env.messages.no_manual_entry,
                &[("topic", topic.as_str())],
            )),
        }
    }
}

/// Register the shell state commands.
pub fn register_shell_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(ClearCmd));
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(HistoryCmd));
    reg.register(Box::new(EnvCmd));
    reg.register(Box::new(ExportCmd));
    reg.register(Box::new(UnsetCmd));
    reg.register(Box::new(AliasCmd));
    reg.register(Box::new(UnaliasCmd));
    reg.register(Box::new(ManCmd));
}
