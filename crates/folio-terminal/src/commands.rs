//! Built-in commands for the folio terminal.

use crate::interpreter::CommandRegistry;

/// Register every built-in command into a registry.
///
/// `help`, `which` and `exit` are not registered here: the registry and the
/// engine answer them directly.
pub fn register_builtins(reg: &mut CommandRegistry) {
    crate::file_commands::register_file_commands(reg);
    crate::text_commands::register_text_commands(reg);
    crate::shell_commands::register_shell_commands(reg);
    crate::program_commands::register_program_commands(reg);
}

/// Flags and positional arguments of a command line.
///
/// Every argument that starts with `-` (and is not just `-`) contributes its
/// letters to the flag set; `--` ends flag parsing.
pub(crate) struct Parsed<'a> {
    pub flags: Vec<char>,
    pub positional: Vec<&'a str>,
}

impl Parsed<'_> {
    pub fn has(&self, flag: char) -> bool {
        self.flags.contains(&flag)
    }
}

pub(crate) fn parse_flags<'a>(args: &[&'a str]) -> Parsed<'a> {
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    let mut only_positional = false;
    for &arg in args {
        if only_positional {
            positional.push(arg);
        } else if arg == "--" {
            only_positional = true;
        } else if let Some(letters) = arg.strip_prefix('-').filter(|l| !l.is_empty()) {
            flags.extend(letters.chars());
        } else {
            positional.push(arg);
        }
    }
    Parsed { flags, positional }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_flags_split_into_letters() {
        let parsed = parse_flags(&["-al", "docs", "-r"]);
        assert_eq!(parsed.flags, vec!['a', 'l', 'r']);
        assert_eq!(parsed.positional, vec!["docs"]);
        assert!(parsed.has('l'));
        assert!(!parsed.has('x'));
    }

    #[test]
    fn double_dash_ends_flags() {
        let parsed = parse_flags(&["-f", "--", "-weird", "-"]);
        assert_eq!(parsed.flags, vec!['f']);
        assert_eq!(parsed.positional, vec!["-weird", "-"]);
    }

    #[test]
    fn every_listed_command_is_registered() {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        for name in [
            "ls", "cd", "pwd", "cat", "echo", "clear", "mkdir", "touch", "rm", "rmdir", "mv",
            "cp", "find", "grep", "tree", "head", "tail", "wc", "whoami", "history", "env",
            "export", "unset", "alias", "unalias", "man", "open", "show", "nano", "view",
            "music", "snake", "pong", "chess", "pacman",
        ] {
            assert!(reg.get(name).is_some(), "{name} missing");
        }
        assert!(reg.contains("help"));
        assert!(reg.contains("which"));
    }
}
