//! Text processing commands: echo, find, grep, head, tail, wc.

use folio_types::config::Messages;
use folio_types::error::Result;
use regex_lite::Regex;

use crate::commands::parse_flags;
use crate::interpreter::{Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

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

// ---------------------------------------------------------------------------
// find
// ---------------------------------------------------------------------------

/// Escape `pattern` for a regex, turning `*` into `.*` and, when
/// `single` is set, `?` into `.`.
fn wildcard_body(pattern: &str, single: bool) -> String {
    let mut re = String::with_capacity(pattern.len() + 8);
    let mut literal = String::new();
    for ch in pattern.chars() {
        let wild = match ch {
            '*' => ".*",
            '?' if single => ".",
            _ => {
                literal.push(ch);
                continue;
            },
        };
        re.push_str(&regex_lite::escape(&literal));
        literal.clear();
        re.push_str(wild);
    }
    re.push_str(&regex_lite::escape(&literal));
    re
}

/// Translate a shell glob into an anchored regex: `*` and `?` are
/// wildcards, everything else matches literally.
pub(crate) fn glob_to_regex(glob: &str) -> String {
    format!("^{}$", wildcard_body(glob, true))
}

struct FindCmd;
impl Command for FindCmd {
    fn name(&self) -> &str {
        "find"
    }
    fn description(&self) -> &str {
        "Search for files by name"
    }
    fn usage(&self) -> &str {
        "find [path] [-name <glob>]"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut root = ".";
        let mut pattern: Option<Regex> = None;
        let mut i = 0;
        while i < args.len() {
            match args[i] {
                "-name" => {
                    let Some(glob) = args.get(i + 1) else {
                        return Err(env.usage_error(self.usage()));
                    };
                    let re = Regex::new(&glob_to_regex(glob))
                        .map_err(|_| env.usage_error(self.usage()))?;
                    pattern = Some(re);
                    i += 2;
                },
                arg if arg.starts_with('-') => return Err(env.usage_error(self.usage())),
                arg => {
                    root = arg;
                    i += 1;
                },
            }
        }

        let walk = env.vfs.walk(root);
        if walk.is_empty() {
            return Err(env.error(&env.messages.file_not_found, &[("file", root)]));
        }
        let hits: Vec<&str> = walk
            .iter()
            .filter(|item| {
                pattern
                    .as_ref()
                    .is_none_or(|re| re.is_match(item.entry.name()))
            })
            .map(|item| item.path.as_str())
            .collect();
        if hits.is_empty() {
            Ok(CommandOutput::None)
        } else {
            Ok(CommandOutput::Text(hits.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// grep
// ---------------------------------------------------------------------------

/// Compile a grep pattern: `*` matches any run of characters, everything
/// else is literal. The match is unanchored within a line.
pub(crate) fn grep_regex(pattern: &str, ignore_case: bool) -> Option<Regex> {
    let prefix = if ignore_case { "(?i)" } else { "" };
    Regex::new(&format!("{prefix}{}", wildcard_body(pattern, false))).ok()
}

struct GrepCmd;
impl Command for GrepCmd {
    fn name(&self) -> &str {
        "grep"
    }
    fn description(&self) -> &str {
        "Search file contents"
    }
    fn usage(&self) -> &str {
        "grep [-i] [-r] <pattern> <path...>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let parsed = parse_flags(args);
        let Some((pattern, targets)) = parsed.positional.split_first() else {
            return Err(env.usage_error(self.usage()));
        };
        if targets.is_empty() {
            return Err(env.usage_error(self.usage()));
        }
        let Some(re) = grep_regex(pattern, parsed.has('i')) else {
            return Err(env.usage_error(self.usage()));
        };
        let recursive = parsed.has('r') || parsed.has('R');

        let mut out = Vec::new();
        for &target in targets {
            let walk = env.vfs.walk(target);
            let Some(start) = walk.first() else {
                out.push(Messages::fill(&env.messages.file_not_found, &[("file", target)]));
                continue;
            };
            // Without -r a directory is skipped silently.
            if start.entry.is_dir() && !recursive {
                continue;
            }
            for item in &walk {
                let Some(text) = item.entry.content() else {
                    continue;
                };
                for (n, line) in text.lines().enumerate() {
                    if re.is_match(line) {
                        out.push(format!("{}:{}:{line}", item.path, n + 1));
                    }
                }
            }
        }
        if out.is_empty() {
            Ok(CommandOutput::None)
        } else {
            Ok(CommandOutput::Text(out.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// head / tail
// ---------------------------------------------------------------------------

/// Parse `[-n N] <file>`.
fn parse_n_flag<'a>(
    args: &[&'a str],
    usage: &str,
    env: &Environment<'_>,
) -> Result<(usize, &'a str)> {
    match args {
        [file] => Ok((10, *file)),
        ["-n", count, file] => count
            .parse()
            .map(|n| (n, *file))
            .map_err(|_| env.usage_error(usage)),
        _ => Err(env.usage_error(usage)),
    }
}

/// Content of a regular file, or the matching user error.
fn read_text<'e>(file: &str, env: &'e Environment<'_>) -> Result<&'e str> {
    match env.vfs.get_node(file) {
        Some(entry) => entry
            .content()
            .ok_or_else(|| env.error(&env.messages.is_a_directory, &[("path", file)])),
        None => Err(env.error(&env.messages.file_not_found, &[("file", file)])),
    }
}

struct HeadCmd;
impl Command for HeadCmd {
    fn name(&self) -> &str {
        "head"
    }
    fn description(&self) -> &str {
        "Show first N lines of a file"
    }
    fn usage(&self) -> &str {
        "head [-n N] <file>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (n, file) = parse_n_flag(args, self.usage(), env)?;
        let text = read_text(file, env)?;
        let result: Vec<&str> = text.lines().take(n).collect();
        Ok(CommandOutput::Text(result.join("\n")))
    }
}

struct TailCmd;
impl Command for TailCmd {
    fn name(&self) -> &str {
        "tail"
    }
    fn description(&self) -> &str {
        "Show last N lines of a file"
    }
    fn usage(&self) -> &str {
        "tail [-n N] <file>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (n, file) = parse_n_flag(args, self.usage(), env)?;
        let text = read_text(file, env)?;
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(n);
        Ok(CommandOutput::Text(lines[start..].join("\n")))
    }
}

// ---------------------------------------------------------------------------
// wc
// ---------------------------------------------------------------------------

struct WcCmd;
impl Command for WcCmd {
    fn name(&self) -> &str {
        "wc"
    }
    fn description(&self) -> &str {
        "Count lines, words, and characters"
    }
    fn usage(&self) -> &str {
        "wc <file>"
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let [file] = args else {
            return Err(env.usage_error(self.usage()));
        };
        let text = read_text(file, env)?;
        let lines = text.lines().count();
        let words = text.split_whitespace().count();
        let chars = text.chars().count();
        Ok(CommandOutput::Text(format!("{lines} {words} {chars} {file}")))
    }
}

/// Register the text processing commands.
pub fn register_text_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(FindCmd));
    reg.register(Box::new(GrepCmd));
    reg.register(Box::new(HeadCmd));
    reg.register(Box::new(TailCmd));
    reg.register(Box::new(WcCmd));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use folio_types::config::SeedFile;

    #[test]
    fn echo_joins_arguments() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("echo  hello   'big world'"), "hello big world");
        assert_eq!(sh.text("echo"), "");
    }

    #[test]
    fn glob_translation() {
        assert_eq!(glob_to_regex("*.md"), r"^.*\.md$");
        assert_eq!(glob_to_regex("a?c"), "^a.c$");
        let re = Regex::new(&glob_to_regex("[x]*")).unwrap();
        assert!(re.is_match("[x]yz"));
        assert!(!re.is_match("xyz"));
    }

    #[test]
    fn find_by_name() {
        let mut sh = Harness::portfolio();
        let out = sh.text("find -name *.md");
        assert_eq!(out, "/home/u/about.md\n/home/u/projects/folio.md");
        let out = sh.text("find projects -name 'n*'");
        assert_eq!(out, "/home/u/projects/notes.txt");
    }

    #[test]
    fn find_without_pattern_lists_everything() {
        let mut sh = Harness::portfolio();
        let out = sh.text("find pics");
        assert_eq!(out, "/home/u/pics\n/home/u/pics/cat.png");
    }

    #[test]
    fn find_errors() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("find ghost"), "ghost: No such file or directory");
        assert_eq!(sh.text("find -name"), "usage: find [path] [-name <glob>]");
        assert_eq!(sh.text("find -name '*.zip'"), "");
    }

    #[test]
    fn grep_single_file() {
        let mut sh = Harness::portfolio();
        let out = sh.text("grep rust projects/notes.txt");
        assert_eq!(
            out,
            "/home/u/projects/notes.txt:1:TODO: rust\n/home/u/projects/notes.txt:2:rust is fun"
        );
    }

    #[test]
    fn grep_case_insensitive() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("grep RUST about.md"), "");
        assert_eq!(sh.text("grep -i RUST about.md"), "/home/u/about.md:3:mostly in Rust");
    }

    #[test]
    fn grep_directory_needs_recursive() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("grep rust projects"), "");
        let out = sh.text("grep -r -i rust .");
        assert_eq!(out.lines().count(), 3);
        assert!(out.starts_with("/home/u/about.md:3:"));
    }

    #[test]
    fn grep_regex_metacharacters_are_literal() {
        let mut sh = Harness::new(&[SeedFile::file("/f.txt", "a (b\nplain\na.c")]);
        assert_eq!(sh.text("grep '(b' /f.txt"), "/f.txt:1:a (b");
        assert_eq!(sh.text("grep a.c /f.txt"), "/f.txt:3:a.c");
        assert_eq!(sh.text("grep 'pl?in' /f.txt"), "");
    }

    #[test]
    fn grep_star_spans_characters() {
        let mut sh = Harness::portfolio();
        assert_eq!(
            sh.text("grep '*rust' projects/notes.txt"),
            "/home/u/projects/notes.txt:1:TODO: rust\n/home/u/projects/notes.txt:2:rust is fun"
        );
        assert_eq!(
            sh.text("grep 'TODO*rust' projects/notes.txt"),
            "/home/u/projects/notes.txt:1:TODO: rust"
        );
        // Matching is per line.
        assert_eq!(sh.text("grep 'TODO*fun' projects/notes.txt"), "");
    }

    #[test]
    fn grep_star_is_not_a_quantifier() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("grep 'r*t' about.md"), "");
        assert_eq!(sh.text("grep -i 'r*t' about.md"), "/home/u/about.md:3:mostly in Rust");
    }

    #[test]
    fn grep_missing_arguments() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("grep x"), "usage: grep [-i] [-r] <pattern> <path...>");
        assert_eq!(sh.text("grep x ghost"), "ghost: No such file or directory");
    }

    #[test]
    fn head_and_tail() {
        let body: Vec<String> = (1..=15).map(|i| format!("l{i}")).collect();
        let mut sh = Harness::new(&[SeedFile::file("/n.txt", &body.join("\n"))]);
        assert_eq!(sh.text("head /n.txt").lines().count(), 10);
        assert_eq!(sh.text("head -n 2 /n.txt"), "l1\nl2");
        assert_eq!(sh.text("tail -n 2 /n.txt"), "l14\nl15");
        assert_eq!(sh.text("tail -n 99 /n.txt").lines().count(), 15);
        assert_eq!(sh.text("head -n x /n.txt"), "usage: head [-n N] <file>");
        assert_eq!(sh.text("tail /"), "/: Is a directory");
    }

    #[test]
    fn wc_counts() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("wc about.md"), "3 8 38 about.md");
        assert_eq!(sh.text("wc"), "usage: wc <file>");
    }
}
