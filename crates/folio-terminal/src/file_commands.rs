//! File system commands: ls, cd, pwd, cat, mkdir, touch, rm, rmdir, mv, cp, tree.

use folio_types::config::Messages;
use folio_types::error::Result;
use folio_vfs::Removal;

use crate::commands::parse_flags;
use crate::interpreter::{Command, CommandOutput, Environment};

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-a] [-l] [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let parsed = parse_flags(args);
        let show_all = parsed.has('a');
        let long = parsed.has('l');
        let target = parsed.positional.first().copied();

        // A file target lists just itself.
        if let Some(t) = target {
            if let Some(entry) = env.vfs.get_node(t).filter(|e| e.is_file()) {
                let name = entry.name().to_string();
                let line = if long { format!("- {name}") } else { name };
                return Ok(CommandOutput::Text(line));
            }
        }

        let Some(entries) = env.vfs.list_dir(target) else {
            let dir = target.unwrap_or(".");
            return Err(env.error(&env.messages.no_such_directory, &[("dir", dir)]));
        };
        let visible: Vec<_> = entries
            .into_iter()
            .filter(|e| show_all || !e.name().starts_with('.'))
            .collect();
        if visible.is_empty() {
            return Ok(CommandOutput::None);
        }

        let out = if long {
            visible
                .iter()
                .map(|e| format!("{} {}", if e.is_dir() { 'd' } else { '-' }, e.name()))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            visible
                .iter()
                .map(|e| e.name())
                .collect::<Vec<_>>()
                .join("  ")
        };
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args.first().copied().unwrap_or("~");
        if env.vfs.change_dir(target) {
            return Ok(CommandOutput::None);
        }
        if env.vfs.get_node(target).is_some() {
            Err(env.error(&env.messages.not_a_directory, &[("path", target)]))
        } else {
            Err(env.error(&env.messages.no_such_directory, &[("dir", target)]))
        }
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(env.vfs.cwd().to_string()))
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(env.error(&env.messages.missing_operand, &[("command", "cat")]));
        }
        let mut parts = Vec::with_capacity(args.len());
        for &file in args {
            let part = match env.vfs.get_node(file) {
                Some(entry) => match entry.content() {
                    Some(text) => text.to_string(),
                    None => Messages::fill(&env.messages.is_a_directory, &[("path", file)]),
                },
                None => Messages::fill(&env.messages.file_not_found, &[("file", file)]),
            };
            parts.push(part);
        }
        Ok(CommandOutput::Text(parts.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories"
    }
    fn usage(&self) -> &str {
        "mkdir [-p] <dir...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let parsed = parse_flags(args);
        if parsed.positional.is_empty() {
            return Err(env.error(&env.messages.missing_operand, &[("command", "mkdir")]));
        }
        let recursive = parsed.has('p');
        let mut failures = Vec::new();
        for &dir in &parsed.positional {
            if env.vfs.create_dir(dir, recursive) {
                continue;
            }
            let template = if env.vfs.get_node(dir).is_some() {
                &env.messages.already_exists
            } else {
                &env.messages.cannot_create
            };
            failures.push(Messages::fill(template, &[("path", dir)]));
        }
        report(failures)
    }
}

/// Collected per-target failures, or nothing when every target succeeded.
fn report(failures: Vec<String>) -> Result<CommandOutput> {
    if failures.is_empty() {
        Ok(CommandOutput::None)
    } else {
        Ok(CommandOutput::Text(failures.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create empty files"
    }
    fn usage(&self) -> &str {
        "touch <file...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(env.error(&env.messages.missing_operand, &[("command", "touch")]));
        }
        let mut failures = Vec::new();
        for &file in args {
            if env.vfs.get_node(file).is_none() && !env.vfs.create_file(file, "") {
                failures.push(Messages::fill(&env.messages.cannot_create, &[("path", file)]));
            }
        }
        report(failures)
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files or directories"
    }
    fn usage(&self) -> &str {
        "rm [-r] [-f] <path...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let parsed = parse_flags(args);
        if parsed.positional.is_empty() {
            return Err(env.error(&env.messages.missing_operand, &[("command", "rm")]));
        }
        let recursive = parsed.has('r') || parsed.has('R');
        let force = parsed.has('f');
        let mut failures = Vec::new();
        for &target in &parsed.positional {
            let failure = match env.vfs.remove(target, recursive) {
                Removal::Removed(node) => {
                    log::debug!("rm {target}: {} nodes", node.node_count());
                    continue;
                },
                Removal::NotEmpty => {
                    Messages::fill(&env.messages.is_a_directory, &[("path", target)])
                },
                Removal::NotFound if force => continue,
                Removal::NotFound => {
                    Messages::fill(&env.messages.file_not_found, &[("file", target)])
                },
                Removal::Protected => {
                    Messages::fill(&env.messages.not_permitted, &[("path", target)])
                },
            };
            failures.push(failure);
        }
        report(failures)
    }
}

// ---------------------------------------------------------------------------
// rmdir
// ---------------------------------------------------------------------------

struct RmdirCmd;
impl Command for RmdirCmd {
    fn name(&self) -> &str {
        "rmdir"
    }
    fn description(&self) -> &str {
        "Remove empty directories"
    }
    fn usage(&self) -> &str {
        "rmdir <dir...>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(env.error(&env.messages.missing_operand, &[("command", "rmdir")]));
        }
        let mut failures = Vec::new();
        for &dir in args {
            let is_dir = env.vfs.get_node(dir).map(|e| e.is_dir());
            let failure = match is_dir {
                None => Messages::fill(&env.messages.file_not_found, &[("file", dir)]),
                Some(false) => Messages::fill(&env.messages.not_a_directory, &[("path", dir)]),
                Some(true) => match env.vfs.remove(dir, false) {
                    Removal::Removed(_) => continue,
                    Removal::NotEmpty => {
                        Messages::fill(&env.messages.directory_not_empty, &[("path", dir)])
                    },
                    Removal::NotFound => {
                        Messages::fill(&env.messages.file_not_found, &[("file", dir)])
                    },
                    Removal::Protected => {
                        Messages::fill(&env.messages.not_permitted, &[("path", dir)])
                    },
                },
            };
            failures.push(failure);
        }
        report(failures)
    }
}

// ---------------------------------------------------------------------------
// mv / cp
// ---------------------------------------------------------------------------

/// Exactly two positional arguments, with the source checked to exist.
fn src_dest<'a>(
    positional: &[&'a str],
    usage: &str,
    env: &Environment<'_>,
) -> Result<(&'a str, &'a str)> {
    let &[src, dest] = positional else {
        return Err(env.usage_error(usage));
    };
    if env.vfs.get_node(src).is_none() {
        return Err(env.error(&env.messages.file_not_found, &[("file", src)]));
    }
    Ok((src, dest))
}

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename a file or directory"
    }
    fn usage(&self) -> &str {
        "mv <source> <dest>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let (src, dest) = src_dest(args, self.usage(), env)?;
        if env.vfs.move_node(src, dest) {
            Ok(CommandOutput::None)
        } else {
            Err(env.error(&env.messages.cannot_move, &[("src", src), ("dest", dest)]))
        }
    }
}

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy a file or directory tree"
    }
    fn usage(&self) -> &str {
        "cp [-r] <source> <dest>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        // Directories always copy deeply; `-r` is accepted for habit's sake.
        let parsed = parse_flags(args);
        let (src, dest) = src_dest(&parsed.positional, self.usage(), env)?;
        if env.vfs.copy(src, dest) {
            Ok(CommandOutput::None)
        } else {
            Err(env.error(&env.messages.cannot_copy, &[("src", src), ("dest", dest)]))
        }
    }
}

// ---------------------------------------------------------------------------
// tree
// ---------------------------------------------------------------------------

struct TreeCmd;
impl Command for TreeCmd {
    fn name(&self) -> &str {
        "tree"
    }
    fn description(&self) -> &str {
        "Display directory tree"
    }
    fn usage(&self) -> &str {
        "tree [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args.first().copied().unwrap_or(".");
        let walk = env.vfs.walk(target);
        if walk.is_empty() {
            return Err(env.error(&env.messages.no_such_directory, &[("dir", target)]));
        }

        // Reverse pass: an entry is last when no later sibling follows it.
        let mut last = vec![false; walk.len()];
        let mut sibling_after: Vec<bool> = Vec::new();
        for (i, item) in walk.iter().enumerate().rev() {
            sibling_after.resize(item.depth + 1, false);
            last[i] = !sibling_after[item.depth];
            sibling_after[item.depth] = true;
        }

        let mut lines = vec![target.to_string()];
        let mut dirs = 0u32;
        let mut files = 0u32;
        let mut ancestors_last: Vec<bool> = Vec::new();
        for (i, item) in walk.iter().enumerate().skip(1) {
            ancestors_last.truncate(item.depth - 1);
            let mut line = String::new();
            for &done in &ancestors_last {
                line.push_str(if done { "    " } else { "│   " });
            }
            line.push_str(if last[i] { "└── " } else { "├── " });
            line.push_str(item.entry.name());
            if item.entry.is_dir() {
                line.push('/');
                dirs += 1;
            } else {
                files += 1;
            }
            lines.push(line);
            ancestors_last.push(last[i]);
        }
        lines.push(String::new());
        lines.push(format!("{dirs} directories, {files} files"));
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

/// Register the file system commands.
pub fn register_file_commands(reg: &mut crate::CommandRegistry) {
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(RmdirCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(TreeCmd));
}

#[cfg(test)]
mod tests {
    use crate::interpreter::CommandOutput;
    use crate::test_support::{HOME, Harness};

    #[test]
    fn ls_hides_dotfiles_unless_all() {
        let mut sh = Harness::portfolio();
        let plain = sh.text("ls");
        assert_eq!(plain, "about.md  contact.txt  music  pics  projects");
        assert!(sh.text("ls -a").contains(".secret"));
    }

    #[test]
    fn ls_long_prefixes_type() {
        let mut sh = Harness::portfolio();
        let out = sh.text("ls -l projects");
        assert_eq!(out, "- folio.md\n- notes.txt");
        let out = sh.text("ls -al");
        assert!(out.contains("d music"));
        assert!(out.contains("- .secret"));
    }

    #[test]
    fn ls_missing_uses_literal_argument() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("ls ./nope/../x"), "./nope/../x: No such directory");
    }

    #[test]
    fn ls_file_and_empty_dir() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("ls about.md"), "about.md");
        sh.text("mkdir empty");
        assert!(matches!(sh.run("ls empty"), Ok(CommandOutput::None)));
    }

    #[test]
    fn cd_and_pwd() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("cd projects"), "");
        assert_eq!(sh.text("pwd"), format!("{HOME}/projects"));
        sh.text("cd ..");
        assert_eq!(sh.text("pwd"), HOME);
        sh.text("cd /");
        sh.text("cd");
        assert_eq!(sh.text("pwd"), HOME);
    }

    #[test]
    fn cd_failures_are_distinct() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("cd about.md"), "about.md: Not a directory");
        assert_eq!(sh.text("cd ghost"), "ghost: No such directory");
        assert_eq!(sh.text("pwd"), HOME);
    }

    #[test]
    fn cat_prints_and_reports() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("cat contact.txt"), "mail me");
        assert_eq!(sh.text("cat missing.md"), "missing.md: No such file or directory");
        assert_eq!(sh.text("cat projects"), "projects: Is a directory");
        assert_eq!(sh.text("cat"), "cat: missing operand");
        assert_eq!(
            sh.text("cat contact.txt nope"),
            "mail me\nnope: No such file or directory"
        );
    }

    #[test]
    fn mkdir_plain_and_parents() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("mkdir a/b"), "a/b: Cannot create");
        assert_eq!(sh.text("mkdir -p a/b"), "");
        assert!(sh.vfs.get_node("a/b").is_some_and(|e| e.is_dir()));
        assert_eq!(sh.text("mkdir a"), "a: File exists");
    }

    #[test]
    fn touch_creates_once() {
        let mut sh = Harness::portfolio();
        sh.text("touch new.txt about.md");
        assert_eq!(sh.vfs.read_file("new.txt"), Some(""));
        assert!(sh.vfs.read_file("about.md").is_some_and(|t| t.starts_with("# About")));
        assert_eq!(sh.text("touch ghost/x"), "ghost/x: Cannot create");
    }

    #[test]
    fn rm_needs_recursive_for_full_dirs() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("rm projects"), "projects: Is a directory");
        assert!(sh.vfs.get_node("projects").is_some());
        assert_eq!(sh.text("rm -rf projects"), "");
        assert!(sh.vfs.get_node("projects").is_none());
        assert_eq!(sh.text("rm -fr pics"), "");
        assert_eq!(sh.text("rm -r music"), "");
        assert_eq!(sh.text("ls"), "about.md  contact.txt");
    }

    #[test]
    fn rm_missing_and_root() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("rm ghost"), "ghost: No such file or directory");
        assert_eq!(sh.text("rm -f ghost"), "");
        assert_eq!(sh.text("rm -rf /"), "/: Operation not permitted");
        assert_eq!(sh.text("rm"), "rm: missing operand");
    }

    #[test]
    fn rmdir_only_removes_empty_dirs() {
        let mut sh = Harness::portfolio();
        sh.text("mkdir empty");
        assert_eq!(sh.text("rmdir empty"), "");
        assert_eq!(sh.text("rmdir projects"), "projects: Directory not empty");
        assert_eq!(sh.text("rmdir about.md"), "about.md: Not a directory");
    }

    #[test]
    fn mv_renames_and_moves_into_dirs() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("mv about.md bio.md"), "");
        assert!(sh.vfs.get_node("about.md").is_none());
        assert_eq!(sh.text("mv bio.md projects"), "");
        assert!(sh.vfs.read_file("projects/bio.md").is_some());
    }

    #[test]
    fn mv_and_cp_argument_checks() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("mv a"), "usage: mv <source> <dest>");
        assert_eq!(sh.text("cp a b c"), "usage: cp [-r] <source> <dest>");
        assert_eq!(sh.text("mv ghost x"), "ghost: No such file or directory");
        assert_eq!(sh.text("cp ghost x"), "ghost: No such file or directory");
        assert_eq!(
            sh.text("mv projects projects/inner"),
            "cannot move projects to projects/inner"
        );
    }

    #[test]
    fn cp_deep_copies_directories() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("cp -r projects backup"), "");
        sh.text("rm backup/notes.txt");
        assert!(sh.vfs.read_file("projects/notes.txt").is_some());
        assert!(sh.vfs.read_file("backup/folio.md").is_some());
    }

    #[test]
    fn tree_draws_branches() {
        let mut sh = Harness::portfolio();
        sh.text("mkdir -p projects/old");
        let out = sh.text("tree projects");
        assert_eq!(
            out,
            "projects\n├── folio.md\n├── notes.txt\n└── old/\n\n1 directories, 2 files"
        );
    }

    #[test]
    fn tree_nested_prefixes() {
        let mut sh = Harness::new(&[
            folio_types::config::SeedFile::file("/r/a/x", ""),
            folio_types::config::SeedFile::file("/r/b", ""),
        ]);
        let out = sh.text("tree /r");
        assert_eq!(out, "/r\n├── a/\n│   └── x\n└── b\n\n1 directories, 2 files");
    }

    #[test]
    fn tree_missing_path() {
        let mut sh = Harness::portfolio();
        assert_eq!(sh.text("tree nope"), "nope: No such directory");
    }
}
