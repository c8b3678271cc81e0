//! Command-level test harness: a registry plus the state it borrows.

use std::collections::BTreeMap;

use folio_types::config::{Messages, SeedFile};
use folio_types::error::Result;
use folio_vfs::MemoryVfs;

use crate::commands::register_builtins;
use crate::interpreter::{CommandOutput, CommandRegistry, Environment, tokenize};

pub(crate) const HOME: &str = "/home/u";

pub(crate) struct Harness {
    pub reg: CommandRegistry,
    pub vfs: MemoryVfs,
    pub vars: BTreeMap<String, String>,
    pub aliases: BTreeMap<String, String>,
    pub history: Vec<String>,
    pub messages: Messages,
}

impl Harness {
    pub fn new(seeds: &[SeedFile]) -> Self {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        Self {
            reg,
            vfs: MemoryVfs::from_seeds(seeds, HOME),
            vars: BTreeMap::new(),
            aliases: BTreeMap::new(),
            history: Vec::new(),
            messages: Messages::default(),
        }
    }

    /// A small portfolio tree rooted at the home directory.
    pub fn portfolio() -> Self {
        Self::new(&[
            SeedFile::file("/home/u/about.md", "# About\nI build things.\nmostly in Rust"),
            SeedFile::file("/home/u/.secret", "hidden"),
            SeedFile::file("/home/u/projects/folio.md", "A terminal\nwith games")
                .with_section("projects"),
            SeedFile::file("/home/u/projects/notes.txt", "TODO: rust\nrust is fun"),
            SeedFile::file("/home/u/pics/cat.png", " /\\_/\\\n( o.o )"),
            SeedFile::file("/home/u/music/theme.mp3", ""),
            SeedFile::file("/home/u/contact.txt", "mail me").with_section("contact"),
        ])
    }

    /// Tokenize `line` and dispatch it like the engine does (no aliases).
    pub fn run(&mut self, line: &str) -> Result<CommandOutput> {
        let tokens = tokenize(line)?;
        let (name, rest) = tokens.split_first().expect("empty command line");
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let mut env = Environment {
            vfs: &mut self.vfs,
            vars: &mut self.vars,
            aliases: &mut self.aliases,
            history: &mut self.history,
            messages: &self.messages,
        };
        self.reg
            .dispatch(name, &args, &mut env)
            .unwrap_or_else(|| panic!("{name} is not registered"))
    }

    /// Text output, error message, or `""` for silent commands.
    pub fn text(&mut self, line: &str) -> String {
        match self.run(line) {
            Ok(CommandOutput::Text(s)) => s,
            Ok(CommandOutput::None) => String::new(),
            Ok(other) => panic!("expected text from {line:?}, got {other:?}"),
            Err(e) => e.to_string(),
        }
    }
}
