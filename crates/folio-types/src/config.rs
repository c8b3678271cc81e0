//! Terminal configuration supplied by the hosting page.
//!
//! The host hands the engine a prompt, intro banner, home directory, the
//! seed records that make up the virtual filesystem, and a table of
//! localized message templates. Everything has a default so a partial
//! TOML or JSON document is enough.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::theme::Theme;

/// Top-level terminal configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TerminalConfig {
    /// Prompt template. `{cwd}` is replaced with the working directory,
    /// shown with the home prefix collapsed to `~`.
    pub prompt: String,
    /// Lines printed once when the engine starts.
    pub intro_lines: Vec<String>,
    /// Absolute path of the visitor's home directory.
    pub home_path: String,
    /// Seed records for the virtual filesystem.
    pub files: Vec<SeedFile>,
    /// Localized output templates.
    pub messages: Messages,
    /// Colors handed to programs at render time.
    pub theme: Theme,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "visitor@folio:{cwd}$ ".to_string(),
            intro_lines: vec![
                "Welcome to folio.".to_string(),
                "Type 'help' to list commands.".to_string(),
            ],
            home_path: "/home/visitor".to_string(),
            files: Vec::new(),
            messages: Messages::default(),
            theme: Theme::default(),
        }
    }
}

impl TerminalConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, choosing the format by extension (`.json`, else TOML).
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Check structural requirements that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.home_path.starts_with('/') {
            return Err(FolioError::Config(format!(
                "home_path must be absolute: {}",
                self.home_path
            )));
        }
        for seed in &self.files {
            if seed.path.trim().is_empty() {
                return Err(FolioError::Config("seed file with empty path".to_string()));
            }
        }
        Ok(())
    }
}

/// Node type of a seed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    #[default]
    File,
    Directory,
}

/// One flat seed record: `{path, content?, section?, type?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFile {
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    /// Page section the host navigates to when this file is opened.
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: SeedKind,
}

impl SeedFile {
    pub fn file(path: &str, content: &str) -> Self {
        Self {
            path: path.to_string(),
            content: Some(content.to_string()),
            section: None,
            kind: SeedKind::File,
        }
    }

    pub fn dir(path: &str) -> Self {
        Self {
            path: path.to_string(),
            content: None,
            section: None,
            kind: SeedKind::Directory,
        }
    }

    /// Tag the record with a page section.
    pub fn with_section(mut self, section: &str) -> Self {
        self.section = Some(section.to_string());
        self
    }
}

/// Localized output templates.
///
/// Templates use `{name}` placeholders filled by [`Messages::fill`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub command_not_found: String,
    pub file_not_found: String,
    pub no_such_directory: String,
    pub not_a_directory: String,
    pub is_a_directory: String,
    pub directory_not_empty: String,
    pub not_permitted: String,
    pub already_exists: String,
    pub cannot_create: String,
    pub cannot_move: String,
    pub cannot_copy: String,
    pub missing_operand: String,
    pub usage: String,
    pub syntax_error: String,
    pub no_manual_entry: String,
    pub history_cleared: String,
    pub no_history: String,
    pub no_aliases: String,
    pub not_aliased: String,
    pub launching: String,
    pub program_terminated: String,
    pub program_exited: String,
    pub nothing_to_exit: String,
    pub navigating: String,
    pub no_such_section: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            command_not_found: "{command}: command not found".to_string(),
            file_not_found: "{file}: No such file or directory".to_string(),
            no_such_directory: "{dir}: No such directory".to_string(),
            not_a_directory: "{path}: Not a directory".to_string(),
            is_a_directory: "{path}: Is a directory".to_string(),
            directory_not_empty: "{path}: Directory not empty".to_string(),
            not_permitted: "{path}: Operation not permitted".to_string(),
            already_exists: "{path}: File exists".to_string(),
            cannot_create: "{path}: Cannot create".to_string(),
            cannot_move: "cannot move {src} to {dest}".to_string(),
            cannot_copy: "cannot copy {src} to {dest}".to_string(),
            missing_operand: "{command}: missing operand".to_string(),
            usage: "usage: {usage}".to_string(),
            syntax_error: "syntax error: {detail}".to_string(),
            no_manual_entry: "No manual entry for {topic}".to_string(),
            history_cleared: "History cleared.".to_string(),
            no_history: "(no history)".to_string(),
            no_aliases: "(no aliases defined)".to_string(),
            not_aliased: "{name}: not aliased".to_string(),
            launching: "Starting {program}. Press Escape to quit.".to_string(),
            program_terminated: "[{program} terminated]".to_string(),
            program_exited: "[{program} exited]".to_string(),
            nothing_to_exit: "exit: already at the shell".to_string(),
            navigating: "Opening {section}...".to_string(),
            no_such_section: "{section}: No such section".to_string(),
        }
    }
}

impl Messages {
    /// Replace every `{key}` in `template` with its value.
    ///
    /// Unknown placeholders are left untouched.
    pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
        let mut out = template.to_string();
        for (key, value) in vars {
            out = out.replace(&format!("{{{key}}}"), value);
        }
        out
    }
}
