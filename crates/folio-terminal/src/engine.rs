//! The terminal engine.
//!
//! The engine owns every piece of session state: the file system, the
//! output buffer, the line being typed, history, variables, aliases, and
//! the running program. Keys arrive through [`Engine::handle_input`]; in
//! shell mode they edit the input line, otherwise they go to the program.
//!
//! The last entry of [`Engine::lines`] always mirrors `prompt + input`
//! while the shell has focus, so a renderer only ever draws `lines`.

use std::collections::BTreeMap;

use folio_programs::{LaunchArgs, Program, ProgramKind, ProgramMode};
use folio_types::backend::Canvas;
use folio_types::config::{Messages, TerminalConfig};
use folio_types::error::Result;
use folio_types::input::Key;
use folio_vfs::MemoryVfs;
use folio_vfs::path;

use crate::commands::register_builtins;
use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment, tokenize_with};

/// Maximum number of output lines kept in the display buffer.
pub const MAX_LINES: usize = 100;

/// Maximum number of history entries to retain.
const MAX_HISTORY: usize = 100;

const FONT_SIZE: u16 = 14;
const LINE_HEIGHT: u32 = 18;
const MARGIN: i32 = 4;

/// Which consumer currently receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shell,
    Editor,
    Game,
}

struct Running {
    kind: ProgramKind,
    program: Box<dyn Program>,
}

/// One terminal session.
pub struct Engine {
    config: TerminalConfig,
    registry: CommandRegistry,
    vfs: MemoryVfs,
    lines: Vec<String>,
    input: String,
    history: Vec<String>,
    /// Index into `history` while browsing with the arrow keys.
    recall: Option<usize>,
    vars: BTreeMap<String, String>,
    aliases: BTreeMap<String, String>,
    running: Option<Running>,
    navigate_hook: Option<Box<dyn FnMut(&str)>>,
    redraw_hook: Option<Box<dyn FnMut()>>,
}

impl Engine {
    /// Build the file system from `config`, print the intro, and show the
    /// first prompt.
    pub fn new(config: TerminalConfig) -> Self {
        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry);
        let vfs = MemoryVfs::from_seeds(&config.files, &config.home_path);
        log::info!(
            "terminal ready: {} seed records, {} nodes",
            config.files.len(),
            vfs.node_count()
        );
        let intro = config.intro_lines.clone();
        let mut engine = Self {
            config,
            registry,
            vfs,
            lines: Vec::new(),
            input: String::new(),
            history: Vec::new(),
            recall: None,
            vars: BTreeMap::new(),
            aliases: BTreeMap::new(),
            running: None,
            navigate_hook: None,
            redraw_hook: None,
        };
        engine.seed_defaults();
        for line in intro {
            engine.println(line);
        }
        engine.push_prompt();
        engine
    }

    /// Replace the configuration and rebuild the file system.
    ///
    /// The working directory survives when it still exists. Variables and
    /// aliases set during the session are kept.
    pub fn apply_config(&mut self, config: TerminalConfig) {
        self.vfs.rebuild(&config.files, &config.home_path);
        log::info!(
            "config applied: {} seed records, cwd {}",
            config.files.len(),
            self.vfs.cwd()
        );
        self.config = config;
        self.seed_defaults();
        if self.running.is_none() {
            self.sync_prompt();
        }
        self.notify_redraw();
    }

    fn seed_defaults(&mut self) {
        let home = self.config.home_path.clone();
        let user = path::file_name(&home).to_string();
        self.vars.insert("HOME".to_string(), home);
        self.vars.entry("USER".to_string()).or_insert(user);
        self.vars
            .entry("SHELL".to_string())
            .or_insert_with(|| "folio".to_string());
        if self.aliases.is_empty() {
            self.aliases.insert("ll".to_string(), "ls -al".to_string());
        }
    }

    // -- Observers --

    /// Called with the section name whenever a command navigates the page.
    pub fn on_navigate<F>(&mut self, hook: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.navigate_hook = Some(Box::new(hook));
    }

    /// Called whenever the visible state changes.
    pub fn on_redraw<F>(&mut self, hook: F)
    where
        F: FnMut() + 'static,
    {
        self.redraw_hook = Some(Box::new(hook));
    }

    fn notify_redraw(&mut self) {
        if let Some(hook) = self.redraw_hook.as_mut() {
            hook();
        }
    }

    // -- Accessors --

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn mode(&self) -> Mode {
        match &self.running {
            None => Mode::Shell,
            Some(run) => match run.kind.mode() {
                ProgramMode::Editor => Mode::Editor,
                ProgramMode::Game => Mode::Game,
            },
        }
    }

    pub fn active_program(&self) -> Option<&dyn Program> {
        self.running.as_ref().map(|run| run.program.as_ref())
    }

    /// The line currently being typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn vfs(&self) -> &MemoryVfs {
        &self.vfs
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    /// Add or replace a command.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.registry.register(cmd);
    }

    // -- Output buffer --

    /// Append one line, evicting the oldest beyond [`MAX_LINES`].
    pub fn println(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
        if self.lines.len() > MAX_LINES {
            let excess = self.lines.len() - MAX_LINES;
            self.lines.drain(..excess);
        }
    }

    /// The prompt with `{cwd}` filled in.
    pub fn prompt(&self) -> String {
        let cwd = path::display(self.vfs.cwd(), self.vfs.home());
        Messages::fill(&self.config.prompt, &[("cwd", cwd.as_str())])
    }

    fn push_prompt(&mut self) {
        let line = format!("{}{}", self.prompt(), self.input);
        self.println(line);
    }

    fn sync_prompt(&mut self) {
        let line = format!("{}{}", self.prompt(), self.input);
        match self.lines.last_mut() {
            Some(last) => *last = line,
            None => self.lines.push(line),
        }
    }

    // -- Input --

    /// Handle a key token from the presentation layer. Tokens outside the
    /// key vocabulary are ignored.
    pub fn handle_input(&mut self, token: &str) {
        match Key::parse(token) {
            Some(key) => self.handle_key(key),
            None => log::debug!("ignoring key token {token:?}"),
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        if self.running.is_some() {
            if key == Key::Escape {
                self.release(true);
                self.push_prompt();
            } else if let Some(run) = self.running.as_mut() {
                run.program.on_input(key);
            }
            self.notify_redraw();
            return;
        }

        match key {
            Key::Enter => {
                let line = std::mem::take(&mut self.input);
                self.recall = None;
                self.launch(&line);
                self.notify_redraw();
                return;
            },
            Key::Backspace => {
                self.input.pop();
            },
            Key::Char(c) => self.input.push(c),
            Key::ArrowUp => self.recall_older(),
            Key::ArrowDown => self.recall_newer(),
            Key::Tab => self.complete(),
            Key::Escape | Key::ArrowLeft | Key::ArrowRight => return,
        }
        self.sync_prompt();
        self.notify_redraw();
    }

    fn recall_older(&mut self) {
        let Some(newest) = self.history.len().checked_sub(1) else {
            return;
        };
        let idx = match self.recall {
            None => newest,
            Some(i) => i.saturating_sub(1).min(newest),
        };
        if let Some(entry) = self.history.get(idx) {
            self.input = entry.clone();
            self.recall = Some(idx);
        }
    }

    fn recall_newer(&mut self) {
        let Some(i) = self.recall else {
            return;
        };
        match self.history.get(i + 1) {
            Some(entry) => {
                self.input = entry.clone();
                self.recall = Some(i + 1);
            },
            None => {
                self.input.clear();
                self.recall = None;
            },
        }
    }

    /// Complete the command name being typed: fully when unique, otherwise
    /// up to the longest common prefix.
    fn complete(&mut self) {
        if self.input.is_empty() || self.input.contains(char::is_whitespace) {
            return;
        }
        let mut candidates = self.registry.completions(&self.input);
        candidates.extend(
            self.aliases
                .keys()
                .filter(|name| name.starts_with(self.input.as_str()))
                .cloned(),
        );
        candidates.sort();
        candidates.dedup();
        match candidates.as_slice() {
            [] => {},
            [only] => self.input = format!("{only} "),
            many => {
                let prefix = common_prefix(many);
                if prefix.len() > self.input.len() {
                    self.input = prefix;
                }
            },
        }
    }

    // -- Dispatch --

    /// Run one command line and show the next prompt.
    pub fn launch(&mut self, line: &str) {
        self.run_line(line);
        if self.running.is_none() {
            self.push_prompt();
        }
    }

    fn run_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        self.push_history(line);

        let tokens = match self.expand(line) {
            Ok(tokens) => tokens,
            Err(e) => {
                let detail = e.to_string();
                let msg = Messages::fill(
                    &self.config.messages.syntax_error,
                    &[("detail", detail.as_str())],
                );
                self.println(msg);
                return;
            },
        };
        let Some((first, rest)) = tokens.split_first() else {
            return;
        };
        let name = first.to_lowercase();
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        log::debug!("launch {name} {args:?}");

        let mut env = Environment {
            vfs: &mut self.vfs,
            vars: &mut self.vars,
            aliases: &mut self.aliases,
            history: &mut self.history,
            messages: &self.config.messages,
        };
        match self.registry.dispatch(&name, &args, &mut env) {
            Some(Ok(output)) => self.apply_output(output),
            Some(Err(e)) => self.println(e.to_string()),
            None if name == "exit" => {
                if !self.release(false) {
                    let msg = self.config.messages.nothing_to_exit.clone();
                    self.println(msg);
                }
            },
            None => {
                let msg = Messages::fill(
                    &self.config.messages.command_not_found,
                    &[("command", name.as_str())],
                );
                self.println(msg);
            },
        }
    }

    /// Tokenize with variable expansion, then splice in one level of alias.
    fn expand(&self, line: &str) -> Result<Vec<String>> {
        let vars = &self.vars;
        let cwd = self.vfs.cwd();
        let lookup = |name: &str| match name {
            "PWD" => Some(cwd.to_string()),
            _ => vars.get(name).cloned(),
        };
        let mut tokens = tokenize_with(line, lookup)?;
        if let Some(expansion) = tokens.first().and_then(|t| self.aliases.get(t)) {
            let mut spliced = tokenize_with(expansion, lookup)?;
            log::debug!("alias {} -> {spliced:?}", tokens[0]);
            spliced.extend(tokens.drain(1..));
            tokens = spliced;
        }
        Ok(tokens)
    }

    fn push_history(&mut self, line: &str) {
        self.history.push(line.to_string());
        if self.history.len() > MAX_HISTORY {
            self.history.remove(0);
        }
    }

    fn apply_output(&mut self, output: CommandOutput) {
        match output {
            CommandOutput::Text(text) => {
                for line in text.split('\n') {
                    self.println(line);
                }
            },
            CommandOutput::None => {},
            CommandOutput::Clear => self.lines.clear(),
            CommandOutput::Navigate { section } => {
                log::info!("navigate to {section}");
                let msg = Messages::fill(
                    &self.config.messages.navigating,
                    &[("section", section.as_str())],
                );
                self.println(msg);
                if let Some(hook) = self.navigate_hook.as_mut() {
                    hook(&section);
                }
            },
            CommandOutput::Launch { kind, args } => self.launch_program(kind, args),
        }
    }

    // -- Programs --

    /// Hand input and rendering to a freshly created program.
    pub fn launch_program(&mut self, kind: ProgramKind, args: LaunchArgs) {
        if let Some(previous) = self.running.take() {
            log::warn!("replacing running program {}", previous.program.name());
        }
        let program = kind.create(args);
        log::info!("program {} started", program.name());
        let msg = Messages::fill(
            &self.config.messages.launching,
            &[("program", program.name())],
        );
        self.println(msg);
        self.running = Some(Running { kind, program });
        self.notify_redraw();
    }

    /// Close the running program and return to the shell. Returns `false`
    /// when no program was running.
    pub fn exit_program(&mut self) -> bool {
        let closed = self.release(false);
        if closed {
            self.push_prompt();
            self.notify_redraw();
        }
        closed
    }

    /// Drop the running program and print the matching notice.
    fn release(&mut self, forced: bool) -> bool {
        let Some(run) = self.running.take() else {
            return false;
        };
        let template = if forced {
            &self.config.messages.program_terminated
        } else {
            &self.config.messages.program_exited
        };
        let msg = Messages::fill(template, &[("program", run.program.name())]);
        log::info!("program {} closed (forced: {forced})", run.program.name());
        self.println(msg);
        true
    }

    // -- Frame loop --

    /// Advance the running program by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if let Some(run) = self.running.as_mut() {
            run.program.tick(dt);
            self.notify_redraw();
        }
    }

    /// Draw the running program, or the shell output when none is running.
    pub fn render(&self, canvas: &mut dyn Canvas, width: u32, height: u32) -> Result<()> {
        let theme = &self.config.theme;
        if let Some(run) = &self.running {
            return run.program.render(canvas, width, height, theme);
        }

        canvas.clear_area(width, height, theme.bg)?;
        let rows = (height / LINE_HEIGHT).max(1) as usize;
        let start = self.lines.len().saturating_sub(rows);
        let mut y = MARGIN;
        for line in &self.lines[start..] {
            canvas.draw_text(line, MARGIN, y, FONT_SIZE, theme.text)?;
            y += LINE_HEIGHT as i32;
        }

        // Block cursor after the prompt line.
        if let Some(last) = self.lines.last() {
            let x = MARGIN + canvas.measure_text(last, FONT_SIZE) as i32;
            let cursor_w = canvas.measure_text(" ", FONT_SIZE).max(1);
            canvas.fill_rect(
                x,
                y - LINE_HEIGHT as i32,
                cursor_w,
                LINE_HEIGHT,
                theme.accent,
            )?;
        }
        Ok(())
    }
}

/// Longest prefix shared by every word.
fn common_prefix(words: &[String]) -> String {
    let Some((first, rest)) = words.split_first() else {
        return String::new();
    };
    let mut len = first.len();
    for word in rest {
        len = first
            .char_indices()
            .zip(word.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(len);
    }
    first[..len].to_string()
}
