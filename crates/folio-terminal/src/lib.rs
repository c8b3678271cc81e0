//! Command interpreter and terminal engine.
//!
//! The terminal is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The engine tokenizes input
//! lines, expands variables and aliases, dispatches to the registry, and
//! hands the keyboard to a program when a command launches one.

mod commands;
mod engine;
mod file_commands;
mod interpreter;
mod program_commands;
mod shell_commands;
mod text_commands;

#[cfg(test)]
mod test_support;

/// Register all built-in commands (files, text, shell, programs) into a registry.
pub use commands::register_builtins;
/// The terminal session: output buffer, line editor, and program host.
pub use engine::{Engine, MAX_LINES, Mode};
/// A single executable command trait.
pub use interpreter::Command;
/// Output produced by a command (text, navigation, program launch).
pub use interpreter::CommandOutput;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Shared mutable environment passed to every command.
pub use interpreter::Environment;
/// Split a command line into words.
pub use interpreter::{tokenize, tokenize_with};
