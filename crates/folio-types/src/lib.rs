//! Foundation types for the folio terminal.
//!
//! This crate contains the platform-agnostic types shared by every folio
//! crate: key input, colors and the draw-surface trait, themes, the
//! serialisable terminal configuration, and error types.

pub mod backend;
pub mod config;
pub mod error;
pub mod input;
pub mod theme;
