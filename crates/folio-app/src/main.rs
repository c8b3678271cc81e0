//! Headless folio terminal.
//!
//! Reads stdin one line at a time and prints the screen after each line.
//! A line naming a key (`Enter`, `Escape`, `ArrowUp`, ...) sends that key,
//! `@wait <seconds>` runs the frame clock, and any other line is typed and
//! submitted. Pass a TOML or JSON config path as the first argument, or set
//! `FOLIO_CONFIG`; without one a demo portfolio is loaded.

mod demo;
mod input;
mod screen;

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use folio_terminal::{Engine, Mode};
use folio_types::config::TerminalConfig;
use input::Step;
use screen::TextCanvas;

const FRAME_SECS: f32 = 1.0 / 30.0;
const SCREEN_WIDTH: u32 = 640;
const SCREEN_HEIGHT: u32 = 480;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    config.validate()?;
    let mut engine = Engine::new(config);
    engine.on_navigate(|section| println!("-> #{section}"));
    show(&engine)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        match input::parse_line(&line) {
            Step::Keys(tokens) => {
                for token in &tokens {
                    engine.handle_input(token);
                }
            },
            Step::Wait(secs) => advance(&mut engine, secs),
        }
        show(&engine)?;
    }
    log::info!("stdin closed, {} commands run", engine.history().len());
    Ok(())
}

/// Config from the first argument or `FOLIO_CONFIG`, else the demo.
fn load_config() -> Result<TerminalConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FOLIO_CONFIG").ok());
    let Some(path) = path else {
        log::info!("no config given, loading demo portfolio");
        return Ok(demo::config());
    };
    let config = TerminalConfig::from_path(Path::new(&path))
        .with_context(|| format!("loading config {path}"))?;
    log::info!("loaded {path}: {} seed records", config.files.len());
    Ok(config)
}

fn advance(engine: &mut Engine, secs: f32) {
    let mut left = secs;
    while left > 0.0 {
        engine.tick(FRAME_SECS.min(left));
        left -= FRAME_SECS;
    }
}

fn show(engine: &Engine) -> Result<()> {
    let mut out = io::stdout().lock();
    if engine.mode() == Mode::Shell {
        for line in engine.lines() {
            writeln!(out, "{line}")?;
        }
    } else {
        let mut canvas = TextCanvas::default();
        engine.render(&mut canvas, SCREEN_WIDTH, SCREEN_HEIGHT)?;
        for row in canvas.rows() {
            writeln!(out, "{row}")?;
        }
    }
    writeln!(out, "{}", "-".repeat(40))?;
    out.flush()?;
    Ok(())
}
