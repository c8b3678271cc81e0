//! Embedded programs for the folio terminal.
//!
//! A program takes over the terminal's input and render loop until the
//! engine releases it. Every program owns its whole state and knows nothing
//! about the shell: the engine forwards keys through [`Program::on_input`],
//! and the presentation layer calls [`Program::tick`] and
//! [`Program::render`] once per frame.

pub mod chess;
pub mod music;
pub mod nano;
pub mod pacman;
pub mod pong;
pub mod snake;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_utils;

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub use chess::Chess;
pub use music::MusicPlayer;
pub use nano::Nano;
pub use pacman::Pacman;
pub use pong::Pong;
pub use snake::Snake;
pub use viewer::ImageViewer;

/// An interactive application that temporarily owns input and rendering.
pub trait Program {
    /// Display name, used in launch and exit notices.
    fn name(&self) -> &str;

    /// Handle one key. Invalid or meaningless keys are ignored.
    fn on_input(&mut self, key: Key);

    /// Advance time-based state by `dt` seconds.
    fn tick(&mut self, _dt: f32) {}

    /// Draw the current frame into a `width` x `height` area.
    ///
    /// Layout is recomputed from the given size on every call.
    fn render(&self, canvas: &mut dyn Canvas, width: u32, height: u32, theme: &Theme)
    -> Result<()>;

    /// Return to the freshly launched state.
    fn reset(&mut self);
}

/// Which engine mode a program runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramMode {
    Editor,
    Game,
}

/// Parameters handed to a program at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Title shown in the program's header (usually a file name).
    pub title: Option<String>,
    /// Initial document or description text.
    pub content: Option<String>,
    /// Fixed RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Enable the computer opponent where a program has one.
    pub bot: bool,
}

impl Default for LaunchArgs {
    fn default() -> Self {
        Self {
            title: None,
            content: None,
            seed: None,
            bot: true,
        }
    }
}

/// Factory of the built-in programs, keyed by launch command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Nano,
    Viewer,
    Music,
    Snake,
    Pong,
    Chess,
    Pacman,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 7] = [
        ProgramKind::Nano,
        ProgramKind::Viewer,
        ProgramKind::Music,
        ProgramKind::Snake,
        ProgramKind::Pong,
        ProgramKind::Chess,
        ProgramKind::Pacman,
    ];

    /// Look up a program by its command name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.command() == name)
    }

    /// Command name that launches this program.
    pub fn command(self) -> &'static str {
        match self {
            ProgramKind::Nano => "nano",
            ProgramKind::Viewer => "view",
            ProgramKind::Music => "music",
            ProgramKind::Snake => "snake",
            ProgramKind::Pong => "pong",
            ProgramKind::Chess => "chess",
            ProgramKind::Pacman => "pacman",
        }
    }

    pub fn mode(self) -> ProgramMode {
        match self {
            ProgramKind::Nano => ProgramMode::Editor,
            _ => ProgramMode::Game,
        }
    }

    /// Construct a fresh instance.
    pub fn create(self, args: LaunchArgs) -> Box<dyn Program> {
        log::debug!("creating program {}", self.command());
        match self {
            ProgramKind::Nano => Box::new(Nano::new(
                args.title.as_deref().unwrap_or("untitled"),
                args.content.as_deref().unwrap_or_default(),
            )),
            ProgramKind::Viewer => Box::new(ImageViewer::new(
                args.title.as_deref().unwrap_or("image"),
                args.content.as_deref(),
            )),
            ProgramKind::Music => {
                Box::new(MusicPlayer::new(args.title.as_deref().unwrap_or("track")))
            },
            ProgramKind::Snake => Box::new(Snake::new(args.seed)),
            ProgramKind::Pong => Box::new(Pong::new(args.seed)),
            ProgramKind::Chess => Box::new(Chess::new(args.bot, args.seed)),
            ProgramKind::Pacman => Box::new(Pacman::new(args.seed)),
        }
    }
}

/// Seeded or entropy-backed RNG for the games.
pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Font size that fits roughly `rows` text lines into `height` pixels.
pub(crate) fn font_for(height: u32, rows: u32) -> u16 {
    let size = height / rows.max(1) * 3 / 4;
    size.clamp(8, 24) as u16
}

/// Draw `text` horizontally centered at row `y`.
pub(crate) fn draw_centered(
    canvas: &mut dyn Canvas,
    text: &str,
    width: u32,
    y: i32,
    font_size: u16,
    color: folio_types::backend::Color,
) -> Result<()> {
    let text_w = canvas.measure_text(text, font_size);
    let x = (width.saturating_sub(text_w) / 2) as i32;
    canvas.draw_text(text, x, y, font_size, color)
}
