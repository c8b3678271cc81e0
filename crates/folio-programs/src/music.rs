//! Music player placeholder with a looping progress bar.

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;

use crate::{Program, draw_centered, font_for};

/// Seconds for the progress bar to complete one loop.
pub const LOOP_SECS: f32 = 30.0;

const BARS: usize = 16;

pub struct MusicPlayer {
    title: String,
    progress: f32,
    playing: bool,
}

impl MusicPlayer {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            progress: 0.0,
            playing: true,
        }
    }

    /// Position in the loop, in `[0, 1)`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn elapsed_label(&self) -> String {
        let secs = (self.progress * LOOP_SECS) as u32;
        let total = LOOP_SECS as u32;
        format!(
            "{}:{:02} / {}:{:02}",
            secs / 60,
            secs % 60,
            total / 60,
            total % 60
        )
    }
}

impl Program for MusicPlayer {
    fn name(&self) -> &str {
        "music"
    }

    fn on_input(&mut self, key: Key) {
        if key == Key::Char(' ') {
            self.playing = !self.playing;
        }
    }

    fn tick(&mut self, dt: f32) {
        if self.playing {
            self.progress = (self.progress + dt / LOOP_SECS) % 1.0;
        }
    }

    fn render(
        &self,
        canvas: &mut dyn Canvas,
        width: u32,
        height: u32,
        theme: &Theme,
    ) -> Result<()> {
        canvas.clear_area(width, height, theme.bg)?;
        let font = font_for(height, 12);
        let line_h = i32::from(font) + 6;

        draw_centered(canvas, &self.title, width, line_h, font, theme.accent)?;

        // Fake spectrum, animated by the loop position.
        let area_w = width * 3 / 4;
        let bar_w = (area_w / BARS as u32).max(2);
        let left = (width.saturating_sub(bar_w * BARS as u32) / 2) as i32;
        let max_h = (height / 3).max(4);
        let base_y = (height / 2 + max_h / 2) as i32;
        for i in 0..BARS {
            let phase = self.progress * std::f32::consts::TAU * 6.0 + i as f32 * 0.7;
            let level = if self.playing {
                0.2 + 0.8 * (phase.sin() * 0.5 + 0.5)
            } else {
                0.15
            };
            let h = ((max_h as f32) * level) as u32;
            let x = left + (i as u32 * bar_w) as i32;
            canvas.fill_rect(x, base_y - h as i32, bar_w.saturating_sub(1), h, theme.text)?;
        }

        // Progress bar.
        let track_y = base_y + line_h;
        canvas.fill_rect(left, track_y, bar_w * BARS as u32, 4, theme.dim)?;
        let filled = ((bar_w * BARS as u32) as f32 * self.progress) as u32;
        canvas.fill_rect(left, track_y, filled, 4, theme.accent)?;

        let state = if self.playing { "playing" } else { "paused" };
        let status = format!("{state}  {}", self.elapsed_label());
        draw_centered(canvas, &status, width, track_y + line_h, font, theme.text)?;
        draw_centered(
            canvas,
            "Space play/pause   Esc quit",
            width,
            height as i32 - line_h,
            font,
            theme.dim,
        )
    }

    fn reset(&mut self) {
        self.progress = 0.0;
        self.playing = true;
    }
}
