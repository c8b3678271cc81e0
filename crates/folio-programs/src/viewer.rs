//! Image viewer placeholder.
//!
//! The terminal has no raster images. The viewer frames the file's text
//! (ASCII art or an alt description) under its title.

use folio_types::backend::Canvas;
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;

use crate::{Program, draw_centered, font_for};

const PLACEHOLDER: &[&str] = &[
    "+-------------------+",
    "|    .-.            |",
    "|   (   )    /\\     |",
    "|    `-'    /  \\/\\  |",
    "|          /      \\ |",
    "+-------------------+",
];

pub struct ImageViewer {
    title: String,
    body: Vec<String>,
}

impl ImageViewer {
    pub fn new(title: &str, content: Option<&str>) -> Self {
        let body = match content {
            Some(text) if !text.trim().is_empty() => text.lines().map(str::to_string).collect(),
            _ => PLACEHOLDER.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            title: title.to_string(),
            body,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl Program for ImageViewer {
    fn name(&self) -> &str {
        "view"
    }

    fn on_input(&mut self, _key: Key) {}

    fn render(
        &self,
        canvas: &mut dyn Canvas,
        width: u32,
        height: u32,
        theme: &Theme,
    ) -> Result<()> {
        canvas.clear_area(width, height, theme.bg)?;
        let rows = self.body.len() as u32 + 4;
        let font = font_for(height, rows.max(12));
        let line_h = i32::from(font) + 4;

        draw_centered(canvas, &self.title, width, line_h / 2, font, theme.accent)?;

        let block_h = self.body.len() as i32 * line_h;
        let top = ((height as i32 - block_h) / 2).max(line_h * 2);
        for (i, line) in self.body.iter().enumerate() {
            draw_centered(canvas, line, width, top + i as i32 * line_h, font, theme.text)?;
        }

        let hint_y = height as i32 - line_h - 4;
        draw_centered(canvas, "Esc to close", width, hint_y, font, theme.dim)
    }

    fn reset(&mut self) {}
}
