//! Text capture of rendered frames.

use folio_types::backend::{Canvas, Color, monospace_advance};
use folio_types::error::Result;

/// A canvas that keeps only drawn text, keyed by position.
#[derive(Default)]
pub struct TextCanvas {
    items: Vec<(i32, i32, String)>,
}

impl TextCanvas {
    /// Drawn text grouped into rows, top to bottom, left to right.
    pub fn rows(&self) -> Vec<String> {
        let mut items: Vec<&(i32, i32, String)> = self.items.iter().collect();
        items.sort_by_key(|(x, y, _)| (*y, *x));
        let mut rows: Vec<(i32, String)> = Vec::new();
        for (_, y, text) in items {
            match rows.last_mut() {
                Some((row_y, row)) if *row_y == *y => {
                    row.push(' ');
                    row.push_str(text);
                },
                _ => rows.push((*y, text.clone())),
            }
        }
        rows.into_iter().map(|(_, row)| row).collect()
    }
}

impl Canvas for TextCanvas {
    fn fill_rect(&mut self, _x: i32, _y: i32, _w: u32, _h: u32, _color: Color) -> Result<()> {
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, _font_size: u16, _color: Color) -> Result<()> {
        if !text.trim().is_empty() {
            self.items.push((x, y, text.to_string()));
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: u16) -> u32 {
        text.chars().count() as u32 * monospace_advance(font_size)
    }
}
