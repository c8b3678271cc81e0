//! Shared test utilities for program render tests.
//!
//! Provides a [`MockCanvas`] that records all draw calls for assertion.

use folio_types::backend::{Canvas, Color, monospace_advance};
use folio_types::error::Result;

/// A recorded draw call from the mock canvas.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum DrawCall {
    FillRect {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        color: Color,
    },
    DrawText {
        text: String,
        x: i32,
        y: i32,
        font_size: u16,
        color: Color,
    },
}

/// A mock canvas that records all draw calls for test assertions.
pub struct MockCanvas {
    pub calls: Vec<DrawCall>,
}

impl MockCanvas {
    pub fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Count of `FillRect` calls.
    pub fn fill_rect_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillRect { .. }))
            .count()
    }

    /// Count of `FillRect` calls painted with `color`.
    pub fn fills_with(&self, color: Color) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, DrawCall::FillRect { color: c2, .. } if *c2 == color))
            .count()
    }

    /// Check if any `DrawText` call contains the given substring.
    pub fn has_text(&self, needle: &str) -> bool {
        self.calls.iter().any(|c| {
            if let DrawCall::DrawText { text, .. } = c {
                text.contains(needle)
            } else {
                false
            }
        })
    }

    /// Return text draw calls as `(text, x, y)` sorted top to bottom.
    pub fn text_positions(&self) -> Vec<(&str, i32, i32)> {
        let mut positions: Vec<_> = self
            .calls
            .iter()
            .filter_map(|c| {
                if let DrawCall::DrawText { text, x, y, .. } = c {
                    Some((text.as_str(), *x, *y))
                } else {
                    None
                }
            })
            .collect();
        positions.sort_by(|a, b| a.2.cmp(&b.2).then(a.1.cmp(&b.1)));
        positions
    }
}

impl Canvas for MockCanvas {
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Result<()> {
        self.calls.push(DrawCall::FillRect { x, y, w, h, color });
        Ok(())
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        font_size: u16,
        color: Color,
    ) -> Result<()> {
        self.calls.push(DrawCall::DrawText {
            text: text.to_string(),
            x,
            y,
            font_size,
            color,
        });
        Ok(())
    }

    fn measure_text(&self, text: &str, font_size: u16) -> u32 {
        text.chars().count() as u32 * monospace_advance(font_size)
    }
}
