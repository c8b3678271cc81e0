//! A minimal nano-style text editor.
//!
//! The document is a vector of lines. The cursor column counts characters,
//! not bytes, so multi-byte text edits safely.

use std::cell::Cell;

use folio_types::backend::{Canvas, monospace_advance};
use folio_types::error::Result;
use folio_types::input::Key;
use folio_types::theme::Theme;

use crate::{Program, font_for};

const TAB_WIDTH: usize = 4;

/// Rows used before the first render reports the real viewport.
const DEFAULT_ROWS: usize = 20;

pub struct Nano {
    title: String,
    original: String,
    lines: Vec<String>,
    cursor_x: usize,
    cursor_y: usize,
    scroll: usize,
    /// Text rows the last render could fit.
    visible_rows: Cell<usize>,
    modified: bool,
}

fn split_lines(text: &str) -> Vec<String> {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of character column `col` (clamped to the end).
fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map_or(s.len(), |(i, _)| i)
}

impl Nano {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            original: content.to_string(),
            lines: split_lines(content),
            cursor_x: 0,
            cursor_y: 0,
            scroll: 0,
            visible_rows: Cell::new(DEFAULT_ROWS),
            modified: false,
        }
    }

    /// Current document joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Cursor as `(column, row)`.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    /// First document row shown in the viewport.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Override the viewport height in rows (normally set by `render`).
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.visible_rows.set(rows.max(1));
        self.scroll_into_view();
    }

    fn current_len(&self) -> usize {
        char_len(&self.lines[self.cursor_y])
    }

    fn insert_str(&mut self, s: &str) {
        let line = &mut self.lines[self.cursor_y];
        let at = byte_index(line, self.cursor_x);
        line.insert_str(at, s);
        self.cursor_x += char_len(s);
        self.modified = true;
    }

    fn split_line(&mut self) {
        let line = &mut self.lines[self.cursor_y];
        let at = byte_index(line, self.cursor_x);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor_y + 1, rest);
        self.cursor_y += 1;
        self.cursor_x = 0;
        self.modified = true;
    }

    fn backspace(&mut self) {
        if self.cursor_x > 0 {
            let line = &mut self.lines[self.cursor_y];
            let at = byte_index(line, self.cursor_x - 1);
            line.remove(at);
            self.cursor_x -= 1;
            self.modified = true;
        } else if self.cursor_y > 0 {
            let tail = self.lines.remove(self.cursor_y);
            self.cursor_y -= 1;
            self.cursor_x = self.current_len();
            self.lines[self.cursor_y].push_str(&tail);
            self.modified = true;
        }
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::ArrowLeft => {
                if self.cursor_x > 0 {
                    self.cursor_x -= 1;
                } else if self.cursor_y > 0 {
                    self.cursor_y -= 1;
                    self.cursor_x = self.current_len();
                }
            },
            Key::ArrowRight => {
                if self.cursor_x < self.current_len() {
                    self.cursor_x += 1;
                } else if self.cursor_y + 1 < self.lines.len() {
                    self.cursor_y += 1;
                    self.cursor_x = 0;
                }
            },
            Key::ArrowUp => {
                self.cursor_y = self.cursor_y.saturating_sub(1);
                self.cursor_x = self.cursor_x.min(self.current_len());
            },
            Key::ArrowDown => {
                self.cursor_y = (self.cursor_y + 1).min(self.lines.len() - 1);
                self.cursor_x = self.cursor_x.min(self.current_len());
            },
            _ => {},
        }
    }

    fn scroll_into_view(&mut self) {
        self.scroll = visible_top(self.scroll, self.cursor_y, self.visible_rows.get());
    }
}

/// Top row that keeps `cursor_row` inside a window of `rows` rows.
fn visible_top(scroll: usize, cursor_row: usize, rows: usize) -> usize {
    let rows = rows.max(1);
    if cursor_row < scroll {
        cursor_row
    } else if cursor_row >= scroll + rows {
        cursor_row + 1 - rows
    } else {
        scroll
    }
}

impl Program for Nano {
    fn name(&self) -> &str {
        "nano"
    }

    fn on_input(&mut self, key: Key) {
        match key {
            Key::Char(c) => {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
            },
            Key::Tab => self.insert_str(&" ".repeat(TAB_WIDTH)),
            Key::Enter => self.split_line(),
            Key::Backspace => self.backspace(),
            Key::ArrowLeft | Key::ArrowRight | Key::ArrowUp | Key::ArrowDown => {
                self.move_cursor(key);
            },
            Key::Escape => {},
        }
        self.scroll_into_view();
    }

    fn render(
        &self,
        canvas: &mut dyn Canvas,
        width: u32,
        height: u32,
        theme: &Theme,
    ) -> Result<()> {
        canvas.clear_area(width, height, theme.bg)?;

        let font = font_for(height, 24);
        let line_h = u32::from(font) + 4;
        let advance = monospace_advance(font);
        let rows = (height.saturating_sub(line_h * 2) / line_h).max(1) as usize;
        self.visible_rows.set(rows);
        let top = visible_top(self.scroll, self.cursor_y, rows);

        // Header bar.
        canvas.fill_rect(0, 0, width, line_h, theme.dim)?;
        let marker = if self.modified { "  [Modified]" } else { "" };
        let header = format!("  nano  {}{marker}", self.title);
        canvas.draw_text(&header, 4, 2, font, theme.bg)?;

        for (row, line) in self.lines.iter().skip(top).take(rows).enumerate() {
            let y = ((row as u32 + 1) * line_h) as i32;
            canvas.draw_text(line, 4, y + 2, font, theme.text)?;
        }

        // Block cursor.
        let cursor_row = (self.cursor_y - top) as u32 + 1;
        canvas.fill_rect(
            4 + (self.cursor_x as u32 * advance) as i32,
            (cursor_row * line_h) as i32,
            advance,
            line_h,
            theme.accent.with_alpha(160),
        )?;

        let footer_y = height.saturating_sub(line_h) as i32;
        let status = format!(
            "Esc Exit   Ln {}, Col {}",
            self.cursor_y + 1,
            self.cursor_x + 1
        );
        canvas.draw_text(&status, 4, footer_y + 2, font, theme.dim)
    }

    fn reset(&mut self) {
        *self = Self::new(&self.title, &self.original);
    }
}
