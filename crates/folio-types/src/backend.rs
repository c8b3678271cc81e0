//! Draw-surface trait definitions.
//!
//! Programs never call platform APIs. Every frame they draw through a
//! [`Canvas`] supplied by the presentation layer (a DOM canvas, a texture
//! mapped onto a 3D model, or a test recorder).
//!
//! The trait has three required primitives. The remaining methods have
//! default implementations built on `fill_rect`, so a minimal surface only
//! needs rectangles and text.

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// A color in RGBA format (0-255 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Return the same color with a different alpha value.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let bad = || FolioError::Config(format!("invalid color: {hex}"));
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| bad());
        match digits.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in digits.chars().enumerate() {
                    let v = channel(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            },
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(bad()),
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
}

impl TryFrom<String> for Color {
    type Error = FolioError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Drawing surface handed to `render` once per frame.
///
/// Coordinates are pixels relative to the top-left of the area the program
/// owns. Implementations may approximate `font_size`.
pub trait Canvas {
    // -----------------------------------------------------------------------
    // Core methods (required)
    // -----------------------------------------------------------------------

    /// Draw a filled rectangle.
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Result<()>;

    /// Draw a single line of text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: i32, y: i32, font_size: u16, color: Color)
    -> Result<()>;

    /// Measure the width of a text string at the given font size.
    fn measure_text(&self, text: &str, font_size: u16) -> u32;

    // -----------------------------------------------------------------------
    // Extended primitives (optional)
    // -----------------------------------------------------------------------

    /// Fill the whole area with one color.
    fn clear_area(&mut self, w: u32, h: u32, color: Color) -> Result<()> {
        self.fill_rect(0, 0, w, h, color)
    }

    /// Draw the outline of a rectangle.
    fn stroke_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        stroke_width: u16,
        color: Color,
    ) -> Result<()> {
        let sw = u32::from(stroke_width).min(w).min(h);
        if sw == 0 {
            return Ok(());
        }
        self.fill_rect(x, y, w, sw, color)?;
        self.fill_rect(x, y + (h - sw) as i32, w, sw, color)?;
        self.fill_rect(x, y, sw, h, color)?;
        self.fill_rect(x + (w - sw) as i32, y, sw, h, color)
    }

    /// Draw a filled circle. The default approximates with horizontal spans.
    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u16, color: Color) -> Result<()> {
        let r = i32::from(radius);
        for dy in -r..=r {
            let half = (((r * r - dy * dy) as f32).sqrt()) as i32;
            self.fill_rect(cx - half, cy + dy, (half * 2 + 1) as u32, 1, color)?;
        }
        Ok(())
    }
}

/// Approximate glyph width for monospace surfaces (0.6 em).
pub fn monospace_advance(font_size: u16) -> u32 {
    (u32::from(font_size) * 3).div_ceil(5).max(1)
}
