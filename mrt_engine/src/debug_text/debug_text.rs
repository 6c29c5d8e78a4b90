/// DebugText - character-grid text layout rendered with `fill_rects`

use glam::Vec4;
use crate::error::Result;
use crate::graphics_device::{GraphicsDevice, ViewportRect};
use crate::debug_text::font::{self, GLYPH_WIDTH, GLYPH_HEIGHT};

/// One character placed on the grid
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlacedGlyph {
    column: u32,
    row: u32,
    code: u8,
    pixel_scale: (u32, u32),
    color: Vec4,
}

/// Buffered debug text
///
/// Text is accumulated with [`print`](Self::print) and turned into device
/// commands by [`flush`](Self::flush), which must be called inside a pass.
/// The cursor is expressed in character cells of the current scale.
#[derive(Debug, Clone)]
pub struct DebugText {
    pixel_scale: (u32, u32),
    color: Vec4,
    cursor: (u32, u32),
    glyphs: Vec<PlacedGlyph>,
}

impl Default for DebugText {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugText {
    pub fn new() -> Self {
        Self {
            pixel_scale: (1, 1),
            color: Vec4::ONE,
            cursor: (0, 0),
            glyphs: Vec::new(),
        }
    }

    /// Scale glyphs by `scale`. Components are rounded to whole pixels, minimum 1.
    pub fn set_text_scale(&mut self, scale: glam::Vec2) {
        let snap = |s: f32| if s.is_finite() { s.round().max(1.0) as u32 } else { 1 };
        self.pixel_scale = (snap(scale.x), snap(scale.y));
    }

    pub fn set_text_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Move the cursor to cell (`x`, `y`)
    pub fn cursor_pos(&mut self, x: u32, y: u32) {
        self.cursor = (x, y);
    }

    pub fn cursor(&self) -> (u32, u32) {
        self.cursor
    }

    /// Append `text` at the cursor. `'\n'` starts a new line at column 0,
    /// `'\r'` returns to column 0. Characters outside printable ASCII print as `'?'`.
    pub fn print(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\n' => self.cursor = (0, self.cursor.1 + 1),
                '\r' => self.cursor.0 = 0,
                _ => {
                    let code = if ch.is_ascii() { ch as u8 } else { font::FALLBACK_CHAR };
                    if code != b' ' {
                        self.glyphs.push(PlacedGlyph {
                            column: self.cursor.0,
                            row: self.cursor.1,
                            code,
                            pixel_scale: self.pixel_scale,
                            color: self.color,
                        });
                    }
                    self.cursor.0 += 1;
                }
            }
        }
    }

    /// Pixel size of one character cell at the current scale
    pub fn cell_size(&self) -> (u32, u32) {
        (GLYPH_WIDTH * self.pixel_scale.0, GLYPH_HEIGHT * self.pixel_scale.1)
    }

    /// Whole character cells fitting in `width` pixels
    pub fn columns_for(&self, width: u32) -> u32 {
        width / self.cell_size().0
    }

    /// Whole character cells fitting in `height` pixels
    pub fn rows_for(&self, height: u32) -> u32 {
        height / self.cell_size().1
    }

    /// Cell at which a single line of `text` is centered in a `width` x `height` area
    pub fn centered_cursor(&self, text: &str, width: u32, height: u32) -> (u32, u32) {
        let len = text.chars().count() as u32;
        let column = self.columns_for(width).saturating_sub(len) / 2;
        let row = self.rows_for(height).saturating_sub(1) / 2;
        (column, row)
    }

    /// Glyphs waiting for the next flush
    pub fn pending_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Rectangles for the buffered text, grouped by color in first-use order
    ///
    /// Each lit run of pixels in a glyph row becomes one rectangle.
    pub fn layout(&self) -> Vec<(Vec4, Vec<ViewportRect>)> {
        let mut batches: Vec<(Vec4, Vec<ViewportRect>)> = Vec::new();

        for glyph in &self.glyphs {
            let (sx, sy) = glyph.pixel_scale;
            let origin_x = (glyph.column * GLYPH_WIDTH * sx) as i32;
            let origin_y = (glyph.row * GLYPH_HEIGHT * sy) as i32;

            let index = match batches.iter().position(|(c, _)| *c == glyph.color) {
                Some(index) => index,
                None => {
                    batches.push((glyph.color, Vec::new()));
                    batches.len() - 1
                }
            };
            let rects = &mut batches[index].1;

            for (py, bits) in font::glyph(glyph.code).iter().enumerate() {
                let mut px = 0;
                while px < GLYPH_WIDTH {
                    if bits & (1 << px) == 0 {
                        px += 1;
                        continue;
                    }
                    let start = px;
                    while px < GLYPH_WIDTH && bits & (1 << px) != 0 {
                        px += 1;
                    }
                    rects.push(ViewportRect::new(
                        origin_x + (start * sx) as i32,
                        origin_y + py as i32 * sy as i32,
                        (px - start) * sx,
                        sy,
                    ));
                }
            }
        }

        batches.retain(|(_, rects)| !rects.is_empty());
        batches
    }

    /// Draw the buffered text into the current pass and clear the buffer
    pub fn flush(&mut self, device: &mut dyn GraphicsDevice) -> Result<()> {
        for (color, rects) in self.layout() {
            device.fill_rects(color, &rects)?;
        }
        self.glyphs.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "debug_text_tests.rs"]
mod tests;
