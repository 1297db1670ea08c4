//! Text → pixel bitmap, for `appendBitmapText`.
//!
//! The default [`SpleenRasterizer`] draws monospace glyphs from the Spleen
//! bitmap fonts. It picks the font cell and integer scale whose line height is
//! closest to the requested font size, wraps at word boundaries to fit the
//! target width and renders black text on white.

use image::{DynamicImage, GrayImage, Luma};
use spleen_font::{FONT_6X12, FONT_8X16, FONT_12X24, PSF2Font};

use crate::error::CometaError;

/// Renders text into an image the bitmap pipeline can convert.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, text: &str, font_size: f32, width: u16) -> Result<DynamicImage, CometaError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    width: usize,
    height: usize,
    data: &'static [u8],
}

const CELLS: [Cell; 3] = [
    Cell {
        width: 6,
        height: 12,
        data: FONT_6X12,
    },
    Cell {
        width: 8,
        height: 16,
        data: FONT_8X16,
    },
    Cell {
        width: 12,
        height: 24,
        data: FONT_12X24,
    },
];

const MAX_SCALE: usize = 8;

/// Font cell and integer magnification closest to `font_size` pixels.
fn pick_cell(font_size: f32) -> (Cell, usize) {
    let target = font_size.max(1.0);
    let mut best = (CELLS[0], 1);
    let mut best_err = f32::MAX;
    for scale in 1..=MAX_SCALE {
        for cell in CELLS {
            let err = ((cell.height * scale) as f32 - target).abs();
            if err < best_err {
                best = (cell, scale);
                best_err = err;
            }
        }
    }
    best
}

/// Greedy word wrap to `columns` characters. Explicit newlines are kept,
/// words longer than a line are split.
fn wrap(text: &str, columns: usize) -> Vec<Vec<char>> {
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line: Vec<char> = Vec::new();
        for word in paragraph.split(' ') {
            let mut word: Vec<char> = word.chars().collect();
            let needed = if line.is_empty() { word.len() } else { line.len() + 1 + word.len() };
            if needed > columns && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            while line.len() + word.len() > columns {
                let split = columns - line.len();
                let rest = word.split_off(split);
                line.extend(word);
                lines.push(std::mem::take(&mut line));
                word = rest;
            }
            line.extend(word);
        }
        lines.push(line);
    }

    lines
}

/// Default rasterizer backed by the Spleen bitmap fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpleenRasterizer;

impl Rasterizer for SpleenRasterizer {
    fn rasterize(&self, text: &str, font_size: f32, width: u16) -> Result<DynamicImage, CometaError> {
        let width = usize::from(width);
        if width == 0 {
            return Err(CometaError::Image("rasterize width is zero".to_string()));
        }

        let (cell, scale) = pick_cell(font_size);
        let cell_w = cell.width * scale;
        let cell_h = cell.height * scale;
        let lines = wrap(text, width / cell_w);

        let mut font = PSF2Font::new(cell.data)
            .ok()
            .ok_or_else(|| CometaError::Image("failed to load bitmap font".to_string()))?;

        let height = (lines.len() * cell_h).max(1);
        let mut canvas = GrayImage::from_pixel(width as u32, height as u32, Luma([255]));

        for (line_idx, line) in lines.iter().enumerate() {
            for (col, ch) in line.iter().enumerate() {
                let mut utf8 = [0u8; 4];
                let Some(glyph) = font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes()) else {
                    continue;
                };
                let origin_x = col * cell_w;
                let origin_y = line_idx * cell_h;

                for (gy, row) in glyph.enumerate() {
                    for (gx, on) in row.enumerate() {
                        if !on {
                            continue;
                        }
                        for dy in 0..scale {
                            for dx in 0..scale {
                                let x = origin_x + gx * scale + dx;
                                let y = origin_y + gy * scale + dy;
                                if x < width && y < height {
                                    canvas.put_pixel(x as u32, y as u32, Luma([0]));
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(DynamicImage::ImageLuma8(canvas))
    }
}
