// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Standalone bitmaps of rendered strings.

use alloc::vec;
use alloc::vec::Vec;

use crate::atlas::GlyphBitmap;
use crate::gpu::TextureId;
use crate::metrics::FontMetrics;

/// A string rendered into its own single channel bitmap, outside the atlas.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontTexture {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    metrics: FontMetrics,
    texture: Option<TextureId>,
}

impl FontTexture {
    /// Creates a blank bitmap `width` pixels wide and as tall as `metrics`.
    pub fn new(width: u32, metrics: FontMetrics) -> Self {
        let height = u32::try_from(metrics.total()).unwrap_or(0);
        Self {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
            metrics,
            texture: None,
        }
    }

    /// Row-major pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Vertical metrics of the bitmap.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// GPU texture holding the bitmap, once uploaded.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    pub(crate) fn set_texture(&mut self, texture: TextureId) {
        self.texture = Some(texture);
    }

    /// Draws `glyph` with its pen position at `pen_x` on the base line,
    /// growing the bitmap first if the glyph reaches past the current
    /// metrics.
    pub fn draw_glyph(&mut self, glyph: &GlyphBitmap, pen_x: i32, y_offset: i32) {
        if glyph.is_empty() {
            return;
        }
        let top = glyph.top + y_offset;
        let bottom = top - i32::try_from(glyph.height).unwrap_or(i32::MAX);
        let mut grown = self.metrics;
        if grown.grow_to_include(top, bottom) {
            expand_buffer(self.width, &self.metrics, &grown, &mut self.pixels);
            self.metrics = grown;
            self.height = u32::try_from(grown.total()).unwrap_or(0);
        }

        let stride = self.width as usize;
        let x0 = pen_x + glyph.left;
        let y0 = self.metrics.base_line() - top;
        for (row, line) in glyph.pixels.chunks_exact(glyph.width as usize).enumerate() {
            let Ok(y) = usize::try_from(y0 + row as i32) else {
                continue;
            };
            if y >= self.height as usize {
                break;
            }
            for (col, &value) in line.iter().enumerate() {
                let Ok(x) = usize::try_from(x0 + col as i32) else {
                    continue;
                };
                if x >= stride {
                    break;
                }
                let dst = &mut self.pixels[y * stride + x];
                *dst = (*dst).max(value);
            }
        }
    }
}

/// Re-lays `image` (rows of `width` pixels laid out per `old`) for the
/// taller `new` metrics, keeping every existing row aligned to the base
/// line. Returns `false` and leaves `image` untouched when the height and
/// base line are unchanged.
pub fn expand_buffer(
    width: u32,
    old: &FontMetrics,
    new: &FontMetrics,
    image: &mut Vec<u8>,
) -> bool {
    if old.total() == new.total() && old.base_line() == new.base_line() {
        return false;
    }
    let stride = width as usize;
    let height = usize::try_from(new.total()).unwrap_or(0);
    let shift = usize::try_from(new.base_line() - old.base_line()).unwrap_or(0);
    let mut expanded = vec![0; stride * height];
    for (row, line) in image.chunks_exact(stride.max(1)).enumerate() {
        let start = (row + shift) * stride;
        if let Some(dst) = expanded.get_mut(start..start + stride) {
            dst.copy_from_slice(line);
        }
    }
    *image = expanded;
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(width: u32, height: u32, top: i32) -> GlyphBitmap {
        GlyphBitmap {
            width,
            height,
            left: 0,
            top,
            pixels: vec![9; (width * height) as usize],
        }
    }

    #[test]
    fn unchanged_metrics_do_nothing() {
        let metrics = FontMetrics::new(4, 0, 4, -2, 0);
        let mut image = vec![1; 6 * 2];
        assert!(!expand_buffer(2, &metrics, &metrics, &mut image));
        assert_eq!(image, vec![1; 12]);
    }

    #[test]
    fn rows_move_down_with_the_base_line() {
        let old = FontMetrics::new(2, 0, 2, -1, 0);
        let new = FontMetrics::new(3, 1, 2, -1, -1);
        let mut image = vec![1, 1, 2, 2, 3, 3];
        assert!(expand_buffer(2, &old, &new, &mut image));
        assert_eq!(image, vec![0, 0, 1, 1, 2, 2, 3, 3, 0, 0]);
    }

    #[test]
    fn tall_glyph_grows_the_texture() {
        let mut texture = FontTexture::new(8, FontMetrics::new(4, 0, 4, -2, 0));
        texture.draw_glyph(&glyph(2, 4, 4), 0, 0);
        assert_eq!(texture.height(), 6);
        assert_eq!(texture.pixels()[0], 9);

        // Two pixels above the ascender and one below the descender.
        texture.draw_glyph(&glyph(2, 9, 6), 4, 0);
        assert_eq!(texture.height(), 9);
        assert_eq!(texture.metrics().base_line(), 6);
        // The first glyph moved down with the base line.
        assert_eq!(texture.pixels()[2 * 8], 9);
        assert_eq!(texture.pixels()[0], 0);
        assert_eq!(texture.pixels()[4], 9);
        assert_eq!(texture.pixels()[8 * 8 + 4], 9);
    }
}
