// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas regions and glyph bitmaps.

use alloc::vec::Vec;

/// An 8-bit single channel glyph image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Horizontal bearing: offset from the pen position to the left edge.
    pub left: i32,
    /// Vertical bearing: offset from the baseline up to the top edge.
    pub top: i32,
    /// Row-major pixels, `width * height` bytes.
    pub pixels: Vec<u8>,
}

impl GlyphBitmap {
    /// Returns `true` if the bitmap covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rasterized glyph as produced by a [`FontFace`](crate::FontFace).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RasterGlyph {
    /// The coverage (or distance) image.
    pub bitmap: GlyphBitmap,
    /// Horizontal advance in 26.6 fixed point.
    pub advance: i32,
}

/// Location and placement metrics of a cached glyph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphCacheEntry {
    /// X position in the atlas (pixels).
    pub x: u16,
    /// Y position in the atlas (pixels).
    pub y: u16,
    /// Width of the glyph bitmap (pixels).
    pub width: u16,
    /// Height of the glyph bitmap (pixels).
    pub height: u16,
    /// Horizontal bearing.
    pub bearing_x: i16,
    /// Vertical bearing, positive above the baseline.
    pub bearing_y: i16,
    /// Horizontal advance in 26.6 fixed point.
    pub advance: i32,
    /// Normalized texture coordinates `[u0, v0, u1, v1]`.
    pub uv: [f32; 4],
}

impl GlyphCacheEntry {
    /// Returns `true` if the glyph occupies no atlas space.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// An axis aligned pixel rectangle of the atlas that must be re-uploaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DirtyRegion {
    /// Returns the smallest region covering both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + self.width).max(other.x + other.width);
        let y1 = (self.y + self.height).max(other.y + other.height);
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}
