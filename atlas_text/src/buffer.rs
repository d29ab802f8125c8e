// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertex buffers of laid out strings.

use alloc::vec::Vec;
use core::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::atlas::{GlyphCacheEntry, GlyphFlags};
use crate::error::BufferError;
use crate::layout::{TextAlignment, UNIT_SCALE, place_line};
use crate::metrics::FontMetrics;

/// Number of indices per glyph (two triangles).
pub const INDICES_PER_GLYPH: usize = 6;

/// Number of vertices per glyph.
pub const VERTICES_PER_GLYPH: usize = 4;

/// Largest number of glyphs addressable by 16-bit indices.
pub const MAX_GLYPHS: usize = (u16::MAX as usize + 1) / VERTICES_PER_GLYPH;

/// A vertex of a glyph quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FontVertex {
    /// Position in pixels, y pointing down.
    pub position: [f32; 3],
    /// Atlas texture coordinate.
    pub uv: [f32; 2],
}

/// A line of a [`FontBuffer`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineInfo {
    /// Glyphs of the line, in visual order.
    pub glyphs: Range<usize>,
    /// Caret positions of the line's characters.
    pub carets: Range<usize>,
    /// Word boundaries of the line.
    pub words: Range<usize>,
    /// Width in 26.6 units, after justification.
    pub width: i32,
    /// Offset from the left edge of the buffer in 26.6 units.
    pub offset: i32,
    /// Whether the line ends a paragraph.
    pub paragraph_end: bool,
}

/// Left edge of a word that justification may move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WordBoundary {
    /// First glyph of the word.
    pub glyph: usize,
    /// Pen position of the word's left edge, 26.6 units, line relative.
    pub x: i32,
}

/// GPU ready geometry of a laid out string.
///
/// Every glyph owns four vertices, six indices and one glyph code; the glyph
/// codes let the quads' texture coordinates be re-resolved after the atlas
/// changed.
#[derive(Clone, Debug, Default)]
pub struct FontBuffer {
    metrics: FontMetrics,
    indices: Vec<u16>,
    vertices: Vec<FontVertex>,
    code_points: Vec<u32>,
    caret_positions: Option<Vec<[f32; 2]>>,
    word_boundaries: Vec<WordBoundary>,
    lines: Vec<LineInfo>,
    size: [f32; 2],
    pixel_size: u32,
    glyph_flags: GlyphFlags,
    revision: u32,
    pass: u32,
    line_start: LineInfo,
}

impl FontBuffer {
    /// Creates an empty buffer for glyphs rendered at `pixel_size`.
    pub fn new(pixel_size: u32, glyph_flags: GlyphFlags, caret_info: bool) -> Self {
        Self {
            pixel_size,
            glyph_flags,
            caret_positions: caret_info.then(Vec::new),
            ..Self::default()
        }
    }

    /// Vertices, four per glyph.
    pub fn vertices(&self) -> &[FontVertex] {
        &self.vertices
    }

    /// Triangle list indices, six per glyph.
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Glyph codes, one per glyph.
    pub fn code_points(&self) -> &[u32] {
        &self.code_points
    }

    /// Number of glyphs.
    pub fn glyph_count(&self) -> usize {
        self.code_points.len()
    }

    /// Caret positions, if they were requested.
    ///
    /// There is one caret before every character plus one after the last.
    pub fn caret_positions(&self) -> Option<&[[f32; 2]]> {
        self.caret_positions.as_deref()
    }

    /// Whether caret positions were recorded.
    pub fn has_caret_positions(&self) -> bool {
        self.caret_positions.is_some()
    }

    /// Position of the caret before character `index`, or `None` when caret
    /// positions were not requested or `index` is out of range.
    pub fn caret_position(&self, index: usize) -> Option<[f32; 2]> {
        self.caret_positions.as_ref()?.get(index).copied()
    }

    /// Word boundaries recorded for justification.
    pub fn word_boundaries(&self) -> &[WordBoundary] {
        &self.word_boundaries
    }

    /// Lines of the buffer.
    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    /// Vertical metrics of the whole block.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub(crate) fn metrics_mut(&mut self) -> &mut FontMetrics {
        &mut self.metrics
    }

    /// Size of the laid out block in pixels.
    pub fn size(&self) -> [f32; 2] {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: [f32; 2]) {
        self.size = size;
    }

    /// Pixel size glyphs were rendered at.
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    /// Glyph bitmap encoding.
    pub fn glyph_flags(&self) -> GlyphFlags {
        self.glyph_flags
    }

    /// Glyph cache revision the texture coordinates are valid for.
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub(crate) fn set_revision(&mut self, revision: u32) {
        self.revision = revision;
    }

    /// Layout pass in which the buffer was last requested.
    pub fn pass(&self) -> u32 {
        self.pass
    }

    pub(crate) fn set_pass(&mut self, pass: u32) {
        self.pass = pass;
    }

    /// Appends a glyph quad with its top-left corner at `origin` and the
    /// given pixel `size`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the glyph count is checked against MAX_GLYPHS"
    )]
    pub fn add_glyph(
        &mut self,
        code_point: u32,
        entry: &GlyphCacheEntry,
        origin: [f32; 2],
        size: [f32; 2],
    ) -> Result<(), BufferError> {
        if self.code_points.len() >= MAX_GLYPHS {
            return Err(BufferError::TooManyGlyphs);
        }
        let base = self.vertices.len() as u16;
        let [x0, y0] = origin;
        let (x1, y1) = (x0 + size[0], y0 + size[1]);
        let [u0, v0, u1, v1] = entry.uv;
        self.vertices.extend_from_slice(&[
            FontVertex {
                position: [x0, y0, 0.0],
                uv: [u0, v0],
            },
            FontVertex {
                position: [x0, y1, 0.0],
                uv: [u0, v1],
            },
            FontVertex {
                position: [x1, y0, 0.0],
                uv: [u1, v0],
            },
            FontVertex {
                position: [x1, y1, 0.0],
                uv: [u1, v1],
            },
        ]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 1, base + 3]);
        self.code_points.push(code_point);
        Ok(())
    }

    /// Appends a caret position, if carets are recorded.
    pub fn add_caret_position(&mut self, position: [f32; 2]) {
        if let Some(carets) = &mut self.caret_positions {
            carets.push(position);
        }
    }

    /// Marks the next glyph as the start of a word whose left edge is at
    /// `x` (26.6 units, line relative).
    pub fn add_word_boundary(&mut self, x: i32) {
        self.word_boundaries.push(WordBoundary {
            glyph: self.code_points.len(),
            x,
        });
    }

    /// Closes the current line.
    pub fn finish_line(&mut self, width: i32, paragraph_end: bool) {
        let carets = self.caret_positions.as_ref().map_or(0, Vec::len);
        let line = LineInfo {
            glyphs: self.line_start.glyphs.start..self.code_points.len(),
            carets: self.line_start.carets.start..carets,
            words: self.line_start.words.start..self.word_boundaries.len(),
            width,
            offset: 0,
            paragraph_end,
        };
        self.line_start = LineInfo {
            glyphs: line.glyphs.end..line.glyphs.end,
            carets: line.carets.end..line.carets.end,
            words: line.words.end..line.words.end,
            ..LineInfo::default()
        };
        self.lines.push(line);
    }

    /// Aligns line `index` within `available` (26.6 units).
    ///
    /// Justified lines get their word gaps stretched so that the line spans
    /// `available` exactly; every other line is moved as a whole.
    pub fn update_line(
        &mut self,
        index: usize,
        alignment: TextAlignment,
        rtl: bool,
        available: i32,
    ) {
        let Some(line) = self.lines.get(index) else {
            return;
        };
        let line = line.clone();
        let words = &self.word_boundaries[line.words.clone()];
        let placement = place_line(
            alignment,
            rtl,
            line.width,
            available,
            line.paragraph_end,
            words.len(),
        );
        let to_pixels = |units: i32| units as f32 / UNIT_SCALE as f32;

        // Glyphs of word k (k = gaps passed) move by the shift after k gaps.
        let mut word = 0;
        for glyph in line.glyphs.clone() {
            while words.get(word).is_some_and(|w| w.glyph <= glyph) {
                word += 1;
            }
            let dx = to_pixels(placement.shift_after(word));
            for vertex in &mut self.vertices[glyph * VERTICES_PER_GLYPH..][..VERTICES_PER_GLYPH] {
                vertex.position[0] += dx;
            }
        }
        if let Some(carets) = &mut self.caret_positions {
            for caret in &mut carets[line.carets.clone()] {
                let x = caret[0] * UNIT_SCALE as f32;
                let passed = words.iter().take_while(|w| w.x as f32 <= x).count();
                caret[0] += to_pixels(placement.shift_after(passed));
            }
        }

        let stretch = placement.shift_after(words.len()) - placement.offset;
        let line = &mut self.lines[index];
        line.offset = placement.offset;
        line.width += stretch;
    }

    /// Replaces the texture coordinates of glyph `index`.
    pub fn update_uv(&mut self, index: usize, uv: [f32; 4]) {
        let [u0, v0, u1, v1] = uv;
        let quad = &mut self.vertices[index * VERTICES_PER_GLYPH..][..VERTICES_PER_GLYPH];
        quad[0].uv = [u0, v0];
        quad[1].uv = [u0, v1];
        quad[2].uv = [u1, v0];
        quad[3].uv = [u1, v1];
    }

    /// Checks the per glyph array lengths.
    ///
    /// # Panics
    ///
    /// Panics if the vertex or index count does not match the glyph count.
    pub fn verify(&self) {
        let glyphs = self.code_points.len();
        assert_eq!(
            self.vertices.len(),
            glyphs * VERTICES_PER_GLYPH,
            "vertex count does not match {glyphs} glyphs"
        );
        assert_eq!(
            self.indices.len(),
            glyphs * INDICES_PER_GLYPH,
            "index count does not match {glyphs} glyphs"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> GlyphCacheEntry {
        GlyphCacheEntry {
            x: 1,
            y: 1,
            width: 4,
            height: 6,
            bearing_x: 0,
            bearing_y: 6,
            advance: 5 * UNIT_SCALE,
            uv: [0.0, 0.0, 0.5, 0.5],
        }
    }

    /// Three words "a b c" with one glyph each, 5px apart.
    fn three_words() -> FontBuffer {
        let mut buffer = FontBuffer::new(16, GlyphFlags::NONE, true);
        for (code, x) in [0_u32, 1, 2].into_iter().zip([0_i32, 10, 20]) {
            if code > 0 {
                buffer.add_word_boundary(x * UNIT_SCALE);
            }
            buffer.add_caret_position([x as f32, 12.0]);
            buffer
                .add_glyph(code, &entry(), [x as f32, 6.0], [4.0, 6.0])
                .unwrap();
        }
        buffer.add_caret_position([25.0, 12.0]);
        buffer.finish_line(25 * UNIT_SCALE, false);
        buffer
    }

    #[test]
    fn quads_use_two_triangles() {
        let buffer = three_words();
        buffer.verify();
        assert_eq!(buffer.indices()[6..12], [4, 5, 6, 6, 5, 7]);
        assert_eq!(buffer.vertices()[5].position, [10.0, 12.0, 0.0]);
        assert_eq!(buffer.vertices()[6].uv, [0.5, 0.0]);
    }

    #[test]
    fn justify_stretches_to_available_width() {
        let mut buffer = three_words();
        buffer.update_line(0, TextAlignment::JUSTIFY, false, 30 * UNIT_SCALE);
        let line = &buffer.lines()[0];
        assert_eq!(line.width, 30 * UNIT_SCALE);
        let xs: Vec<_> = (0..3).map(|g| buffer.vertices()[g * 4].position[0]).collect();
        assert_eq!(xs, [0.0, 12.5, 25.0]);
        assert_eq!(buffer.caret_position(3), Some([30.0, 12.0]));
    }

    #[test]
    fn right_alignment_moves_everything() {
        let mut buffer = three_words();
        buffer.update_line(0, TextAlignment::Right, false, 40 * UNIT_SCALE);
        assert_eq!(buffer.lines()[0].offset, 15 * UNIT_SCALE);
        assert_eq!(buffer.vertices()[0].position[0], 15.0);
        assert_eq!(buffer.caret_position(0), Some([15.0, 12.0]));
    }

    #[test]
    fn update_uv_patches_one_quad() {
        let mut buffer = three_words();
        buffer.update_uv(1, [0.25, 0.25, 0.75, 1.0]);
        assert_eq!(buffer.vertices()[4].uv, [0.25, 0.25]);
        assert_eq!(buffer.vertices()[7].uv, [0.75, 1.0]);
        assert_eq!(buffer.vertices()[0].uv, [0.0, 0.0]);
    }

    #[test]
    fn carets_are_optional() {
        let mut buffer = FontBuffer::new(16, GlyphFlags::NONE, false);
        buffer.add_caret_position([0.0, 0.0]);
        assert!(!buffer.has_caret_positions());
        assert_eq!(buffer.caret_position(0), None);
    }

    #[test]
    #[should_panic(expected = "vertex count does not match")]
    fn verify_catches_mismatch() {
        let mut buffer = three_words();
        buffer.vertices.pop();
        buffer.verify();
    }
}
