// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache keys of laid out strings.

use core::hash::{Hash, Hasher};

use crate::atlas::GlyphFlags;
use crate::layout::{TextAlignment, UNIT_SCALE};

/// Layout flags of a [`FontBufferParameters`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontBufferFlags {
    /// Horizontal alignment.
    pub alignment: TextAlignment,
    /// Glyph bitmap encoding.
    pub glyph_flags: GlyphFlags,
    /// Whether caret positions are recorded.
    pub caret_info: bool,
}

/// Fingerprint of a layout request, used as the key of the buffer and
/// texture caches.
///
/// Two parameter sets are equal iff every field matches; the font size is
/// compared by its bit pattern.
#[derive(Copy, Clone, Debug)]
pub struct FontBufferParameters {
    font_id: u64,
    text_id: u64,
    font_size: f32,
    size: [i32; 2],
    flags: FontBufferFlags,
}

impl FontBufferParameters {
    /// Creates a new fingerprint.
    ///
    /// `size` is the box the text is laid out in, in pixels; a zero width
    /// means the text is not wrapped and a zero height means it is not
    /// limited vertically.
    pub fn new(
        font_id: u64,
        text_id: u64,
        font_size: f32,
        size: [i32; 2],
        alignment: TextAlignment,
        glyph_flags: GlyphFlags,
        caret_info: bool,
    ) -> Self {
        Self {
            font_id,
            text_id,
            font_size,
            size,
            flags: FontBufferFlags {
                alignment,
                glyph_flags,
                caret_info,
            },
        }
    }

    /// Identifier of the selected font (or font fallback chain).
    pub fn font_id(&self) -> u64 {
        self.font_id
    }

    /// Identifier of the text.
    pub fn text_id(&self) -> u64 {
        self.text_id
    }

    /// Requested font size in pixels.
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Requested box size in pixels.
    pub fn size(&self) -> [i32; 2] {
        self.size
    }

    /// Layout flags.
    pub fn flags(&self) -> FontBufferFlags {
        self.flags
    }

    /// Horizontal alignment.
    pub fn alignment(&self) -> TextAlignment {
        self.flags.alignment
    }

    /// Glyph bitmap encoding.
    pub fn glyph_flags(&self) -> GlyphFlags {
        self.flags.glyph_flags
    }

    /// Whether caret positions are recorded.
    pub fn caret_info(&self) -> bool {
        self.flags.caret_info
    }

    /// Length lines are aligned to, in 26.6 units.
    ///
    /// Zero for left and center alignment, which need no right edge.
    pub fn line_length(&self) -> i32 {
        match self.flags.alignment {
            TextAlignment::Left | TextAlignment::Center => 0,
            _ => self.size[0] * UNIT_SCALE,
        }
    }

    /// Whether the text wraps onto multiple lines.
    pub fn multi_line(&self) -> bool {
        if self.size[0] == 0 {
            false
        } else if self.flags.alignment != TextAlignment::Left {
            true
        } else {
            self.size[1] == 0 || self.size[1] as f32 > self.font_size
        }
    }
}

impl PartialEq for FontBufferParameters {
    fn eq(&self, other: &Self) -> bool {
        self.font_id == other.font_id
            && self.text_id == other.text_id
            && self.font_size.to_bits() == other.font_size.to_bits()
            && self.size == other.size
            && self.flags == other.flags
    }
}

impl Eq for FontBufferParameters {}

impl Hash for FontBufferParameters {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.font_id.hash(state);
        self.text_id.hash(state);
        self.font_size.to_bits().hash(state);
        self.size.hash(state);
        self.flags.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    fn base() -> FontBufferParameters {
        FontBufferParameters::new(
            1,
            2,
            16.0,
            [100, 0],
            TextAlignment::Left,
            GlyphFlags::NONE,
            false,
        )
    }

    #[test]
    fn every_field_changes_the_key() {
        let variants = [
            base(),
            FontBufferParameters::new(9, 2, 16.0, [100, 0], TextAlignment::Left, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 9, 16.0, [100, 0], TextAlignment::Left, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 2, 16.5, [100, 0], TextAlignment::Left, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 2, 16.0, [101, 0], TextAlignment::Left, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 2, 16.0, [100, 1], TextAlignment::Left, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 2, 16.0, [100, 0], TextAlignment::Right, GlyphFlags::NONE, false),
            FontBufferParameters::new(1, 2, 16.0, [100, 0], TextAlignment::Left, GlyphFlags::OUTER_SDF, false),
            FontBufferParameters::new(1, 2, 16.0, [100, 0], TextAlignment::Left, GlyphFlags::NONE, true),
        ];
        let set: HashSet<_> = variants.iter().copied().collect();
        assert_eq!(set.len(), variants.len());
        assert!(set.contains(&base()));
    }

    #[test]
    fn font_size_compares_bitwise() {
        let a = FontBufferParameters::new(1, 2, 0.0, [0, 0], TextAlignment::Left, GlyphFlags::NONE, false);
        let b = FontBufferParameters::new(1, 2, -0.0, [0, 0], TextAlignment::Left, GlyphFlags::NONE, false);
        assert_ne!(a, b);
    }

    #[test]
    fn line_length_only_for_right_edges() {
        let left = base();
        assert_eq!(left.line_length(), 0);
        let justify = FontBufferParameters::new(1, 2, 16.0, [100, 0], TextAlignment::CenterJustify, GlyphFlags::NONE, false);
        assert_eq!(justify.line_length(), 6400);
    }

    #[test]
    fn multi_line_rules() {
        let make = |size, alignment| {
            FontBufferParameters::new(1, 2, 16.0, size, alignment, GlyphFlags::NONE, false)
        };
        assert!(!make([0, 0], TextAlignment::Center).multi_line());
        assert!(make([100, 10], TextAlignment::Center).multi_line());
        assert!(make([100, 0], TextAlignment::Left).multi_line());
        assert!(!make([100, 16], TextAlignment::Left).multi_line());
        assert!(make([100, 17], TextAlignment::Left).multi_line());
    }
}
