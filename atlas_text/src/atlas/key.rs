// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph cache key.

use core::ops::BitOr;

/// Rendering flags that change the stored bitmap of a glyph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphFlags(u8);

impl GlyphFlags {
    /// Plain coverage bitmap.
    pub const NONE: Self = Self(0);
    /// Distance field extending outward from the outline.
    pub const OUTER_SDF: Self = Self(1 << 0);
    /// Distance field extending inward from the outline.
    pub const INNER_SDF: Self = Self(1 << 1);

    const ALL: u8 = Self::OUTER_SDF.0 | Self::INNER_SDF.0;

    /// Creates flags from raw bits, dropping unknown bits.
    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::ALL)
    }

    /// Returns the raw bits.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` if every flag in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if the glyph is stored as a distance field.
    #[inline]
    pub const fn is_sdf(self) -> bool {
        self.0 != 0
    }
}

impl BitOr for GlyphFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Unique identifier for a cached glyph bitmap.
///
/// `code_point` holds the glyph code produced by shaping (see [`glyph_code`]),
/// so glyphs from different fallback faces never share an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    /// Face-qualified glyph code.
    pub code_point: u32,
    /// Rendered pixel size.
    pub pixel_size: u32,
    /// Bitmap encoding.
    pub flags: GlyphFlags,
}

impl GlyphKey {
    /// Creates a new key.
    #[inline]
    pub fn new(code_point: u32, pixel_size: u32, flags: GlyphFlags) -> Self {
        Self {
            code_point,
            pixel_size,
            flags,
        }
    }
}

/// Packs a face id and a face-local glyph id into a glyph code.
#[inline]
pub fn glyph_code(face_id: u16, glyph_id: u16) -> u32 {
    (u32::from(face_id) << 16) | u32::from(glyph_id)
}

/// Splits a glyph code into its face id and face-local glyph id.
#[expect(
    clippy::cast_possible_truncation,
    reason = "both halves are masked to 16 bits"
)]
#[inline]
pub fn split_glyph_code(code: u32) -> (u16, u16) {
    ((code >> 16) as u16, (code & 0xFFFF) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn glyph_code_round_trip() {
        let code = glyph_code(3, 0x41);
        assert_eq!(code, 0x0003_0041);
        assert_eq!(split_glyph_code(code), (3, 0x41));
    }

    #[test]
    fn flags_truncate_unknown_bits() {
        let flags = GlyphFlags::from_bits_truncate(0xFF);
        assert!(flags.contains(GlyphFlags::OUTER_SDF));
        assert!(flags.contains(GlyphFlags::INNER_SDF));
        assert_eq!(flags.bits(), 3);
        assert!(!GlyphFlags::NONE.is_sdf());
    }

    #[test]
    fn keys_differ_by_every_field() {
        let base = GlyphKey::new(glyph_code(1, 7), 32, GlyphFlags::NONE);
        let mut set = HashSet::new();
        set.insert(base);
        set.insert(GlyphKey::new(glyph_code(2, 7), 32, GlyphFlags::NONE));
        set.insert(GlyphKey::new(glyph_code(1, 7), 33, GlyphFlags::NONE));
        set.insert(GlyphKey::new(glyph_code(1, 7), 32, GlyphFlags::OUTER_SDF));
        assert_eq!(set.len(), 4);
        assert!(set.contains(&GlyphKey::new(glyph_code(1, 7), 32, GlyphFlags::NONE)));
    }
}
