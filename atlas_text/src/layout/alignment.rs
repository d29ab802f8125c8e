// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal alignment of laid out lines.

use alloc::vec::Vec;

/// Horizontal alignment of text within its box.
///
/// The justified variants stretch every line but the last line of a
/// paragraph; the last line uses the alignment named by the variant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Align to the right edge.
    Right,
    /// Center within the box.
    Center,
    /// Justify; the last line is left aligned.
    LeftJustify,
    /// Justify; the last line is right aligned.
    RightJustify,
    /// Justify; the last line is centered.
    CenterJustify,
}

impl TextAlignment {
    /// Plain justification.
    pub const JUSTIFY: Self = Self::LeftJustify;

    /// Returns `true` for the justified variants.
    #[inline]
    pub fn is_justify(self) -> bool {
        matches!(
            self,
            Self::LeftJustify | Self::RightJustify | Self::CenterJustify
        )
    }

    /// The alignment used for the last line of a paragraph.
    #[inline]
    pub fn last_line(self) -> Self {
        match self {
            Self::Left | Self::LeftJustify => Self::Left,
            Self::Right | Self::RightJustify => Self::Right,
            Self::Center | Self::CenterJustify => Self::Center,
        }
    }

    /// Swaps left and right, as used for right to left text.
    #[inline]
    pub fn mirrored(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::LeftJustify => Self::RightJustify,
            Self::RightJustify => Self::LeftJustify,
            other => other,
        }
    }
}

/// How a line is moved and stretched, in 26.6 units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LinePlacement {
    /// Offset of the whole line from the left edge.
    pub(crate) offset: i32,
    /// Extra space inserted at each word gap, left to right.
    pub(crate) gaps: Vec<i32>,
}

impl LinePlacement {
    /// Total shift applied to content right of the first `gap_count` gaps.
    pub(crate) fn shift_after(&self, gap_count: usize) -> i32 {
        self.offset + self.gaps[..gap_count.min(self.gaps.len())].iter().sum::<i32>()
    }
}

/// Places a line of `width` in a box of `available` width.
///
/// `gap_count` is the number of word gaps inside the line. Justification
/// needs at least one gap and positive free space; the free space is split
/// exactly, with the remainder going to the leftmost gaps.
pub(crate) fn place_line(
    alignment: TextAlignment,
    rtl: bool,
    width: i32,
    available: i32,
    paragraph_end: bool,
    gap_count: usize,
) -> LinePlacement {
    let alignment = if rtl { alignment.mirrored() } else { alignment };
    let free = available - width;
    let justify = alignment.is_justify() && !paragraph_end && gap_count > 0 && free > 0;
    if justify {
        let count = i32::try_from(gap_count).unwrap_or(i32::MAX);
        let base = free / count;
        let remainder = free % count;
        let gaps = (0..count)
            .map(|i| base + i32::from(i < remainder))
            .collect();
        return LinePlacement { offset: 0, gaps };
    }
    let offset = match alignment.last_line() {
        TextAlignment::Right => free,
        TextAlignment::Center => free / 2,
        _ => 0,
    };
    LinePlacement {
        offset,
        gaps: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_alignments() {
        assert_eq!(place_line(TextAlignment::Left, false, 100, 300, true, 0).offset, 0);
        assert_eq!(place_line(TextAlignment::Right, false, 100, 300, true, 0).offset, 200);
        assert_eq!(place_line(TextAlignment::Center, false, 100, 300, true, 0).offset, 100);
    }

    #[test]
    fn rtl_mirrors_alignment() {
        assert_eq!(place_line(TextAlignment::Left, true, 100, 300, true, 0).offset, 200);
        assert_eq!(place_line(TextAlignment::Right, true, 100, 300, true, 0).offset, 0);
        assert_eq!(
            place_line(TextAlignment::LeftJustify, true, 100, 300, true, 2).offset,
            200
        );
    }

    #[test]
    fn justify_distributes_exactly() {
        let placement = place_line(TextAlignment::JUSTIFY, false, 290, 300, false, 3);
        assert_eq!(placement.gaps, [4, 3, 3]);
        assert_eq!(placement.shift_after(3), 10);
        assert_eq!(placement.shift_after(1), 4);
        assert_eq!(placement.shift_after(0), 0);
    }

    #[test]
    fn last_line_uses_suffix_alignment() {
        let last = place_line(TextAlignment::CenterJustify, false, 100, 300, true, 3);
        assert_eq!(last.offset, 100);
        assert!(last.gaps.is_empty());
        let right = place_line(TextAlignment::RightJustify, false, 100, 300, true, 3);
        assert_eq!(right.offset, 200);
    }

    #[test]
    fn justify_without_gaps_falls_back() {
        let placement = place_line(TextAlignment::RightJustify, false, 100, 300, false, 0);
        assert_eq!(placement.offset, 200);
    }
}
