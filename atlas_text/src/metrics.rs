// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical metrics of a rendered run of glyphs.

/// Vertical metrics of a run of glyphs, in pixels.
///
/// ```text
///  --------------------  <- top of the buffer
///   internal leading        (glyph parts above the ascender)
///  --------------------
///   ascender
///  --------------------  <- base line
///   descender               (negative)
///  --------------------
///   external leading        (negative; glyph parts below the descender)
///  --------------------  <- bottom of the buffer
/// ```
///
/// The sign of every field is an invariant; the setters panic when it is
/// violated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    base_line: i32,
    internal_leading: i32,
    ascender: i32,
    descender: i32,
    external_leading: i32,
}

impl FontMetrics {
    /// Creates metrics, checking the sign of every field.
    ///
    /// # Panics
    ///
    /// Panics if a leading or ascender is negative, or the descender or
    /// external leading is positive.
    pub fn new(
        base_line: i32,
        internal_leading: i32,
        ascender: i32,
        descender: i32,
        external_leading: i32,
    ) -> Self {
        let mut metrics = Self {
            base_line,
            ..Self::default()
        };
        metrics.set_internal_leading(internal_leading);
        metrics.set_ascender(ascender);
        metrics.set_descender(descender);
        metrics.set_external_leading(external_leading);
        metrics
    }

    /// Distance from the top of the buffer to the base line.
    pub fn base_line(&self) -> i32 {
        self.base_line
    }

    /// Sets the base line.
    pub fn set_base_line(&mut self, base_line: i32) {
        self.base_line = base_line;
    }

    /// Extra space above the ascender.
    pub fn internal_leading(&self) -> i32 {
        self.internal_leading
    }

    /// Sets the internal leading.
    pub fn set_internal_leading(&mut self, internal_leading: i32) {
        assert!(
            internal_leading >= 0,
            "internal leading must not be negative, got {internal_leading}"
        );
        self.internal_leading = internal_leading;
    }

    /// Height above the base line.
    pub fn ascender(&self) -> i32 {
        self.ascender
    }

    /// Sets the ascender.
    pub fn set_ascender(&mut self, ascender: i32) {
        assert!(ascender >= 0, "ascender must not be negative, got {ascender}");
        self.ascender = ascender;
    }

    /// Depth below the base line, zero or negative.
    pub fn descender(&self) -> i32 {
        self.descender
    }

    /// Sets the descender.
    pub fn set_descender(&mut self, descender: i32) {
        assert!(descender <= 0, "descender must not be positive, got {descender}");
        self.descender = descender;
    }

    /// Extra space below the descender, zero or negative.
    pub fn external_leading(&self) -> i32 {
        self.external_leading
    }

    /// Sets the external leading.
    pub fn set_external_leading(&mut self, external_leading: i32) {
        assert!(
            external_leading <= 0,
            "external leading must not be positive, got {external_leading}"
        );
        self.external_leading = external_leading;
    }

    /// Total height covered by the metrics.
    pub fn total(&self) -> i32 {
        self.internal_leading + self.ascender - self.descender - self.external_leading
    }

    /// Grows the leadings so that a glyph spanning `top` (above the base
    /// line, positive up) to `bottom` fits. Returns `true` if anything grew.
    ///
    /// Metrics only ever grow.
    pub fn grow_to_include(&mut self, top: i32, bottom: i32) -> bool {
        let mut grew = false;
        let internal = top - self.ascender;
        if internal > self.internal_leading {
            self.internal_leading = internal;
            grew = true;
        }
        let external = bottom - self.descender;
        if external < self.external_leading {
            self.external_leading = external;
            grew = true;
        }
        if grew {
            self.base_line = self.internal_leading + self.ascender;
        }
        grew
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_every_band() {
        let metrics = FontMetrics::new(26, 2, 24, -8, -1);
        assert_eq!(metrics.total(), 35);
    }

    #[test]
    #[should_panic(expected = "descender must not be positive")]
    fn positive_descender_panics() {
        FontMetrics::new(0, 0, 10, 2, 0);
    }

    #[test]
    #[should_panic(expected = "internal leading must not be negative")]
    fn negative_internal_leading_panics() {
        let mut metrics = FontMetrics::default();
        metrics.set_internal_leading(-1);
    }

    #[test]
    fn growth_is_monotonic() {
        let mut metrics = FontMetrics::new(20, 0, 20, -5, 0);
        assert!(!metrics.grow_to_include(18, -4));
        assert_eq!(metrics.total(), 25);

        assert!(metrics.grow_to_include(23, -4));
        assert_eq!(metrics.internal_leading(), 3);
        assert_eq!(metrics.base_line(), 23);
        assert_eq!(metrics.total(), 28);

        assert!(metrics.grow_to_include(10, -9));
        assert_eq!(metrics.external_leading(), -4);
        assert_eq!(metrics.total(), 32);

        // A smaller glyph afterwards changes nothing.
        let before = metrics;
        assert!(!metrics.grow_to_include(21, -6));
        assert_eq!(metrics, before);
    }
}
