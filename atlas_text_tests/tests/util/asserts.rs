// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Various helper functions to assert truths during testing.

use atlas_text::{FontBuffer, FontManager, GlyphKey, INDICES_PER_GLYPH, VERTICES_PER_GLYPH};

/// Assert that the per glyph arrays of `buffer` agree with each other.
pub(crate) fn assert_buffer_consistent(buffer: &FontBuffer, case: &str) {
    let glyphs = buffer.glyph_count();
    assert_eq!(
        buffer.vertices().len(),
        glyphs * VERTICES_PER_GLYPH,
        "vertex count mismatch with {case}"
    );
    assert_eq!(
        buffer.indices().len(),
        glyphs * INDICES_PER_GLYPH,
        "index count mismatch with {case}"
    );
    for (glyph, quad) in buffer.indices().chunks_exact(INDICES_PER_GLYPH).enumerate() {
        let base = (glyph * VERTICES_PER_GLYPH) as u16;
        assert_eq!(
            quad,
            [base, base + 1, base + 2, base + 2, base + 1, base + 3],
            "glyph {glyph} index mismatch with {case}"
        );
    }
    if let Some(carets) = buffer.caret_positions() {
        assert!(
            carets.len() > glyphs,
            "{case}: {} carets for {glyphs} glyphs",
            carets.len()
        );
    }
}

/// Assert that every quad of `buffer` samples the atlas where its glyph
/// currently is.
pub(crate) fn assert_uvs_match_atlas(manager: &FontManager, buffer: &FontBuffer, case: &str) {
    assert_eq!(
        buffer.revision(),
        manager.glyph_cache().revision(),
        "revision mismatch with {case}"
    );
    for (glyph, &code) in buffer.code_points().iter().enumerate() {
        let key = GlyphKey::new(code, buffer.pixel_size(), buffer.glyph_flags());
        let entry = manager
            .glyph_cache()
            .peek(&key)
            .unwrap_or_else(|| panic!("{case}: glyph {code:#x} is not resident"));
        let quad = &buffer.vertices()[glyph * VERTICES_PER_GLYPH..][..VERTICES_PER_GLYPH];
        assert_eq!(
            [quad[0].uv, quad[3].uv],
            [[entry.uv[0], entry.uv[1]], [entry.uv[2], entry.uv[3]]],
            "glyph {glyph} uv mismatch with {case}"
        );
    }
}

/// Left edge of every quad, in pixels.
pub(crate) fn quad_lefts(buffer: &FontBuffer) -> Vec<f32> {
    buffer
        .vertices()
        .chunks_exact(VERTICES_PER_GLYPH)
        .map(|quad| quad[0].position[0])
        .collect()
}
