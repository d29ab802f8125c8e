// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph bitmap atlas cache.
//!
//! This module provides a glyph atlas that:
//! - Rasterizes glyphs once and reuses the bitmaps for every later request
//! - Packs glyph bitmaps into full-width rows of a single fixed-size image
//! - Evicts whole rows, least recently used first, merging neighbours when
//!   a glyph is taller than any single candidate
//! - Never evicts a row used in the current pass
//! - Tracks a revision so that stale glyph positions can be detected

mod cache;
mod key;
mod region;
mod row;

pub use cache::{GLYPH_PADDING, GlyphCache, GlyphCacheStats, GlyphLookup, MAX_ATLAS_SIZE};
pub use key::{GlyphFlags, GlyphKey, glyph_code, split_glyph_code};
pub use region::{DirtyRegion, GlyphBitmap, GlyphCacheEntry, RasterGlyph};
