// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas Text turns UTF-8 strings into GPU vertex buffers whose glyphs live
//! in one shared, fixed-size texture atlas.
//!
//! The [`FontManager`] owns the opened faces, the [`GlyphCache`] and the
//! caches of laid out strings. Each frame has two passes:
//!
//! 1. [`FontManager::start_layout_pass`], then any number of
//!    [`FontManager::get_buffer`] calls. A buffer is rebuilt when its glyphs
//!    moved in the atlas since it was laid out.
//! 2. [`FontManager::start_render_pass`], which repairs the texture
//!    coordinates of the buffers requested in the layout pass and uploads
//!    the changed part of the atlas through a [`TextureSink`].
//!
//! Rows of the atlas used in the current pass are never evicted. When a
//! string does not fit in what is left, [`FontManager::get_buffer`] fails
//! with [`BufferError::CacheFull`]; call [`FontManager::flush_and_update`]
//! and request the string again.
//!
//! ## Features
//!
//! - `swash` (enabled by default): [`FontLibrary::system`], opening font
//!   files and shaping and rasterizing them with swash.
//! - `icu` (enabled by default): UAX #14 line breaking with ICU4X.
//! - `testing`: synthetic faces and GPU doubles in [`testing`].

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

pub mod atlas;
pub mod layout;
pub mod sdf;

mod buffer;
mod error;
mod font;
mod gpu;
mod manager;
mod metrics;
mod params;
mod texture;

#[cfg(feature = "swash")]
mod swash_font;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use atlas::{GlyphCache, GlyphFlags, GlyphKey, GlyphLookup};
pub use buffer::{
    FontBuffer, FontVertex, INDICES_PER_GLYPH, LineInfo, MAX_GLYPHS, VERTICES_PER_GLYPH,
    WordBoundary,
};
pub use error::{BufferError, FontError, FontErrorKind};
pub use font::{FaceMetrics, FontFace, FontLibrary, FontLoader, ShapeRequest, ShapedGlyph};
pub use gpu::{
    CLIPPING_UNIFORM, COLOR_UNIFORM, FontShader, POSITION_OFFSET_UNIFORM, ShaderProgram,
    THRESHOLD_UNIFORM, TextureId, TextureSink, UniformHandle,
};
pub use layout::{TextAlignment, TextLayoutDirection};
pub use manager::{FontManager, FontManagerOptions, PassState, text_id};
pub use metrics::FontMetrics;
pub use params::{FontBufferFlags, FontBufferParameters};
pub use texture::{FontTexture, expand_buffer};

#[cfg(feature = "swash")]
pub use swash_font::{SwashFace, SwashFontLoader};
