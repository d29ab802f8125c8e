// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font faces and the library context that opens them.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::atlas::RasterGlyph;
use crate::error::FontError;
use crate::layout::{LineBreaker, Script, TextLayoutDirection};
use crate::sdf::{DistanceComputer, DistanceFieldEncoder};

/// Vertical metrics of a face at a pixel size, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceMetrics {
    /// Height above the base line.
    pub ascender: i32,
    /// Depth below the base line, zero or negative.
    pub descender: i32,
    /// Recommended extra space between lines.
    pub line_gap: i32,
}

/// Parameters of a shaping request.
#[derive(Copy, Clone, Debug)]
pub struct ShapeRequest<'a> {
    /// Pixel size to shape at.
    pub pixel_size: u32,
    /// Script of the text.
    pub script: Script,
    /// Language subtag, e.g. `en`.
    pub language: &'a str,
    /// Direction of the text.
    pub direction: TextLayoutDirection,
}

/// A glyph produced by shaping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Face-local glyph id. Zero means the face has no glyph for the cluster.
    pub glyph_id: u16,
    /// Byte offset in the shaped text of the first character of the cluster.
    pub cluster: usize,
    /// Horizontal advance in 26.6 fixed point.
    pub x_advance: i32,
    /// Horizontal offset in 26.6 fixed point.
    pub x_offset: i32,
    /// Vertical offset in 26.6 fixed point, positive up.
    pub y_offset: i32,
}

/// A font face able to shape and rasterize.
pub trait FontFace {
    /// Vertical metrics at `pixel_size`.
    fn metrics(&self, pixel_size: u32) -> FaceMetrics;

    /// Shapes `text`, returning glyphs in logical order (ascending cluster).
    fn shape(&mut self, text: &str, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph>;

    /// Rasterizes a coverage bitmap, or `None` if the face has no such glyph.
    fn rasterize(&mut self, glyph_id: u16, pixel_size: u32) -> Option<RasterGlyph>;
}

/// Opens font faces by name.
pub trait FontLoader {
    /// Opens the face called `name`.
    fn load(&mut self, name: &str) -> Result<Box<dyn FontFace>, FontError>;
}

/// Process scoped services shared by every face: the font source, the line
/// breaker and the distance field encoder.
///
/// A library is handed to [`FontManager::new`](crate::FontManager::new) and
/// returned by [`FontManager::into_library`](crate::FontManager::into_library).
pub struct FontLibrary {
    pub(crate) loader: Box<dyn FontLoader>,
    pub(crate) breaker: Box<dyn LineBreaker>,
    pub(crate) encoder: Box<dyn DistanceFieldEncoder>,
}

impl FontLibrary {
    /// Creates a library from a loader and a line breaker.
    pub fn new(loader: Box<dyn FontLoader>, breaker: Box<dyn LineBreaker>) -> Self {
        Self {
            loader,
            breaker,
            encoder: Box::new(DistanceComputer::new()),
        }
    }

    /// Replaces the distance field encoder.
    pub fn with_encoder(mut self, encoder: Box<dyn DistanceFieldEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// A library that opens font files from disk with swash and breaks lines
    /// with ICU4X when the `icu` feature is enabled.
    #[cfg(feature = "swash")]
    pub fn system() -> Self {
        #[cfg(feature = "icu")]
        let breaker: Box<dyn LineBreaker> = Box::new(crate::layout::IcuLineBreaker::new());
        #[cfg(not(feature = "icu"))]
        let breaker: Box<dyn LineBreaker> = Box::new(crate::layout::SimpleLineBreaker);
        Self::new(Box::new(crate::swash_font::SwashFontLoader::new()), breaker)
    }
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary").finish_non_exhaustive()
    }
}
