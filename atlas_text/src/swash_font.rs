// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Font files shaped and rasterized with swash.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use swash::scale::{Render, ScaleContext, Source};
use swash::shape::{Direction, ShapeContext};
use swash::text::{Codepoint, Language, Script as SwashScript};
use swash::zeno::Format;
use swash::{CacheKey, FontRef};

use crate::atlas::{GlyphBitmap, RasterGlyph};
use crate::error::{FontError, FontErrorKind};
use crate::font::{FaceMetrics, FontFace, FontLoader, ShapeRequest, ShapedGlyph};
use crate::layout::{Script, UNIT_SCALE};

/// Opens font files from disk; the name is the path of the file.
#[derive(Copy, Clone, Debug, Default)]
pub struct SwashFontLoader;

impl SwashFontLoader {
    /// Creates a loader.
    pub fn new() -> Self {
        Self
    }
}

impl FontLoader for SwashFontLoader {
    fn load(&mut self, name: &str) -> Result<Box<dyn FontFace>, FontError> {
        let data = std::fs::read(name).map_err(|err| {
            log::warn!("cannot read font `{name}`: {err}");
            FontError::new(FontErrorKind::NotFound, name)
        })?;
        let face = SwashFace::from_data(data)
            .ok_or_else(|| FontError::new(FontErrorKind::InvalidData, name))?;
        Ok(Box::new(face))
    }
}

/// The first face of a font file.
pub struct SwashFace {
    data: Vec<u8>,
    offset: u32,
    key: CacheKey,
    shape_context: ShapeContext,
    scale_context: ScaleContext,
}

impl SwashFace {
    /// Parses the first face of `data`, or returns `None` if it is not a
    /// font.
    pub fn from_data(data: Vec<u8>) -> Option<Self> {
        let font = FontRef::from_index(&data, 0)?;
        let (offset, key) = (font.offset, font.key);
        Some(Self {
            data,
            offset,
            key,
            shape_context: ShapeContext::new(),
            scale_context: ScaleContext::new(),
        })
    }

    fn font(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }
}

impl fmt::Debug for SwashFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwashFace")
            .field("len", &self.data.len())
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

fn swash_script(script: Script, text: &str) -> SwashScript {
    match &script.to_bytes() {
        b"Latn" => SwashScript::Latin,
        b"Arab" => SwashScript::Arabic,
        b"Hebr" => SwashScript::Hebrew,
        b"Cyrl" => SwashScript::Cyrillic,
        b"Grek" => SwashScript::Greek,
        b"Deva" => SwashScript::Devanagari,
        b"Thai" => SwashScript::Thai,
        b"Hani" | b"Jpan" => SwashScript::Han,
        b"Kore" => SwashScript::Hangul,
        _ => text
            .chars()
            .map(Codepoint::script)
            .find(|script| {
                !matches!(
                    script,
                    SwashScript::Common | SwashScript::Inherited | SwashScript::Unknown
                )
            })
            .unwrap_or(SwashScript::Latin),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "glyph positions at UI sizes are far below i32::MAX"
)]
fn to_units(value: f32) -> i32 {
    (value * UNIT_SCALE as f32).round() as i32
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "metrics at UI sizes are far below i32::MAX"
)]
fn to_pixels(value: f32) -> i32 {
    value.round() as i32
}

impl FontFace for SwashFace {
    fn metrics(&self, pixel_size: u32) -> FaceMetrics {
        let metrics = self.font().metrics(&[]).scale(pixel_size as f32);
        FaceMetrics {
            ascender: to_pixels(metrics.ascent),
            descender: -to_pixels(metrics.descent),
            line_gap: to_pixels(metrics.leading),
        }
    }

    fn shape(&mut self, text: &str, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        let font = FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        };
        let direction = if request.direction.is_rtl() {
            Direction::RightToLeft
        } else {
            Direction::LeftToRight
        };
        let mut shaper = self
            .shape_context
            .builder(font)
            .script(swash_script(request.script, text))
            .direction(direction)
            .language(Language::parse(request.language))
            .size(request.pixel_size as f32)
            .build();
        shaper.add_str(text);

        let mut glyphs = Vec::new();
        shaper.shape_with(|cluster| {
            let start = cluster.source.start as usize;
            for glyph in cluster.glyphs {
                glyphs.push(ShapedGlyph {
                    glyph_id: glyph.id,
                    cluster: start,
                    x_advance: to_units(glyph.advance),
                    x_offset: to_units(glyph.x),
                    y_offset: to_units(glyph.y),
                });
            }
        });
        // Right to left runs come out in visual order.
        glyphs.sort_by_key(|glyph| glyph.cluster);
        glyphs
    }

    fn rasterize(&mut self, glyph_id: u16, pixel_size: u32) -> Option<RasterGlyph> {
        let font = FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        };
        if glyph_id == 0 || glyph_id >= font.metrics(&[]).glyph_count {
            return None;
        }
        let size = pixel_size as f32;
        let advance = to_units(font.glyph_metrics(&[]).scale(size).advance_width(glyph_id));
        let mut scaler = self.scale_context.builder(font).size(size).hint(true).build();
        let bitmap = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph_id)
            .map(|image| GlyphBitmap {
                width: image.placement.width,
                height: image.placement.height,
                left: image.placement.left,
                top: image.placement.top,
                pixels: image.data,
            })
            .unwrap_or_default();
        Some(RasterGlyph { bitmap, advance })
    }
}
