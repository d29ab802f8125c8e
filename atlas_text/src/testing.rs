// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic fonts and GPU doubles for tests that must not depend on font
//! files or a graphics device.
//!
//! [`BoxFace`] draws every glyph as a solid box half as wide as the pixel
//! size, so positions and sizes in tests can be worked out by hand.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::atlas::{DirtyRegion, GlyphBitmap, RasterGlyph};
use crate::error::{FontError, FontErrorKind};
use crate::font::{FaceMetrics, FontFace, FontLibrary, FontLoader, ShapeRequest, ShapedGlyph};
use crate::gpu::{ShaderProgram, TextureId, TextureSink, UniformHandle};
use crate::layout::{SimpleLineBreaker, UNIT_SCALE};

/// Glyph id of the `fi` ligature of [`BoxFace::latin`].
pub const LIGATURE_FI: u16 = 0x100;
/// Glyph id of the `ff` ligature of [`BoxFace::latin`].
pub const LIGATURE_FF: u16 = 0x101;

const ARABIC_BASE: u16 = 0x10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Coverage {
    Latin,
    Arabic,
}

/// A face whose glyphs are solid boxes.
///
/// - Advances are half the pixel size; ligatures advance twice as far.
/// - Boxes are two pixels narrower than the advance, start one pixel right
///   of the pen and reach from the ascender (three quarters of the pixel
///   size) down to the base line, or down to the descender for `gjpqy`.
/// - Spaces have an advance but no pixels.
#[derive(Clone, Debug)]
pub struct BoxFace {
    coverage: Coverage,
}

impl BoxFace {
    /// Printable ASCII, with `fi` and `ff` ligatures.
    pub fn latin() -> Self {
        Self {
            coverage: Coverage::Latin,
        }
    }

    /// The Arabic block and the space.
    pub fn arabic() -> Self {
        Self {
            coverage: Coverage::Arabic,
        }
    }

    /// Glyph id of `c`, or zero.
    pub fn glyph_id(&self, c: char) -> u16 {
        let id = match (self.coverage, c) {
            (Coverage::Latin, ' '..='~') | (Coverage::Arabic, ' ') => u32::from(c),
            (Coverage::Arabic, '\u{600}'..='\u{6FF}') => {
                u32::from(c) - 0x600 + u32::from(ARABIC_BASE)
            }
            _ => 0,
        };
        u16::try_from(id).unwrap_or(0)
    }

    fn has_glyph(&self, glyph_id: u16) -> bool {
        match self.coverage {
            Coverage::Latin => matches!(glyph_id, 0x20..=0x7E | LIGATURE_FI | LIGATURE_FF),
            Coverage::Arabic => {
                glyph_id == 0x20 || (ARABIC_BASE..ARABIC_BASE + 0x100).contains(&glyph_id)
            }
        }
    }

    fn ligature(&self, rest: &str) -> Option<u16> {
        if self.coverage != Coverage::Latin {
            return None;
        }
        if rest.starts_with("fi") {
            Some(LIGATURE_FI)
        } else if rest.starts_with("ff") {
            Some(LIGATURE_FF)
        } else {
            None
        }
    }
}

fn advance_px(pixel_size: u32, glyph_id: u16) -> u32 {
    let single = pixel_size / 2;
    if matches!(glyph_id, LIGATURE_FI | LIGATURE_FF) {
        single * 2
    } else {
        single
    }
}

fn to_pixels(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX)
}

fn to_units(pixels: u32) -> i32 {
    to_pixels(pixels).saturating_mul(UNIT_SCALE)
}

impl FontFace for BoxFace {
    fn metrics(&self, pixel_size: u32) -> FaceMetrics {
        FaceMetrics {
            ascender: to_pixels(pixel_size * 3 / 4),
            descender: -to_pixels(pixel_size / 4),
            line_gap: 0,
        }
    }

    fn shape(&mut self, text: &str, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        let mut glyphs = Vec::new();
        let mut chars = text.char_indices();
        while let Some((offset, c)) = chars.next() {
            let glyph_id = match self.ligature(&text[offset..]) {
                Some(ligature) => {
                    chars.next();
                    ligature
                }
                None => self.glyph_id(c),
            };
            let x_advance = if glyph_id == 0 {
                0
            } else {
                to_units(advance_px(request.pixel_size, glyph_id))
            };
            glyphs.push(ShapedGlyph {
                glyph_id,
                cluster: offset,
                x_advance,
                x_offset: 0,
                y_offset: 0,
            });
        }
        glyphs
    }

    fn rasterize(&mut self, glyph_id: u16, pixel_size: u32) -> Option<RasterGlyph> {
        if !self.has_glyph(glyph_id) {
            return None;
        }
        let advance = advance_px(pixel_size, glyph_id);
        if glyph_id == 0x20 {
            return Some(RasterGlyph {
                bitmap: GlyphBitmap::default(),
                advance: to_units(advance),
            });
        }
        let ascender = pixel_size * 3 / 4;
        let descends = matches!(
            u8::try_from(glyph_id).map(char::from),
            Ok('g' | 'j' | 'p' | 'q' | 'y')
        );
        let width = advance.saturating_sub(2);
        let height = if descends {
            ascender + pixel_size / 4
        } else {
            ascender
        };
        Some(RasterGlyph {
            bitmap: GlyphBitmap {
                width,
                height,
                left: 1,
                top: to_pixels(ascender),
                pixels: vec![0xFF; width as usize * height as usize],
            },
            advance: to_units(advance),
        })
    }
}

/// Opens `latin` and `arabic` as [`BoxFace`]s. Names ending in `.bad` fail
/// as invalid data; anything else is not found.
#[derive(Copy, Clone, Debug, Default)]
pub struct BoxLoader;

impl FontLoader for BoxLoader {
    fn load(&mut self, name: &str) -> Result<Box<dyn FontFace>, FontError> {
        match name {
            "latin" => Ok(Box::new(BoxFace::latin())),
            "arabic" => Ok(Box::new(BoxFace::arabic())),
            _ if name.ends_with(".bad") => Err(FontError::new(FontErrorKind::InvalidData, name)),
            _ => Err(FontError::new(FontErrorKind::NotFound, name)),
        }
    }
}

/// A library of [`BoxLoader`] fonts with the [`SimpleLineBreaker`].
pub fn box_library() -> FontLibrary {
    FontLibrary::new(Box::new(BoxLoader), Box::new(SimpleLineBreaker))
}

/// Everything a [`RecordingSink`] received.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SinkLog {
    /// Sizes of created textures, in creation order.
    pub textures: Vec<(u32, u32)>,
    /// Uploaded regions, in upload order.
    pub uploads: Vec<(TextureId, DirtyRegion)>,
}

/// A texture sink that records calls. Clones share one log.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    log: Rc<RefCell<SinkLog>>,
}

impl RecordingSink {
    /// Creates a sink with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the log so far.
    pub fn log(&self) -> SinkLog {
        self.log.borrow().clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        *self.log.borrow_mut() = SinkLog::default();
    }
}

impl TextureSink for RecordingSink {
    fn create_texture(&mut self, width: u32, height: u32) -> TextureId {
        let mut log = self.log.borrow_mut();
        log.textures.push((width, height));
        TextureId(log.textures.len() as u64)
    }

    fn upload(&mut self, texture: TextureId, pixels: &[u8], stride: u32, region: DirtyRegion) {
        assert!(
            (region.y + region.height) as usize * stride as usize <= pixels.len(),
            "upload region {region:?} outside of the pixels"
        );
        self.log.borrow_mut().uploads.push((texture, region));
    }
}

/// A shader program with a fixed set of uniforms that records every value
/// it is given.
#[derive(Clone, Debug, Default)]
pub struct MockShader {
    names: Vec<&'static str>,
    /// Values set so far, in order.
    pub values: Vec<(UniformHandle, Vec<f32>)>,
}

impl MockShader {
    /// Creates a program exposing the uniforms `names`.
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            names: names.to_vec(),
            values: Vec::new(),
        }
    }
}

impl ShaderProgram for MockShader {
    fn find_uniform(&mut self, name: &str) -> Option<UniformHandle> {
        let index = self.names.iter().position(|&n| n == name)?;
        u32::try_from(index).ok().map(UniformHandle)
    }

    fn set_uniform(&mut self, uniform: UniformHandle, value: &[f32]) {
        self.values.push((uniform, value.to_vec()));
    }
}
