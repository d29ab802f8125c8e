// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The font manager: opened faces, the glyph atlas, and the caches of laid
//! out strings, driven by a layout pass and a render pass per frame.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use log::{debug, error, warn};
use smallvec::SmallVec;

use crate::atlas::{
    DirtyRegion, GlyphCache, GlyphCacheEntry, GlyphFlags, GlyphKey, GlyphLookup, RasterGlyph,
    split_glyph_code,
};
use crate::buffer::FontBuffer;
use crate::error::{BufferError, FontError, FontErrorKind};
use crate::font::{FontFace, FontLibrary, ShapeRequest};
use crate::gpu::{TextureId, TextureSink};
use crate::layout::{
    FaceRef, LineBreaker, ParseScriptError, Script, ScriptInfo, TextAlignment,
    TextLayoutDirection, TextRun, UNIT_SCALE, layout_text,
};
use crate::metrics::FontMetrics;
use crate::params::FontBufferParameters;
use crate::sdf::DistanceFieldEncoder;
use crate::texture::FontTexture;

const FONT_ID_SEED: u64 = 0x6174_6c61_735f_6964;
const TEXT_ID_SEED: u64 = 0x6174_6c61_735f_7478;

/// Returns the identifier used for `text` in [`FontBufferParameters`].
pub fn text_id(text: &str) -> u64 {
    FixedState::with_seed(TEXT_ID_SEED).hash_one(text)
}

/// Configuration of a [`FontManager`].
#[derive(Clone, Debug, PartialEq)]
pub struct FontManagerOptions {
    /// Edge of the square glyph atlas in pixels, rounded up to a power of
    /// two.
    pub cache_size: u32,
    /// Distance between base lines as a multiple of the font size.
    pub line_height: f32,
    /// Language used when a locale is not in the script table.
    pub default_language: String,
    /// Upper bound on the number of cached buffers.
    pub max_buffers: Option<usize>,
}

impl Default for FontManagerOptions {
    fn default() -> Self {
        Self {
            cache_size: 1024,
            line_height: 1.2,
            default_language: "en".to_string(),
            max_buffers: None,
        }
    }
}

/// Where the manager is in the frame cycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PassState {
    /// No pass has started yet.
    #[default]
    Idle,
    /// Buffers are being requested.
    Layout,
    /// The atlas has been uploaded and buffers are being drawn.
    Render,
}

struct OpenFace {
    name: String,
    face: Box<dyn FontFace>,
}

#[derive(Clone, Debug)]
struct LayoutSettings {
    language: String,
    script: Script,
    direction: TextLayoutDirection,
    line_height: f32,
}

/// Owns the faces, the glyph atlas and every cached [`FontBuffer`] and
/// [`FontTexture`].
///
/// A frame runs [`start_layout_pass`](Self::start_layout_pass), requests
/// buffers with [`get_buffer`](Self::get_buffer), then calls
/// [`start_render_pass`](Self::start_render_pass) before drawing them. When a
/// request fails with [`BufferError::CacheFull`], call
/// [`flush_and_update`](Self::flush_and_update) and request the string again.
pub struct FontManager {
    library: FontLibrary,
    faces: Vec<Option<OpenFace>>,
    face_ids: HashMap<String, u16>,
    selection: SmallVec<[u16; 4]>,
    font_id: u64,
    glyph_cache: GlyphCache,
    sink: Option<Box<dyn TextureSink>>,
    atlas_texture: Option<TextureId>,
    buffers: HashMap<FontBufferParameters, FontBuffer>,
    /// Buffers returned in the current pass, in request order.
    requested: Vec<FontBufferParameters>,
    textures: HashMap<FontBufferParameters, FontTexture>,
    settings: LayoutSettings,
    default_language: String,
    size_selector: Box<dyn Fn(u32) -> u32>,
    max_buffers: Option<usize>,
    state: PassState,
    pass: u32,
}

impl FontManager {
    /// Creates a manager with an empty atlas.
    ///
    /// # Panics
    ///
    /// Panics if the rounded cache size exceeds
    /// [`MAX_ATLAS_SIZE`](crate::atlas::MAX_ATLAS_SIZE).
    pub fn new(library: FontLibrary, options: FontManagerOptions) -> Self {
        let size = options.cache_size.max(1).next_power_of_two();
        let info = ScriptInfo::find(&options.default_language);
        let settings = LayoutSettings {
            language: options.default_language.clone(),
            script: info.map_or(Script::LATIN, |info| info.script),
            direction: info.map_or(TextLayoutDirection::Ltr, |info| info.direction),
            line_height: options.line_height,
        };
        Self {
            library,
            faces: Vec::new(),
            face_ids: HashMap::new(),
            selection: SmallVec::new(),
            font_id: 0,
            glyph_cache: GlyphCache::new(size, size),
            sink: None,
            atlas_texture: None,
            buffers: HashMap::new(),
            requested: Vec::new(),
            textures: HashMap::new(),
            settings,
            default_language: options.default_language,
            size_selector: Box::new(|size| size),
            max_buffers: options.max_buffers,
            state: PassState::Idle,
            pass: 0,
        }
    }

    /// Tears the manager down, returning the library it was created with.
    pub fn into_library(self) -> FontLibrary {
        self.library
    }

    /// Opens the face called `name`, returning its id. Opening an already
    /// open face returns the existing id.
    pub fn open(&mut self, name: &str) -> Result<u16, FontError> {
        if let Some(&id) = self.face_ids.get(name) {
            return Ok(id);
        }
        // Ids are never reused so stale atlas entries cannot alias a new face.
        let Ok(id) = u16::try_from(self.faces.len()) else {
            warn!("cannot open `{name}`: face ids exhausted");
            return Err(FontError::new(FontErrorKind::InvalidData, name));
        };
        let face = self.library.loader.load(name)?;
        debug!("opened font `{name}` as face {id}");
        self.faces.push(Some(OpenFace {
            name: name.to_string(),
            face,
        }));
        self.face_ids.insert(name.to_string(), id);
        Ok(id)
    }

    /// Closes the face called `name`, removing it from the selection and
    /// dropping every cached layout.
    pub fn close(&mut self, name: &str) -> Result<(), FontError> {
        let id = self
            .face_ids
            .remove(name)
            .ok_or_else(|| FontError::new(FontErrorKind::NotOpened, name))?;
        self.faces[usize::from(id)] = None;
        if self.selection.contains(&id) {
            self.selection.retain(|selected| *selected != id);
            self.update_font_id();
        }
        self.flush_layout();
        Ok(())
    }

    /// Selects a single open face.
    pub fn select_font(&mut self, name: &str) -> Result<(), FontError> {
        self.select_fonts(&[name])
    }

    /// Selects open faces in fallback priority order.
    ///
    /// Fails without changing the selection if any face is not open.
    pub fn select_fonts(&mut self, names: &[&str]) -> Result<(), FontError> {
        let mut selection: SmallVec<[u16; 4]> = SmallVec::new();
        for name in names {
            let id = *self
                .face_ids
                .get(*name)
                .ok_or_else(|| FontError::new(FontErrorKind::NotOpened, *name))?;
            if !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selection = selection;
        self.update_font_id();
        Ok(())
    }

    /// Returns `true` if a face is selected.
    pub fn font_loaded(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Identifier of the current selection for [`FontBufferParameters`].
    pub fn font_id(&self) -> u64 {
        self.font_id
    }

    fn update_font_id(&mut self) {
        let mut hasher = FixedState::with_seed(FONT_ID_SEED).build_hasher();
        for &id in &self.selection {
            if let Some(open) = &self.faces[usize::from(id)] {
                open.name.hash(&mut hasher);
            }
        }
        self.font_id = hasher.finish();
    }

    /// Builds the parameters for `text` with the current selection.
    pub fn buffer_parameters(
        &self,
        text: &str,
        font_size: f32,
        size: [i32; 2],
        alignment: TextAlignment,
        glyph_flags: GlyphFlags,
        caret_info: bool,
    ) -> FontBufferParameters {
        FontBufferParameters::new(
            self.font_id,
            text_id(text),
            font_size,
            size,
            alignment,
            glyph_flags,
            caret_info,
        )
    }

    /// Sets the sink receiving atlas and texture uploads.
    pub fn set_texture_sink(&mut self, sink: Box<dyn TextureSink>) {
        self.sink = Some(sink);
        self.atlas_texture = None;
    }

    /// Handle of the atlas texture, once created.
    pub fn atlas_texture(&self) -> Option<TextureId> {
        self.atlas_texture
    }

    /// Sets the strategy mapping a requested pixel size to the size glyphs
    /// are rasterized at. Glyphs are scaled to the requested size.
    pub fn set_size_selector(&mut self, selector: impl Fn(u32) -> u32 + 'static) {
        self.size_selector = Box::new(selector);
        self.flush_layout();
    }

    /// Sets language, script and direction from a locale such as `ar-EG`.
    ///
    /// Returns `false` and falls back to the default language when the
    /// locale's language is not in the script table.
    pub fn set_locale(&mut self, locale: &str) -> bool {
        let (info, known) = match ScriptInfo::find(locale) {
            Some(info) => (Some(info), true),
            None => {
                warn!(
                    "unsupported locale `{locale}`, using `{}`",
                    self.default_language
                );
                (ScriptInfo::find(&self.default_language), false)
            }
        };
        let settings = LayoutSettings {
            language: info.map_or_else(|| self.default_language.clone(), |i| i.locale.to_string()),
            script: info.map_or(Script::LATIN, |i| i.script),
            direction: info.map_or(TextLayoutDirection::Ltr, |i| i.direction),
            line_height: self.settings.line_height,
        };
        let changed = settings.language != self.settings.language
            || settings.script != self.settings.script
            || settings.direction != self.settings.direction;
        self.settings = settings;
        if changed {
            self.flush_layout();
        }
        known
    }

    /// Language used for shaping and line breaking.
    pub fn language(&self) -> &str {
        &self.settings.language
    }

    /// Overrides the script, given as an ISO 15924 code such as `Arab`.
    pub fn set_script(&mut self, script: &str) -> Result<(), ParseScriptError> {
        let script: Script = script.parse()?;
        if script != self.settings.script {
            self.settings.script = script;
            self.flush_layout();
        }
        Ok(())
    }

    /// Current script.
    pub fn script(&self) -> Script {
        self.settings.script
    }

    /// Overrides the layout direction. Top to bottom layout is rejected.
    pub fn set_layout_direction(&mut self, direction: TextLayoutDirection) -> bool {
        if direction == TextLayoutDirection::Ttb {
            error!("top to bottom text layout is not supported");
            return false;
        }
        if direction != self.settings.direction {
            self.settings.direction = direction;
            self.flush_layout();
        }
        true
    }

    /// Current layout direction.
    pub fn layout_direction(&self) -> TextLayoutDirection {
        self.settings.direction
    }

    /// Sets the distance between base lines as a multiple of the font size.
    pub fn set_line_height(&mut self, line_height: f32) {
        if line_height.to_bits() != self.settings.line_height.to_bits() {
            self.settings.line_height = line_height;
            self.flush_layout();
        }
    }

    /// Drops every cached buffer and texture.
    pub fn flush_layout(&mut self) {
        self.buffers.clear();
        self.requested.clear();
        self.textures.clear();
    }

    /// Current pass state.
    pub fn state(&self) -> PassState {
        self.state
    }

    /// Number of the current layout pass.
    pub fn pass(&self) -> u32 {
        self.pass
    }

    /// The glyph atlas.
    pub fn glyph_cache(&self) -> &GlyphCache {
        &self.glyph_cache
    }

    /// Number of cached buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Returns a cached buffer without building or touching it.
    pub fn cached_buffer(&self, params: &FontBufferParameters) -> Option<&FontBuffer> {
        self.buffers.get(params)
    }

    /// Starts the layout pass of a frame.
    pub fn start_layout_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1);
        self.requested.clear();
        self.glyph_cache.begin_pass();
        self.state = PassState::Layout;
        debug!("layout pass {}", self.pass);
    }

    /// Uploads the atlas and empties it, so that the string that failed
    /// with [`BufferError::CacheFull`] can be requested again.
    ///
    /// Buffers already returned in this pass are repaired by the next
    /// [`start_render_pass`](Self::start_render_pass).
    pub fn flush_and_update(&mut self) {
        self.glyph_cache.flush();
        self.upload_atlas();
        self.state = PassState::Layout;
        debug!(
            "glyph cache flushed during layout pass {}, revision {}",
            self.pass,
            self.glyph_cache.revision()
        );
    }

    /// Starts the render pass: re-resolves the texture coordinates of every
    /// buffer requested in this layout pass whose glyphs moved, then uploads
    /// the changed part of the atlas.
    pub fn start_render_pass(&mut self) {
        let failed = self.patch_live_buffers();
        if !failed.is_empty() {
            debug!(
                "{} buffers overflowed the atlas while patching, flushing",
                failed.len()
            );
            self.glyph_cache.flush();
            let dropped = self.patch_live_buffers();
            for params in &dropped {
                warn!("dropping buffer that does not fit in the atlas: {params:?}");
                self.buffers.remove(params);
            }
            self.requested.retain(|params| !dropped.contains(params));
        }
        self.upload_atlas();
        self.state = PassState::Render;
        debug!("render pass {}", self.pass);
    }

    /// Patches stale buffers of the current pass in request order,
    /// returning the ones that could not be patched.
    fn patch_live_buffers(&mut self) -> Vec<FontBufferParameters> {
        let mut failed = Vec::new();
        let revision = self.glyph_cache.revision();
        for params in &self.requested {
            let Some(buffer) = self.buffers.get_mut(params) else {
                continue;
            };
            if buffer.pass() != self.pass || buffer.revision() == revision {
                continue;
            }
            let patched = patch_buffer(
                &mut self.glyph_cache,
                &mut self.faces,
                &mut *self.library.encoder,
                buffer,
            );
            if !patched {
                failed.push(*params);
            }
        }
        // Patching may evict rows, but never rows pinned by this pass, so
        // every live buffer is valid for the final revision.
        let revision = self.glyph_cache.revision();
        for buffer in self.buffers.values_mut() {
            if buffer.pass() == self.pass {
                buffer.set_revision(revision);
            }
        }
        failed
    }

    fn upload_atlas(&mut self) {
        let Some(sink) = self.sink.as_deref_mut() else {
            return;
        };
        let (width, height) = (self.glyph_cache.width(), self.glyph_cache.height());
        let region = match self.atlas_texture {
            Some(_) => self.glyph_cache.take_dirty(),
            None => {
                self.atlas_texture = Some(sink.create_texture(width, height));
                self.glyph_cache.take_dirty();
                Some(DirtyRegion {
                    x: 0,
                    y: 0,
                    width,
                    height,
                })
            }
        };
        if let (Some(texture), Some(region)) = (self.atlas_texture, region) {
            sink.upload(texture, self.glyph_cache.pixels(), width, region);
        }
    }

    /// Returns the buffer for `text`, building it if it is not cached or its
    /// glyphs moved in the atlas.
    ///
    /// On [`BufferError::CacheFull`] no buffer is cached; call
    /// [`flush_and_update`](Self::flush_and_update) and retry.
    pub fn get_buffer(
        &mut self,
        text: &str,
        params: &FontBufferParameters,
    ) -> Result<&FontBuffer, BufferError> {
        if self.selection.is_empty() {
            return Err(BufferError::NoFontSelected);
        }
        if !self.buffers.contains_key(params) {
            self.enforce_buffer_limit();
        }
        let first_request = self
            .buffers
            .get(params)
            .is_none_or(|buffer| buffer.pass() != self.pass);
        let revision = self.glyph_cache.revision();
        let mut builder = BufferBuilder {
            faces: &mut self.faces,
            selection: &self.selection,
            glyph_cache: &mut self.glyph_cache,
            breaker: &mut *self.library.breaker,
            encoder: &mut *self.library.encoder,
            settings: &self.settings,
            size_selector: &*self.size_selector,
        };
        let buffer = match self.buffers.entry(*params) {
            Entry::Occupied(entry) if entry.get().revision() == revision => {
                let buffer = entry.into_mut();
                builder.pin(buffer);
                buffer
            }
            Entry::Occupied(mut entry) => {
                let built = builder.build(text, params)?;
                *entry.get_mut() = built;
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(builder.build(text, params)?),
        };
        buffer.set_pass(self.pass);
        if first_request {
            self.requested.push(*params);
        }
        Ok(buffer)
    }

    /// Drops least recently requested buffers not used in this pass until
    /// there is room for one more.
    fn enforce_buffer_limit(&mut self) {
        let Some(limit) = self.max_buffers else {
            return;
        };
        while self.buffers.len() >= limit.max(1) {
            let victim = self
                .buffers
                .iter()
                .filter(|(_, buffer)| buffer.pass() != self.pass)
                .min_by_key(|(_, buffer)| buffer.pass())
                .map(|(params, _)| *params);
            let Some(victim) = victim else {
                break;
            };
            self.buffers.remove(&victim);
        }
    }

    /// Returns a standalone bitmap of the first line of `text` at
    /// `font_size` pixels, rendering it if it is not cached.
    pub fn get_texture(&mut self, text: &str, font_size: f32) -> Result<&FontTexture, BufferError> {
        if self.selection.is_empty() {
            return Err(BufferError::NoFontSelected);
        }
        let params = self.buffer_parameters(
            text,
            font_size,
            [0, 0],
            TextAlignment::Left,
            GlyphFlags::NONE,
            false,
        );
        let texture = match self.textures.entry(params) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut builder = BufferBuilder {
                    faces: &mut self.faces,
                    selection: &self.selection,
                    glyph_cache: &mut self.glyph_cache,
                    breaker: &mut *self.library.breaker,
                    encoder: &mut *self.library.encoder,
                    settings: &self.settings,
                    size_selector: &*self.size_selector,
                };
                let mut texture = builder.render(text, font_size)?;
                if let Some(sink) = self.sink.as_deref_mut() {
                    let id = sink.create_texture(texture.width(), texture.height());
                    sink.upload(
                        id,
                        texture.pixels(),
                        texture.width(),
                        DirtyRegion {
                            x: 0,
                            y: 0,
                            width: texture.width(),
                            height: texture.height(),
                        },
                    );
                    texture.set_texture(id);
                }
                entry.insert(texture)
            }
        };
        Ok(texture)
    }
}

impl fmt::Debug for FontManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontManager")
            .field("faces", &self.face_ids)
            .field("selection", &self.selection)
            .field("glyph_cache", &self.glyph_cache)
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("pass", &self.pass)
            .finish_non_exhaustive()
    }
}

fn rasterize_glyph(
    face: &mut dyn FontFace,
    encoder: &mut dyn DistanceFieldEncoder,
    key: GlyphKey,
) -> Option<RasterGlyph> {
    let (_, glyph_id) = split_glyph_code(key.code_point);
    let mut glyph = face.rasterize(glyph_id, key.pixel_size)?;
    if key.flags.is_sdf() {
        glyph.bitmap = encoder.encode(&glyph.bitmap, key.flags);
    }
    Some(glyph)
}

/// Re-resolves the texture coordinates of every glyph of `buffer`.
fn patch_buffer(
    cache: &mut GlyphCache,
    faces: &mut [Option<OpenFace>],
    encoder: &mut dyn DistanceFieldEncoder,
    buffer: &mut FontBuffer,
) -> bool {
    for index in 0..buffer.glyph_count() {
        let key = GlyphKey::new(
            buffer.code_points()[index],
            buffer.pixel_size(),
            buffer.glyph_flags(),
        );
        let lookup = cache.lookup_or_create(key, || {
            let (face_id, _) = split_glyph_code(key.code_point);
            let open = faces.get_mut(usize::from(face_id))?.as_mut()?;
            rasterize_glyph(open.face.as_mut(), &mut *encoder, key)
        });
        match lookup {
            GlyphLookup::Found(entry) => buffer.update_uv(index, entry.uv),
            GlyphLookup::NotFound | GlyphLookup::CacheFull => return false,
        }
    }
    true
}

/// The selected faces in priority order.
fn selected_faces<'a>(faces: &'a mut [Option<OpenFace>], selection: &[u16]) -> Vec<FaceRef<'a>> {
    let mut selected: Vec<(usize, FaceRef<'a>)> = faces
        .iter_mut()
        .enumerate()
        .filter_map(|(index, slot)| {
            let id = u16::try_from(index).ok()?;
            let priority = selection.iter().position(|&s| s == id)?;
            let open = slot.as_mut()?;
            Some((
                priority,
                FaceRef {
                    id,
                    face: open.face.as_mut(),
                },
            ))
        })
        .collect();
    selected.sort_by_key(|(priority, _)| *priority);
    selected.into_iter().map(|(_, face)| face).collect()
}

fn round_to_i32(value: f32) -> i32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "layout values are far below i32::MAX"
    )]
    let rounded = value.round() as i32;
    rounded
}

fn to_pixels(units: i32) -> f32 {
    units as f32 / UNIT_SCALE as f32
}

/// A glyph of a laid out string, resolved against the atlas.
struct PlacedGlyph {
    code: u32,
    line: usize,
    /// Left edge of the glyph's cluster, layout units.
    cluster_x: i32,
    /// Pen position, layout units.
    pen_x: i32,
    /// Vertical offset, layout units, positive up.
    y_offset: i32,
    entry: GlyphCacheEntry,
}

/// Borrows the parts of a [`FontManager`] needed to build buffers, leaving
/// the buffer tables free to be updated.
struct BufferBuilder<'a> {
    faces: &'a mut Vec<Option<OpenFace>>,
    selection: &'a [u16],
    glyph_cache: &'a mut GlyphCache,
    breaker: &'a mut dyn LineBreaker,
    encoder: &'a mut dyn DistanceFieldEncoder,
    settings: &'a LayoutSettings,
    size_selector: &'a dyn Fn(u32) -> u32,
}

impl BufferBuilder<'_> {
    /// Marks the rows of every glyph of `buffer` as used in this pass.
    fn pin(&mut self, buffer: &FontBuffer) {
        for &code in buffer.code_points() {
            self.glyph_cache.touch(&GlyphKey::new(
                code,
                buffer.pixel_size(),
                buffer.glyph_flags(),
            ));
        }
    }

    fn layout(
        &mut self,
        text: &str,
        pixel_size: u32,
        scale: f32,
        wrap_width: Option<i32>,
    ) -> Result<(TextRun, FontMetrics), BufferError> {
        let mut faces = selected_faces(self.faces, self.selection);
        let Some(primary) = faces.first() else {
            return Err(BufferError::NoFontSelected);
        };
        let face_metrics = primary.face.metrics(pixel_size);
        let request = ShapeRequest {
            pixel_size,
            script: self.settings.script,
            language: &self.settings.language,
            direction: self.settings.direction,
        };
        let run = layout_text(text, &mut faces, self.breaker, &request, scale, wrap_width);
        let ascender = round_to_i32(face_metrics.ascender as f32 * scale).max(0);
        let descender = round_to_i32(face_metrics.descender as f32 * scale).min(0);
        let metrics = FontMetrics::new(ascender, 0, ascender, descender, 0);
        Ok((run, metrics))
    }

    /// Resolves every glyph of `run` against the atlas, in visual order.
    fn place(
        &mut self,
        run: &TextRun,
        pixel_size: u32,
        flags: GlyphFlags,
    ) -> Result<Vec<PlacedGlyph>, BufferError> {
        let mut faces = selected_faces(self.faces, self.selection);
        let encoder = &mut *self.encoder;
        let mut placed = Vec::new();
        for (line_index, line) in run.lines.iter().enumerate() {
            for cluster in &line.clusters {
                for glyph in &cluster.glyphs {
                    let key = GlyphKey::new(glyph.code, pixel_size, flags);
                    let lookup = self.glyph_cache.lookup_or_create(key, || {
                        let (face_id, _) = split_glyph_code(key.code_point);
                        let face = faces.iter_mut().find(|face| face.id == face_id)?;
                        rasterize_glyph(&mut *face.face, &mut *encoder, key)
                    });
                    let entry = match lookup {
                        GlyphLookup::Found(entry) => entry,
                        GlyphLookup::NotFound => continue,
                        GlyphLookup::CacheFull => return Err(BufferError::CacheFull),
                    };
                    if entry.is_empty() {
                        continue;
                    }
                    placed.push(PlacedGlyph {
                        code: glyph.code,
                        line: line_index,
                        cluster_x: cluster.x,
                        pen_x: cluster.x + glyph.x,
                        y_offset: glyph.y,
                        entry,
                    });
                }
            }
        }
        Ok(placed)
    }

    fn build(
        &mut self,
        text: &str,
        params: &FontBufferParameters,
    ) -> Result<FontBuffer, BufferError> {
        let font_size = params.font_size();
        let requested = u32::try_from(round_to_i32(font_size).max(1)).unwrap_or(1);
        let pixel_size = (self.size_selector)(requested).max(1);
        let scale = font_size / pixel_size as f32;
        let wrap_width = params
            .multi_line()
            .then(|| params.size()[0] * UNIT_SCALE);

        let (run, mut metrics) = self.layout(text, pixel_size, scale, wrap_width)?;
        let placed = self.place(&run, pixel_size, params.glyph_flags())?;

        for glyph in &placed {
            let top = round_to_i32(f32::from(glyph.entry.bearing_y) * scale)
                + glyph.y_offset / UNIT_SCALE;
            let bottom = top - round_to_i32(f32::from(glyph.entry.height) * scale);
            metrics.grow_to_include(top, bottom);
        }

        let line_advance = font_size * self.settings.line_height;
        let base_line = |line: usize| metrics.base_line() as f32 + line as f32 * line_advance;
        let rtl = self.settings.direction.is_rtl();

        let mut buffer = FontBuffer::new(pixel_size, params.glyph_flags(), params.caret_info());
        *buffer.metrics_mut() = metrics;
        let mut glyphs = placed.iter().peekable();
        for (index, line) in run.lines.iter().enumerate() {
            let y = base_line(index);
            for &caret in &line.carets {
                buffer.add_caret_position([to_pixels(caret), y]);
            }
            if index + 1 == run.lines.len() {
                buffer.add_caret_position([to_pixels(run.end_caret), y]);
            }
            let mut words = line.word_starts.iter().copied().peekable();
            while let Some(glyph) = glyphs.next_if(|glyph| glyph.line == index) {
                while let Some(start) = words.next_if(|&start| start <= glyph.cluster_x) {
                    buffer.add_word_boundary(start);
                }
                let entry = &glyph.entry;
                let origin = [
                    to_pixels(glyph.pen_x) + f32::from(entry.bearing_x) * scale,
                    y - f32::from(entry.bearing_y) * scale - to_pixels(glyph.y_offset),
                ];
                let size = [
                    f32::from(entry.width) * scale,
                    f32::from(entry.height) * scale,
                ];
                buffer.add_glyph(glyph.code, entry, origin, size)?;
            }
            for start in words {
                buffer.add_word_boundary(start);
            }
            buffer.finish_line(line.width, line.paragraph_end);
        }

        // Left and center aligned text is aligned within its widest line.
        let available = match params.line_length() {
            0 => run.max_width(),
            length => length,
        };
        for index in 0..run.lines.len() {
            buffer.update_line(index, params.alignment(), rtl, available);
        }
        let lines = run.lines.len().max(1);
        buffer.set_size([
            to_pixels(available),
            metrics.total() as f32 + (lines - 1) as f32 * line_advance,
        ]);
        buffer.verify();
        buffer.set_revision(self.glyph_cache.revision());
        Ok(buffer)
    }

    /// Renders the first line of `text` into a standalone bitmap.
    fn render(&mut self, text: &str, font_size: f32) -> Result<FontTexture, BufferError> {
        let pixel_size = u32::try_from(round_to_i32(font_size).max(1)).unwrap_or(1);
        let (run, metrics) = self.layout(text, pixel_size, 1.0, None)?;
        let Some(line) = run.lines.first() else {
            return Ok(FontTexture::new(0, metrics));
        };

        let mut faces = selected_faces(self.faces, self.selection);
        let mut glyphs = Vec::new();
        let mut right = to_pixels(line.width).ceil();
        for cluster in &line.clusters {
            for glyph in &cluster.glyphs {
                let (face_id, glyph_id) = split_glyph_code(glyph.code);
                let Some(face) = faces.iter_mut().find(|face| face.id == face_id) else {
                    continue;
                };
                let Some(raster) = face.face.rasterize(glyph_id, pixel_size) else {
                    continue;
                };
                let pen_x = (cluster.x + glyph.x) / UNIT_SCALE;
                right = right.max((pen_x + raster.bitmap.left) as f32 + raster.bitmap.width as f32);
                glyphs.push((raster.bitmap, pen_x, glyph.y / UNIT_SCALE));
            }
        }

        let width = u32::try_from(round_to_i32(right).max(0)).unwrap_or(0);
        let mut texture = FontTexture::new(width, metrics);
        for (bitmap, pen_x, y_offset) in &glyphs {
            texture.draw_glyph(bitmap, *pen_x, *y_offset);
        }
        Ok(texture)
    }
}
