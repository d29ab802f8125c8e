// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph bitmap cache with atlas storage and row based LRU eviction.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};
use hashbrown::HashMap;
use log::{debug, warn};

use super::key::GlyphKey;
use super::region::{DirtyRegion, GlyphCacheEntry, RasterGlyph};
use super::row::RowAllocator;

/// Padding in pixels added to each side of a glyph to prevent texture bleeding.
pub const GLYPH_PADDING: u32 = 1;

/// Largest supported atlas edge, so that positions fit in `u16`.
pub const MAX_ATLAS_SIZE: u32 = 1 << 15;

/// Result of a glyph cache lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GlyphLookup {
    /// The glyph is resident in the atlas.
    Found(GlyphCacheEntry),
    /// The face has no such glyph.
    NotFound,
    /// The glyph could not be placed even after evicting every row not used
    /// in the current pass. Flush the cache and retry.
    CacheFull,
}

impl GlyphLookup {
    /// Returns the entry if the glyph was found.
    #[inline]
    pub fn entry(self) -> Option<GlyphCacheEntry> {
        match self {
            Self::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct CachedGlyph {
    entry: GlyphCacheEntry,
    /// Top of the owning row; `None` for glyphs without pixels.
    row_y: Option<u32>,
}

/// Statistics about the glyph cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphCacheStats {
    /// Number of cached glyphs, including ones without pixels.
    pub glyphs: usize,
    /// Number of atlas rows.
    pub rows: usize,
    /// Height of the atlas covered by rows.
    pub used_height: u32,
    /// Current revision.
    pub revision: u32,
    /// Hits since the last [`GlyphCache::clear_stats`].
    pub cache_hits: u64,
    /// Misses since the last [`GlyphCache::clear_stats`].
    pub cache_misses: u64,
}

/// A fixed-size single channel atlas of rasterized glyphs.
///
/// The cache owns the CPU copy of the atlas pixels; changed areas are
/// reported through [`take_dirty`](Self::take_dirty) so the caller can upload
/// them to the GPU.
///
/// Every eviction and every [`flush`](Self::flush) increments the
/// [`revision`](Self::revision), telling holders of glyph positions that they
/// must re-resolve them.
pub struct GlyphCache {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    entries: HashMap<GlyphKey, CachedGlyph>,
    rows: RowAllocator,
    /// Current pass. Rows used in this pass are pinned.
    pass: u32,
    revision: u32,
    dirty: Option<DirtyRegion>,
    evicted: Vec<GlyphKey>,
    cache_hits: u64,
    cache_misses: u64,
}

impl GlyphCache {
    /// Creates an empty atlas of `width` x `height` pixels.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or larger than [`MAX_ATLAS_SIZE`].
    pub fn new(width: u32, height: u32) -> Self {
        assert!(
            (1..=MAX_ATLAS_SIZE).contains(&width) && (1..=MAX_ATLAS_SIZE).contains(&height),
            "atlas size {width}x{height} out of range"
        );
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            entries: HashMap::new(),
            rows: RowAllocator::new(width, height),
            pass: 1,
            revision: 0,
            dirty: None,
            evicted: Vec::new(),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Width of the atlas in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the atlas in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major atlas pixels.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of evictions and flushes so far.
    #[inline]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// The current pass counter.
    #[inline]
    pub fn pass(&self) -> u32 {
        self.pass
    }

    /// Starts a new pass, unpinning every row.
    pub fn begin_pass(&mut self) {
        self.pass = self.pass.wrapping_add(1);
    }

    /// Looks up a resident glyph and marks its row as used in this pass.
    pub fn get(&mut self, key: &GlyphKey) -> Option<GlyphCacheEntry> {
        match self.touch(key) {
            Some(entry) => {
                self.cache_hits += 1;
                Some(entry)
            }
            None => {
                self.cache_misses += 1;
                None
            }
        }
    }

    /// Like [`get`](Self::get) but does not count towards statistics.
    pub fn touch(&mut self, key: &GlyphKey) -> Option<GlyphCacheEntry> {
        let cached = *self.entries.get(key)?;
        if let Some(index) = cached.row_y.and_then(|y| self.rows.row_index(y)) {
            self.rows.touch(index, self.pass);
        }
        Some(cached.entry)
    }

    /// Looks up a resident glyph without marking its row or counting
    /// statistics.
    pub fn peek(&self, key: &GlyphKey) -> Option<GlyphCacheEntry> {
        self.entries.get(key).map(|cached| cached.entry)
    }

    /// Returns the cached glyph for `key`, rasterizing and placing it with
    /// `rasterize` on a miss.
    pub fn lookup_or_create(
        &mut self,
        key: GlyphKey,
        rasterize: impl FnOnce() -> Option<RasterGlyph>,
    ) -> GlyphLookup {
        if let Some(entry) = self.get(&key) {
            return GlyphLookup::Found(entry);
        }
        match rasterize() {
            Some(glyph) => self.insert(key, &glyph),
            None => GlyphLookup::NotFound,
        }
    }

    /// Places `glyph` in the atlas, evicting rows if needed.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "positions are bounded by MAX_ATLAS_SIZE and bearings are clamped"
    )]
    pub fn insert(&mut self, key: GlyphKey, glyph: &RasterGlyph) -> GlyphLookup {
        let bitmap = &glyph.bitmap;
        let bearing_x = bitmap.left.clamp(i16::MIN.into(), i16::MAX.into()) as i16;
        let bearing_y = bitmap.top.clamp(i16::MIN.into(), i16::MAX.into()) as i16;

        if bitmap.is_empty() {
            let entry = GlyphCacheEntry {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
                bearing_x,
                bearing_y,
                advance: glyph.advance,
                uv: [0.0; 4],
            };
            self.entries.insert(key, CachedGlyph { entry, row_y: None });
            return GlyphLookup::Found(entry);
        }

        let w = bitmap.width + GLYPH_PADDING * 2;
        let h = bitmap.height + GLYPH_PADDING * 2;
        if w > self.width || h > self.height {
            warn!(
                "glyph {:#x} ({}x{}) does not fit in a {}x{} atlas",
                key.code_point, bitmap.width, bitmap.height, self.width, self.height
            );
            return GlyphLookup::CacheFull;
        }

        let index = match self.rows.find_space(w, h, self.pass) {
            Some(index) => index,
            None => {
                let Some(eviction) = self.rows.eviction_candidate(h, self.pass) else {
                    warn!(
                        "glyph cache exhausted: every row is in use by pass {}",
                        self.pass
                    );
                    return GlyphLookup::CacheFull;
                };
                let index = self.rows.evict(eviction, self.pass, &mut self.evicted);
                for evicted in self.evicted.drain(..) {
                    self.entries.remove(&evicted);
                }
                self.revision = self.revision.wrapping_add(1);
                debug!(
                    "evicted {eviction:?} for glyph {:#x}, revision {}",
                    key.code_point, self.revision
                );
                index
            }
        };

        let (x, y) = self.rows.allocate(index, w, key, self.pass);
        self.blit(x, y, w, h, &bitmap.pixels, bitmap.width);

        let gx = x + GLYPH_PADDING;
        let gy = y + GLYPH_PADDING;
        let atlas_w = self.width as f32;
        let atlas_h = self.height as f32;
        let entry = GlyphCacheEntry {
            x: gx as u16,
            y: gy as u16,
            width: bitmap.width as u16,
            height: bitmap.height as u16,
            bearing_x,
            bearing_y,
            advance: glyph.advance,
            uv: [
                gx as f32 / atlas_w,
                gy as f32 / atlas_h,
                (gx + bitmap.width) as f32 / atlas_w,
                (gy + bitmap.height) as f32 / atlas_h,
            ],
        };
        self.entries.insert(key, CachedGlyph {
            entry,
            row_y: Some(y),
        });
        GlyphLookup::Found(entry)
    }

    /// Clears the padded rectangle at `(x, y)` and copies `src` into its
    /// interior.
    fn blit(&mut self, x: u32, y: u32, w: u32, h: u32, src: &[u8], src_width: u32) {
        let stride = self.width as usize;
        for row in y..y + h {
            let start = row as usize * stride + x as usize;
            self.pixels[start..start + w as usize].fill(0);
        }
        let src_width = src_width as usize;
        for (i, line) in src.chunks_exact(src_width).enumerate() {
            let start = (y + GLYPH_PADDING) as usize * stride
                + i * stride
                + (x + GLYPH_PADDING) as usize;
            self.pixels[start..start + src_width].copy_from_slice(line);
        }
        self.mark_dirty(DirtyRegion {
            x,
            y,
            width: w,
            height: h,
        });
    }

    fn mark_dirty(&mut self, region: DirtyRegion) {
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(region),
            None => region,
        });
    }

    /// Returns the area changed since the last call, if any.
    pub fn take_dirty(&mut self) -> Option<DirtyRegion> {
        self.dirty.take()
    }

    /// Drops every glyph and increments the revision.
    pub fn flush(&mut self) {
        self.entries.clear();
        self.rows.clear();
        self.pixels.fill(0);
        self.revision = self.revision.wrapping_add(1);
        self.mark_dirty(DirtyRegion {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        });
        debug!("glyph cache flushed, revision {}", self.revision);
    }

    /// Get the number of cached glyphs.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the number of cache hits since last `clear_stats()`.
    #[inline]
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    /// Get the number of cache misses since last `clear_stats()`.
    #[inline]
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses
    }

    /// Clear cache hit/miss statistics without clearing the cache itself.
    pub fn clear_stats(&mut self) {
        self.cache_hits = 0;
        self.cache_misses = 0;
    }

    /// Get statistics about the cache.
    pub fn stats(&self) -> GlyphCacheStats {
        GlyphCacheStats {
            glyphs: self.entries.len(),
            rows: self.rows.rows().len(),
            used_height: self.rows.fill(),
            revision: self.revision,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
        }
    }
}

impl Debug for GlyphCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glyphs", &self.entries.len())
            .field("rows", &self.rows.rows().len())
            .field("pass", &self.pass)
            .field("revision", &self.revision)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
