// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Distance field encoding of glyph coverage bitmaps.
//!
//! Distances are exact Euclidean distances computed with the separable
//! lower-envelope transform of Felzenszwalb and Huttenlocher, run once over
//! columns and once over rows.

use alloc::vec::Vec;

use crate::atlas::{GlyphBitmap, GlyphFlags};

/// Pixels of padding added on every side of an encoded glyph.
pub const SDF_PADDING: u32 = 4;

/// Distance in pixels over which the encoded value ramps from 255 to 0.
pub const SDF_SPREAD: f64 = 4.0;

/// Coverage at or above this value counts as inside the outline.
const INSIDE_THRESHOLD: u8 = 128;

/// Stand-in for an infinite squared distance that stays finite in sums.
const FAR: f64 = 1e20;

/// Turns a coverage bitmap into a distance encoded one.
pub trait DistanceFieldEncoder {
    /// Encodes `bitmap` according to the SDF bits of `flags`.
    ///
    /// The result may be larger than the input; its bearings are adjusted so
    /// the outline stays at the same place relative to the pen.
    fn encode(&mut self, bitmap: &GlyphBitmap, flags: GlyphFlags) -> GlyphBitmap;
}

/// Exact Euclidean distance transform with reusable scratch buffers.
#[derive(Debug, Default)]
pub struct DistanceComputer {
    inside: Vec<bool>,
    grid: Vec<f64>,
    outer: Vec<f64>,
    f: Vec<f64>,
    d: Vec<f64>,
    v: Vec<usize>,
    z: Vec<f64>,
}

impl DistanceComputer {
    /// Creates a computer with empty scratch buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills `self.grid` with squared distances from every pixel to the
    /// nearest pixel whose `inside` value equals `feature`.
    fn squared_distances(&mut self, width: usize, height: usize, feature: bool) {
        self.grid.clear();
        self.grid.extend(
            self.inside
                .iter()
                .map(|&inside| if inside == feature { 0.0 } else { FAR }),
        );
        let n = width.max(height);
        self.f.resize(n, 0.0);
        self.d.resize(n, 0.0);
        self.v.resize(n, 0);
        self.z.resize(n + 1, 0.0);

        for x in 0..width {
            for y in 0..height {
                self.f[y] = self.grid[y * width + x];
            }
            lower_envelope(
                &self.f[..height],
                &mut self.d[..height],
                &mut self.v,
                &mut self.z,
            );
            for y in 0..height {
                self.grid[y * width + x] = self.d[y];
            }
        }
        for y in 0..height {
            let row = &mut self.grid[y * width..(y + 1) * width];
            self.f[..width].copy_from_slice(row);
            lower_envelope(&self.f[..width], row, &mut self.v, &mut self.z);
        }
    }
}

impl DistanceFieldEncoder for DistanceComputer {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "values are clamped to 0..=255 before the cast"
    )]
    fn encode(&mut self, bitmap: &GlyphBitmap, flags: GlyphFlags) -> GlyphBitmap {
        if !flags.is_sdf() || bitmap.is_empty() {
            return bitmap.clone();
        }
        let pad = SDF_PADDING as usize;
        let src_w = bitmap.width as usize;
        let width = src_w + pad * 2;
        let height = bitmap.height as usize + pad * 2;

        self.inside.clear();
        self.inside.resize(width * height, false);
        for (y, line) in bitmap.pixels.chunks_exact(src_w).enumerate() {
            let start = (y + pad) * width + pad;
            for (dst, &coverage) in self.inside[start..start + src_w].iter_mut().zip(line) {
                *dst = coverage >= INSIDE_THRESHOLD;
            }
        }

        let outer = flags.contains(GlyphFlags::OUTER_SDF);
        let inner = flags.contains(GlyphFlags::INNER_SDF);
        if outer {
            self.squared_distances(width, height, true);
            core::mem::swap(&mut self.outer, &mut self.grid);
        }
        if inner {
            self.squared_distances(width, height, false);
        }

        let ramp = |distance: f64| (255.0 * distance / SDF_SPREAD).clamp(0.0, 255.0);
        let pixels = (0..width * height)
            .map(|i| {
                let value = match (outer, inner) {
                    (true, true) => {
                        let signed = self.grid[i].sqrt() - self.outer[i].sqrt();
                        (127.5 + 127.5 * signed / SDF_SPREAD).clamp(0.0, 255.0)
                    }
                    (true, false) => 255.0 - ramp(self.outer[i].sqrt()),
                    _ => ramp(self.grid[i].sqrt()),
                };
                value.round() as u8
            })
            .collect();

        GlyphBitmap {
            width: width as u32,
            height: height as u32,
            left: bitmap.left - SDF_PADDING as i32,
            top: bitmap.top + SDF_PADDING as i32,
            pixels,
        }
    }
}

/// One dimensional squared distance transform of the sampled function `f`.
///
/// `v` and `z` are scratch buffers of at least `f.len()` and `f.len() + 1`
/// elements.
fn lower_envelope(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let intersect = |q: usize, p: usize| {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        let delta = q as f64 - p as f64;
        *out = delta * delta + f[p];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn block(width: u32, height: u32) -> GlyphBitmap {
        GlyphBitmap {
            width,
            height,
            left: 2,
            top: 10,
            pixels: vec![0xFF; (width * height) as usize],
        }
    }

    #[test]
    fn envelope_matches_brute_force() {
        let f = [FAR, 0.0, FAR, FAR, FAR, 0.0, FAR];
        let mut d = [0.0; 7];
        let mut v = [0; 7];
        let mut z = [0.0; 8];
        lower_envelope(&f, &mut d, &mut v, &mut z);
        assert_eq!(d, [1.0, 0.0, 1.0, 4.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn no_flags_returns_input() {
        let mut computer = DistanceComputer::new();
        let bitmap = block(3, 3);
        assert_eq!(computer.encode(&bitmap, GlyphFlags::NONE), bitmap);
    }

    #[test]
    fn outer_field_decays_away_from_outline() {
        let mut computer = DistanceComputer::new();
        let sdf = computer.encode(&block(2, 2), GlyphFlags::OUTER_SDF);
        assert_eq!((sdf.width, sdf.height), (10, 10));
        assert_eq!((sdf.left, sdf.top), (-2, 14));
        let row = &sdf.pixels[4 * 10..5 * 10];
        // Inside pixels are solid.
        assert_eq!(row[4], 255);
        assert_eq!(row[5], 255);
        // Outside pixels fall off linearly with distance.
        assert_eq!(row[6], 191);
        assert_eq!(row[7], 128);
        assert_eq!(row[8], 64);
        assert_eq!(row[9], 0);
        assert_eq!(row[3], 191);
        assert_eq!(row[0], 0);
    }

    #[test]
    fn inner_field_is_zero_outside() {
        let mut computer = DistanceComputer::new();
        let sdf = computer.encode(&block(6, 6), GlyphFlags::INNER_SDF);
        assert_eq!(sdf.width, 14);
        let row = &sdf.pixels[7 * 14..8 * 14];
        assert_eq!(row[3], 0);
        // One pixel from the edge, then deeper.
        assert_eq!(row[4], 64);
        assert_eq!(row[5], 128);
        assert_eq!(row[6], 191);
    }

    #[test]
    fn scratch_buffers_are_reused() {
        let mut computer = DistanceComputer::new();
        let big = computer.encode(&block(8, 8), GlyphFlags::OUTER_SDF);
        let small = computer.encode(&block(2, 2), GlyphFlags::OUTER_SDF);
        let again = DistanceComputer::new().encode(&block(2, 2), GlyphFlags::OUTER_SDF);
        assert_eq!(big.width, 16);
        assert_eq!(small, again);
    }
}
