// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shaping with font fallback.

use alloc::vec::Vec;
use core::ops::Range;
use smallvec::SmallVec;

use crate::atlas::glyph_code;
use crate::font::{FontFace, ShapeRequest, ShapedGlyph};

/// An opened face together with its registry id.
pub(crate) struct FaceRef<'a> {
    pub(crate) id: u16,
    pub(crate) face: &'a mut dyn FontFace,
}

/// A glyph of a cluster, positioned relative to the cluster's pen position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClusterGlyph {
    /// Face-qualified glyph code.
    pub(crate) code: u32,
    /// Horizontal position relative to the cluster origin, layout units.
    pub(crate) x: i32,
    /// Vertical offset, layout units, positive up.
    pub(crate) y: i32,
}

/// A group of characters shaped together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ShapedCluster {
    /// Byte range in the shaped text.
    pub(crate) range: Range<usize>,
    /// Glyphs to draw; empty for control characters and unsupported text.
    pub(crate) glyphs: SmallVec<[ClusterGlyph; 2]>,
    /// Advance in layout units (26.6 at the requested font size).
    pub(crate) advance: i32,
    /// Every character of the cluster is whitespace.
    pub(crate) whitespace: bool,
    /// Number of characters in the cluster.
    pub(crate) chars: usize,
}

impl ShapedCluster {
    fn empty(text: &str, range: Range<usize>) -> Self {
        let slice = &text[range.clone()];
        Self {
            whitespace: slice.chars().all(char::is_whitespace),
            chars: slice.chars().count(),
            range,
            glyphs: SmallVec::new(),
            advance: 0,
        }
    }
}

/// Shapes `text` with the first face in `faces`, re-shaping the clusters it
/// has no glyph for with the following faces in order. Text that no face
/// supports yields clusters without glyphs.
///
/// `scale` converts shaped units (at `request.pixel_size`) into layout units.
pub(crate) fn shape_text(
    text: &str,
    faces: &mut [FaceRef<'_>],
    request: &ShapeRequest<'_>,
    scale: f32,
) -> Vec<ShapedCluster> {
    let mut clusters = Vec::new();
    shape_range(text, 0..text.len(), faces, request, scale, &mut clusters);
    clusters
}

fn shape_range(
    text: &str,
    range: Range<usize>,
    faces: &mut [FaceRef<'_>],
    request: &ShapeRequest<'_>,
    scale: f32,
    out: &mut Vec<ShapedCluster>,
) {
    if range.is_empty() {
        return;
    }
    let Some((first, rest)) = faces.split_first_mut() else {
        for (offset, c) in text[range.clone()].char_indices() {
            let start = range.start + offset;
            out.push(ShapedCluster::empty(text, start..start + c.len_utf8()));
        }
        return;
    };

    let slice = &text[range.clone()];
    let glyphs = first.face.shape(slice, request);
    let mut missing: Option<Range<usize>> = None;
    let mut flush_missing = |missing: &mut Option<Range<usize>>, out: &mut Vec<ShapedCluster>| {
        if let Some(pending) = missing.take() {
            shape_range(text, pending, rest, request, scale, out);
        }
    };

    let mut index = 0;
    let mut start = 0;
    while start < slice.len() {
        while glyphs.get(index).is_some_and(|g| g.cluster < start) {
            index += 1;
        }
        let (group, end) = match glyphs.get(index) {
            Some(g) if g.cluster == start => {
                let group_end = glyphs[index..]
                    .iter()
                    .position(|next| next.cluster != g.cluster)
                    .map_or(glyphs.len(), |n| index + n);
                let end = glyphs.get(group_end).map_or(slice.len(), |next| next.cluster);
                let group = &glyphs[index..group_end];
                index = group_end;
                (group, end.min(slice.len()))
            }
            // Characters the face produced no glyph for at all.
            Some(g) => (&glyphs[..0], g.cluster.min(slice.len())),
            None => (&glyphs[..0], slice.len()),
        };
        let cluster_range = range.start + start..range.start + end;
        let chars = &text[cluster_range.clone()];

        if chars.chars().all(char::is_control) {
            flush_missing(&mut missing, out);
            out.push(ShapedCluster::empty(text, cluster_range));
        } else if group.is_empty() || group.iter().any(|g| g.glyph_id == 0) {
            missing = Some(match missing {
                Some(pending) => pending.start..cluster_range.end,
                None => cluster_range,
            });
        } else {
            flush_missing(&mut missing, out);
            out.push(place_cluster(text, cluster_range, group, first.id, scale));
        }
        start = end;
    }
    flush_missing(&mut missing, out);
}

fn to_layout(value: i32, scale: f32) -> i32 {
    if scale == 1.0 {
        value
    } else {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "scaled 26.6 values stay far below i32::MAX"
        )]
        let scaled = (value as f32 * scale).round() as i32;
        scaled
    }
}

fn place_cluster(
    text: &str,
    range: Range<usize>,
    group: &[ShapedGlyph],
    face_id: u16,
    scale: f32,
) -> ShapedCluster {
    let mut cluster = ShapedCluster::empty(text, range);
    let mut pen = 0;
    for glyph in group {
        cluster.glyphs.push(ClusterGlyph {
            code: glyph_code(face_id, glyph.glyph_id),
            x: pen + to_layout(glyph.x_offset, scale),
            y: to_layout(glyph.y_offset, scale),
        });
        pen += to_layout(glyph.x_advance, scale);
    }
    cluster.advance = pen;
    cluster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Script, TextLayoutDirection};
    use crate::testing::BoxFace;
    use alloc::vec;

    fn request() -> ShapeRequest<'static> {
        ShapeRequest {
            pixel_size: 16,
            script: Script::LATIN,
            language: "en",
            direction: TextLayoutDirection::Ltr,
        }
    }

    #[test]
    fn clusters_partition_the_text() {
        let mut face = BoxFace::latin();
        let mut faces = [FaceRef {
            id: 1,
            face: &mut face,
        }];
        let clusters = shape_text("fix it", &mut faces, &request(), 1.0);
        let ranges: Vec<_> = clusters.iter().map(|c| c.range.clone()).collect();
        // "fi" is a ligature.
        assert_eq!(ranges, vec![0..2, 2..3, 3..4, 4..5, 5..6]);
        assert_eq!(clusters[0].chars, 2);
        assert_eq!(clusters[0].glyphs.len(), 1);
        assert!(clusters[2].whitespace);
    }

    #[test]
    fn missing_glyphs_fall_back_in_order() {
        let mut latin = BoxFace::latin();
        let mut arabic = BoxFace::arabic();
        let mut faces = [
            FaceRef {
                id: 1,
                face: &mut latin,
            },
            FaceRef {
                id: 2,
                face: &mut arabic,
            },
        ];
        let clusters = shape_text("aب€", &mut faces, &request(), 1.0);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].glyphs[0].code >> 16, 1);
        assert_eq!(clusters[1].glyphs[0].code >> 16, 2);
        // No face has the euro sign: the cluster stays, without glyphs.
        assert!(clusters[2].glyphs.is_empty());
        assert_eq!(clusters[2].range, 3..6);
        assert_eq!(clusters[2].advance, 0);
    }

    #[test]
    fn control_characters_have_no_glyphs() {
        let mut face = BoxFace::latin();
        let mut faces = [FaceRef {
            id: 1,
            face: &mut face,
        }];
        let clusters = shape_text("a\nb", &mut faces, &request(), 1.0);
        assert_eq!(clusters.len(), 3);
        assert!(clusters[1].glyphs.is_empty());
        assert!(clusters[1].whitespace);
    }

    #[test]
    fn advances_are_scaled() {
        let mut face = BoxFace::latin();
        let mut faces = [FaceRef {
            id: 1,
            face: &mut face,
        }];
        let full = shape_text("a", &mut faces, &request(), 1.0);
        let half = shape_text("a", &mut faces, &request(), 0.5);
        assert_eq!(half[0].advance * 2, full[0].advance);
    }
}
