// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text layout: shaping, line breaking, line packing and caret placement.
//!
//! Layout works in 26.6 fixed point units at the requested font size.
//! Lines are produced in visual order with their own pen origin at zero;
//! alignment is applied later, once the widest line is known.

mod alignment;
mod breaker;
mod script;
mod shaping;

use alloc::vec::Vec;
use core::ops::Range;
use smallvec::SmallVec;

pub use alignment::TextAlignment;
#[cfg(feature = "icu")]
pub use breaker::IcuLineBreaker;
pub use breaker::{LineBreaker, SimpleLineBreaker};
pub use script::{
    ParseScriptError, SCRIPT_TABLE, Script, ScriptInfo, TextLayoutDirection, language_of,
};

pub(crate) use alignment::place_line;
pub(crate) use shaping::FaceRef;
use shaping::{ClusterGlyph, ShapedCluster, shape_text};

use crate::font::ShapeRequest;
use breaker::is_mandatory_break;

/// Fixed point scale of layout units.
pub const UNIT_SCALE: i32 = 64;

/// A cluster placed on a line.
#[derive(Clone, Debug)]
pub(crate) struct LineCluster {
    /// Left edge of the cluster, relative to the line origin.
    pub(crate) x: i32,
    pub(crate) glyphs: SmallVec<[ClusterGlyph; 2]>,
}

/// A laid out line.
#[derive(Clone, Debug, Default)]
pub(crate) struct RunLine {
    /// Visible clusters in visual (left to right) order.
    pub(crate) clusters: Vec<LineCluster>,
    /// Caret x positions, one per character of the line in logical order.
    pub(crate) carets: Vec<i32>,
    /// Width without trailing whitespace.
    pub(crate) width: i32,
    /// Left edges of every word except the leftmost one, ascending.
    pub(crate) word_starts: Vec<i32>,
    /// Whether this is the last line of a paragraph.
    pub(crate) paragraph_end: bool,
}

/// The result of laying out a string.
#[derive(Clone, Debug, Default)]
pub(crate) struct TextRun {
    pub(crate) lines: Vec<RunLine>,
    /// Caret after the last character, on the last line.
    pub(crate) end_caret: i32,
}

impl TextRun {
    /// Width of the widest line.
    pub(crate) fn max_width(&self) -> i32 {
        self.lines.iter().map(|line| line.width).max().unwrap_or(0)
    }
}

/// A break opportunity grouping clusters.
#[derive(Debug)]
struct Segment {
    clusters: Range<usize>,
    /// Advance of everything in the segment.
    total: i32,
    /// Advance without trailing whitespace.
    visible: i32,
    mandatory: bool,
}

fn segments(text: &str, clusters: &[ShapedCluster], breaks: &[usize]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut first = 0;
    let mut boundaries = breaks.iter().copied().filter(|&b| b > 0 && b < text.len());
    while first < clusters.len() {
        let limit = boundaries.next().unwrap_or(text.len());
        let mut end = first;
        while end < clusters.len() && clusters[end].range.start < limit {
            end += 1;
        }
        if end == first {
            continue;
        }
        let members = &clusters[first..end];
        let total = members.iter().map(|c| c.advance).sum();
        let trailing: i32 = members
            .iter()
            .rev()
            .take_while(|c| c.whitespace)
            .map(|c| c.advance)
            .sum();
        let mandatory = text[members[0].range.start..members[members.len() - 1].range.end]
            .chars()
            .next_back()
            .is_some_and(is_mandatory_break);
        segments.push(Segment {
            clusters: first..end,
            total,
            visible: total - trailing,
            mandatory,
        });
        first = end;
    }
    segments
}

/// Lays out `text`.
///
/// `wrap_width` enables greedy wrapping at that width in layout units.
pub(crate) fn layout_text(
    text: &str,
    faces: &mut [FaceRef<'_>],
    breaker: &mut dyn LineBreaker,
    request: &ShapeRequest<'_>,
    scale: f32,
    wrap_width: Option<i32>,
) -> TextRun {
    let clusters = shape_text(text, faces, request, scale);
    let breaks = breaker.find_breaks(text, request.language);
    let segments = segments(text, &clusters, &breaks);
    let rtl = request.direction.is_rtl();

    let mut run = TextRun::default();
    let mut line_segments: Range<usize> = 0..0;
    let mut line_total = 0;
    for (index, segment) in segments.iter().enumerate() {
        let overflows = wrap_width
            .is_some_and(|wrap| !line_segments.is_empty() && line_total + segment.visible > wrap);
        if overflows {
            run.lines
                .push(build_line(&clusters, &segments[line_segments.clone()], rtl, false));
            line_segments = index..index;
            line_total = 0;
        }
        line_segments.end = index + 1;
        line_total += segment.total;
        if segment.mandatory {
            run.lines
                .push(build_line(&clusters, &segments[line_segments.clone()], rtl, true));
            line_segments = index + 1..index + 1;
            line_total = 0;
        }
    }
    if !line_segments.is_empty() || run.lines.last().is_none_or(|line| line.paragraph_end) {
        run.lines
            .push(build_line(&clusters, &segments[line_segments], rtl, true));
    }
    if let Some(last) = run.lines.last() {
        run.end_caret = if rtl { 0 } else { last.width };
    }
    run
}

fn build_line(
    clusters: &[ShapedCluster],
    segments: &[Segment],
    rtl: bool,
    paragraph_end: bool,
) -> RunLine {
    let range = match (segments.first(), segments.last()) {
        (Some(first), Some(last)) => first.clusters.start..last.clusters.end,
        _ => {
            return RunLine {
                paragraph_end,
                ..RunLine::default()
            };
        }
    };
    let members = &clusters[range.clone()];
    let visible = members
        .iter()
        .rposition(|c| !c.whitespace)
        .map_or(0, |i| i + 1);
    let width: i32 = members[..visible].iter().map(|c| c.advance).sum();

    // Left edge of each visible cluster, indexed logically.
    let mut edges = Vec::with_capacity(visible);
    let mut pen = if rtl { width } else { 0 };
    for cluster in &members[..visible] {
        if rtl {
            pen -= cluster.advance;
            edges.push(pen);
        } else {
            edges.push(pen);
            pen += cluster.advance;
        }
    }

    let mut line = RunLine {
        width,
        paragraph_end,
        ..RunLine::default()
    };
    let mut order: Vec<usize> = (0..visible).collect();
    if rtl {
        order.reverse();
    }
    line.clusters = order
        .iter()
        .map(|&i| LineCluster {
            x: edges[i],
            glyphs: members[i].glyphs.clone(),
        })
        .collect();

    for (i, cluster) in members.iter().enumerate() {
        let chars = i32::try_from(cluster.chars).unwrap_or(i32::MAX).max(1);
        for k in 0..chars {
            let x = match edges.get(i) {
                Some(&left) if rtl => left + cluster.advance - cluster.advance * k / chars,
                Some(&left) => left + cluster.advance * k / chars,
                None if rtl => 0,
                None => width,
            };
            line.carets.push(x);
        }
    }

    for segment in segments {
        let start = segment.clusters.start - range.start;
        let end = (segment.clusters.end - range.start).min(visible);
        if let Some(left) = edges.get(start..end).and_then(|e| e.iter().min()) {
            line.word_starts.push(*left);
        }
    }
    line.word_starts.sort_unstable();
    if !line.word_starts.is_empty() {
        line.word_starts.remove(0);
    }
    line
}
