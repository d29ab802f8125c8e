// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shelf allocation for the glyph atlas.
//!
//! The atlas is divided into full-width horizontal rows stacked from the top.
//! Rows always tile `0..fill` without gaps, so neighbouring rows can be merged
//! by replacing them with a single row spanning the same range.

use alloc::vec::Vec;

use super::key::GlyphKey;

/// Row heights are rounded up to a multiple of this value so that glyphs of
/// similar size share rows.
pub(crate) const ROW_GRANULARITY: u32 = 4;

#[derive(Debug)]
pub(crate) struct Row {
    pub(crate) y: u32,
    pub(crate) height: u32,
    pub(crate) used_width: u32,
    /// Pass in which a glyph of this row was last requested.
    pub(crate) last_used: u32,
    pub(crate) glyphs: Vec<GlyphKey>,
}

impl Row {
    fn new(y: u32, height: u32, pass: u32) -> Self {
        Self {
            y,
            height,
            used_width: 0,
            last_used: pass,
            glyphs: Vec::new(),
        }
    }
}

/// Rows that can be reclaimed to make room for a glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Eviction {
    /// Clear a single row.
    Single(usize),
    /// Merge `start..end` into one row, borrowing `extra` pixels of unused
    /// space below the fill cursor.
    Merge { start: usize, end: usize, extra: u32 },
}

#[derive(Debug)]
pub(crate) struct RowAllocator {
    width: u32,
    height: u32,
    rows: Vec<Row>,
    /// First y not covered by any row.
    fill: u32,
}

impl RowAllocator {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rows: Vec::new(),
            fill: 0,
        }
    }

    pub(crate) fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn fill(&self) -> u32 {
        self.fill
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
        self.fill = 0;
    }

    pub(crate) fn row_index(&self, y: u32) -> Option<usize> {
        self.rows.binary_search_by_key(&y, |row| row.y).ok()
    }

    pub(crate) fn touch(&mut self, index: usize, pass: u32) {
        self.rows[index].last_used = pass;
    }

    /// Finds room for a `w` x `h` rectangle without evicting anything,
    /// opening a new row if needed.
    pub(crate) fn find_space(&mut self, w: u32, h: u32, pass: u32) -> Option<usize> {
        let tolerance = h / 4 + ROW_GRANULARITY;
        if let Some(index) = self.best_fit(w, h, Some(h + tolerance)) {
            return Some(index);
        }
        if let Some(index) = self.open_row(h, pass) {
            return Some(index);
        }
        self.best_fit(w, h, None)
    }

    /// Smallest row that is at least `h` tall (and at most `max_h`) with `w`
    /// pixels left. Ties go to the lowest row.
    fn best_fit(&self, w: u32, h: u32, max_h: Option<u32>) -> Option<usize> {
        let max_h = max_h.unwrap_or(u32::MAX);
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                row.height >= h && row.height <= max_h && self.width - row.used_width >= w
            })
            .min_by_key(|(_, row)| (row.height, row.y))
            .map(|(index, _)| index)
    }

    fn open_row(&mut self, h: u32, pass: u32) -> Option<usize> {
        let free = self.height - self.fill;
        if free < h {
            return None;
        }
        let height = h.next_multiple_of(ROW_GRANULARITY).min(free);
        self.rows.push(Row::new(self.fill, height, pass));
        self.fill += height;
        Some(self.rows.len() - 1)
    }

    /// Picks rows to reclaim for a glyph `h` pixels tall.
    ///
    /// Rows used during `pass` are never candidates. A single row is
    /// preferred; otherwise the least recently used run of adjacent rows is
    /// merged. Ties go to the lowest row.
    pub(crate) fn eviction_candidate(&self, h: u32, pass: u32) -> Option<Eviction> {
        let single = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.last_used != pass && row.height >= h)
            .min_by_key(|(_, row)| (row.last_used, row.y))
            .map(|(index, _)| Eviction::Single(index));
        if single.is_some() {
            return single;
        }

        let free = self.height - self.fill;
        let mut best: Option<((u32, u32), Eviction)> = None;
        for start in 0..self.rows.len() {
            let mut total = 0;
            let mut newest = 0;
            let mut end = start;
            while end < self.rows.len() && total < h {
                let row = &self.rows[end];
                if row.last_used == pass {
                    break;
                }
                total += row.height;
                newest = newest.max(row.last_used);
                end += 1;
            }
            let candidate = if total >= h {
                Eviction::Merge {
                    start,
                    end,
                    extra: 0,
                }
            } else if end == self.rows.len() && end > start && total + free >= h {
                let extra = (h - total).next_multiple_of(ROW_GRANULARITY).min(free);
                Eviction::Merge { start, end, extra }
            } else {
                continue;
            };
            let score = (newest, self.rows[start].y);
            if best.is_none_or(|(best_score, _)| score < best_score) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, eviction)| eviction)
    }

    /// Reclaims the rows named by `eviction`, returning the index of the
    /// resulting empty row. The keys of every dropped glyph are appended to
    /// `evicted`.
    pub(crate) fn evict(
        &mut self,
        eviction: Eviction,
        pass: u32,
        evicted: &mut Vec<GlyphKey>,
    ) -> usize {
        match eviction {
            Eviction::Single(index) => {
                let row = &mut self.rows[index];
                evicted.append(&mut row.glyphs);
                row.used_width = 0;
                row.last_used = pass;
                index
            }
            Eviction::Merge { start, end, extra } => {
                let y = self.rows[start].y;
                let mut height = extra;
                for row in self.rows.drain(start..end) {
                    height += row.height;
                    evicted.extend(row.glyphs);
                }
                self.rows.insert(start, Row::new(y, height, pass));
                self.fill += extra;
                start
            }
        }
    }

    /// Reserves `w` pixels at the end of row `index` and returns the top-left
    /// corner of the reservation.
    pub(crate) fn allocate(&mut self, index: usize, w: u32, key: GlyphKey, pass: u32) -> (u32, u32) {
        let row = &mut self.rows[index];
        debug_assert!(
            self.width - row.used_width >= w,
            "row {index} has no room for {w} pixels"
        );
        let x = row.used_width;
        row.used_width += w;
        row.last_used = pass;
        row.glyphs.push(key);
        (x, row.y)
    }
}
