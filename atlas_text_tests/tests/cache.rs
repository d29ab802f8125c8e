// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Atlas exhaustion and row eviction as seen through the manager.
//!
//! At 16px every box glyph takes an 8x14 cell with padding, so a 64px atlas
//! holds four 16px rows of eight glyphs.

use atlas_text::{BufferError, TextAlignment};

use crate::test_name;
use crate::util::{TestEnv, assert_uvs_match_atlas};

/// Eight distinct glyphs each, filling exactly one atlas row.
const ROWS: [&str; 5] = ["ABCDEFGH", "IJKLMNOP", "QRSTUVWX", "YZabcdeh", "iklmnors"];

/// Sixty distinct glyphs, more than the atlas holds at once.
const TOO_MANY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789abcdehiklmnorstuvwxz!#$%";

#[test]
fn cache_oversized_glyph_never_fits() {
    let mut env = TestEnv::new(test_name!(), 16);
    env.manager.start_layout_pass();
    let params = env.params("A", 64.0, [0, 0], TextAlignment::Left);
    assert_eq!(
        env.manager.get_buffer("A", &params).unwrap_err(),
        BufferError::CacheFull
    );
    env.manager.flush_and_update();
    assert_eq!(
        env.manager.get_buffer("A", &params).unwrap_err(),
        BufferError::CacheFull
    );
    assert_eq!(env.manager.buffer_count(), 0);
}

#[test]
fn cache_string_larger_than_the_atlas() {
    let mut env = TestEnv::new(test_name!(), 64);
    assert_eq!(TOO_MANY.len(), 60);
    env.manager.start_layout_pass();
    let params = env.line(TOO_MANY);
    assert_eq!(
        env.manager.get_buffer(TOO_MANY, &params).unwrap_err(),
        BufferError::CacheFull
    );
    // Every row is pinned by this pass, so nothing was evicted.
    assert_eq!(env.manager.glyph_cache().revision(), 0);
    assert_eq!(env.manager.glyph_cache().len(), 32);

    env.manager.flush_and_update();
    assert_eq!(
        env.manager.get_buffer(TOO_MANY, &params).unwrap_err(),
        BufferError::CacheFull
    );
    assert_eq!(env.manager.buffer_count(), 0);

    env.manager.flush_and_update();
    let hello = env.line("hello");
    let buffer = env.buffer("hello", &hello);
    assert_eq!(buffer.glyph_count(), 5);
    assert_uvs_match_atlas(&env.manager, &buffer, env.name);
}

#[test]
fn cache_full_then_flush_and_retry() {
    let mut env = TestEnv::new(test_name!(), 64);
    env.manager.start_layout_pass();
    let first = env.line(ROWS[0]);
    env.buffer(ROWS[0], &first);
    let text = concat!("IJKLMNOP", "QRSTUVWX", "YZabcdeh", "iklmnors");
    let params = env.line(text);
    assert_eq!(
        env.manager.get_buffer(text, &params).unwrap_err(),
        BufferError::CacheFull
    );
    env.manager.flush_and_update();
    let buffer = env.buffer(text, &params);
    assert_eq!(buffer.glyph_count(), 32);
    assert_eq!(buffer.revision(), 1);
    assert_uvs_match_atlas(&env.manager, &buffer, env.name);

    // The flush left the first buffer pointing at glyphs that are gone.
    let stale = env.manager.cached_buffer(&first).unwrap();
    assert_eq!(stale.revision(), 0);
}

#[test]
fn cache_evicts_rows_of_older_passes() {
    let mut env = TestEnv::new(test_name!(), 64);
    let params: Vec<_> = ROWS.iter().map(|text| env.line(text)).collect();

    env.manager.start_layout_pass();
    for (text, params) in ROWS.iter().zip(&params).take(3) {
        env.buffer(text, params);
    }
    env.manager.start_render_pass();
    let original = env.manager.cached_buffer(&params[0]).unwrap().clone();

    // The fifth row evicts the least recently used one, the first.
    env.manager.start_layout_pass();
    env.buffer(ROWS[3], &params[3]);
    assert_eq!(env.manager.glyph_cache().revision(), 0);
    let evicting = env.buffer(ROWS[4], &params[4]);
    assert_eq!(env.manager.glyph_cache().revision(), 1);
    assert_eq!(evicting.revision(), 1);
    assert_eq!(evicting.vertices()[0].uv, original.vertices()[0].uv);
    env.manager.start_render_pass();

    // The first string is rebuilt in the second row, at the same place on
    // screen.
    env.manager.start_layout_pass();
    let rebuilt = env.buffer(ROWS[0], &params[0]);
    assert_eq!(rebuilt.revision(), 2);
    for (new, old) in rebuilt.vertices().iter().zip(original.vertices()) {
        assert_eq!(new.position, old.position);
    }
    assert_ne!(rebuilt.vertices()[0].uv, original.vertices()[0].uv);
    env.manager.start_render_pass();
    assert_uvs_match_atlas(&env.manager, &rebuilt, env.name);
}

#[test]
fn cache_hits_keep_rows_pinned() {
    let mut env = TestEnv::new(test_name!(), 64);
    let params: Vec<_> = ROWS.iter().map(|text| env.line(text)).collect();
    env.manager.start_layout_pass();
    for (text, params) in ROWS.iter().zip(&params).take(4) {
        env.buffer(text, params);
    }
    env.manager.start_render_pass();

    // Reusing every cached buffer pins every row, so a new row cannot be
    // made.
    env.manager.start_layout_pass();
    for (text, params) in ROWS.iter().zip(&params).take(4) {
        env.buffer(text, params);
    }
    assert_eq!(
        env.manager.get_buffer(ROWS[4], &params[4]).unwrap_err(),
        BufferError::CacheFull
    );
    assert_eq!(env.manager.glyph_cache().revision(), 0);
}
