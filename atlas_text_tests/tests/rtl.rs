// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Right to left layout.

use atlas_text::layout::UNIT_SCALE;
use atlas_text::{TextAlignment, TextLayoutDirection};

use crate::test_name;
use crate::util::{TestEnv, assert_buffer_consistent, quad_lefts};

fn rtl_env(name: &'static str) -> TestEnv {
    let mut env = TestEnv::new(name, 1024);
    assert!(env.manager.set_layout_direction(TextLayoutDirection::Rtl));
    env.manager.start_layout_pass();
    env
}

#[test]
fn rtl_glyphs_are_in_visual_order() {
    let mut env = rtl_env(test_name!());
    let params = env.params("ab c", 16.0, [100, 0], TextAlignment::JUSTIFY);
    let buffer = env.buffer("ab c", &params);
    assert_buffer_consistent(&buffer, env.name);

    assert_eq!(
        buffer.code_points(),
        [u32::from('c'), u32::from('b'), u32::from('a')]
    );
    // The last line of left justified text is mirrored to the right edge.
    assert_eq!(buffer.lines()[0].offset, 68 * UNIT_SCALE);
    assert_eq!(quad_lefts(&buffer), [69.0, 85.0, 93.0]);
}

#[test]
fn rtl_carets_run_right_to_left() {
    let mut env = rtl_env(test_name!());
    let params = env.params("ab c", 16.0, [100, 0], TextAlignment::JUSTIFY);
    let buffer = env.buffer("ab c", &params);
    let carets: Vec<f32> = buffer.caret_positions().unwrap().iter().map(|c| c[0]).collect();
    assert_eq!(carets, [100.0, 92.0, 84.0, 76.0, 68.0]);
}

#[test]
fn rtl_right_alignment_is_mirrored_to_the_left() {
    let mut env = rtl_env(test_name!());
    let params = env.params("ab c", 16.0, [100, 0], TextAlignment::Right);
    let buffer = env.buffer("ab c", &params);
    assert_eq!(buffer.lines()[0].offset, 0);
    assert_eq!(quad_lefts(&buffer), [1.0, 17.0, 25.0]);
}

#[test]
fn rtl_left_alignment_ignores_the_box_width() {
    let mut env = rtl_env(test_name!());
    let params = env.params("ab c", 16.0, [100, 0], TextAlignment::Left);
    let buffer = env.buffer("ab c", &params);
    // Mirrored to the right edge of the widest line, which is this one.
    assert_eq!(buffer.lines()[0].offset, 0);
    assert_eq!(quad_lefts(&buffer), [1.0, 17.0, 25.0]);
    let carets: Vec<f32> = buffer.caret_positions().unwrap().iter().map(|c| c[0]).collect();
    assert_eq!(carets, [32.0, 24.0, 16.0, 8.0, 0.0]);
    assert_eq!(buffer.size()[0], 32.0);
}

#[test]
fn rtl_locale_selects_direction() {
    let mut env = TestEnv::new(test_name!(), 1024);
    assert!(env.manager.set_locale("he-IL"));
    assert_eq!(env.manager.layout_direction(), TextLayoutDirection::Rtl);
    env.manager.start_layout_pass();
    let params = env.line("ab");
    let buffer = env.buffer("ab", &params);
    assert_eq!(buffer.code_points(), [u32::from('b'), u32::from('a')]);
}
