// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `atlas_text`.
//!
//! - The `util` module contains the test environment and shared assertions.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests, so that every topic module can share `util`.
//! - Tests run against the synthetic faces of `atlas_text::testing`, whose glyphs are boxes
//!   half as wide as the font size. Expected positions can be worked out by hand.
//! - For test naming, put the "topic" of the test at the start of the name, e.g.
//!   `justify_last_line_falls_back` rather than `last_line_justify`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod cache;
mod rtl;
#[macro_use]
mod util;
