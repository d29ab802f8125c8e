// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font manager loaded with the synthetic faces.

use atlas_text::testing::{RecordingSink, box_library};
use atlas_text::{
    FontBuffer, FontBufferParameters, FontManager, FontManagerOptions, GlyphFlags, TextAlignment,
};

/// Font size used by most tests; glyphs advance by half of it.
pub(crate) const FONT_SIZE: f32 = 16.0;

pub(crate) struct TestEnv {
    pub(crate) name: &'static str,
    pub(crate) manager: FontManager,
    pub(crate) sink: RecordingSink,
}

impl TestEnv {
    /// A manager with a `cache_size` square atlas, the `latin` and `arabic`
    /// faces open and `latin` selected.
    pub(crate) fn new(name: &'static str, cache_size: u32) -> Self {
        let mut manager = FontManager::new(
            box_library(),
            FontManagerOptions {
                cache_size,
                ..FontManagerOptions::default()
            },
        );
        manager.open("latin").unwrap();
        manager.open("arabic").unwrap();
        manager.select_font("latin").unwrap();
        let sink = RecordingSink::new();
        manager.set_texture_sink(Box::new(sink.clone()));
        Self {
            name,
            manager,
            sink,
        }
    }

    /// Parameters with caret positions and plain coverage glyphs.
    pub(crate) fn params(
        &self,
        text: &str,
        font_size: f32,
        size: [i32; 2],
        alignment: TextAlignment,
    ) -> FontBufferParameters {
        self.manager
            .buffer_parameters(text, font_size, size, alignment, GlyphFlags::NONE, true)
    }

    /// Parameters for a single left aligned line at [`FONT_SIZE`].
    pub(crate) fn line(&self, text: &str) -> FontBufferParameters {
        self.params(text, FONT_SIZE, [0, 0], TextAlignment::Left)
    }

    /// Requests `text`, panicking on failure, and returns a copy of the
    /// buffer.
    pub(crate) fn buffer(&mut self, text: &str, params: &FontBufferParameters) -> FontBuffer {
        match self.manager.get_buffer(text, params) {
            Ok(buffer) => buffer.clone(),
            Err(err) => panic!("{}: `{text}` failed: {err}", self.name),
        }
    }
}
