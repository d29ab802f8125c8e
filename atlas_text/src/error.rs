// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;

/// Failure to open a font face.
///
/// Carries a non-exhaustive [`FontErrorKind`] plus the name the caller
/// tried to open. Opening never leaves partial state behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontError {
    kind: FontErrorKind,
    name: String,
}

impl FontError {
    /// Creates an error of the given kind for the font called `name`.
    pub fn new(kind: FontErrorKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// The machine-readable category for this error.
    pub fn kind(&self) -> FontErrorKind {
        self.kind
    }

    /// The font name that was being opened or selected.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl core::fmt::Display for FontError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            FontErrorKind::NotFound => write!(f, "font `{}` could not be found", self.name),
            FontErrorKind::InvalidData => {
                write!(f, "font `{}` does not contain a usable face", self.name)
            }
            FontErrorKind::NotOpened => write!(f, "font `{}` has not been opened", self.name),
        }
    }
}

impl core::error::Error for FontError {}

/// The non-exhaustive category of a [`FontError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum FontErrorKind {
    /// The font source does not exist or could not be read.
    NotFound,

    /// The font source was read but could not be parsed as a font.
    InvalidData,

    /// The font was selected or closed before being opened.
    NotOpened,
}

/// Failure to produce a [`FontBuffer`](crate::FontBuffer) or
/// [`FontTexture`](crate::FontTexture).
///
/// [`BufferError::CacheFull`] is the signal to call
/// [`FontManager::flush_and_update`](crate::FontManager::flush_and_update)
/// and retry the whole string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum BufferError {
    /// A glyph could not be placed in the atlas even after eviction.
    CacheFull,

    /// No font has been selected.
    NoFontSelected,

    /// The string has more glyphs than a 16-bit index buffer can address.
    TooManyGlyphs,
}

impl core::fmt::Display for BufferError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CacheFull => f.write_str("glyph cache is full; flush and retry"),
            Self::NoFontSelected => f.write_str("no font is selected"),
            Self::TooManyGlyphs => f.write_str("too many glyphs for a 16-bit index buffer"),
        }
    }
}

impl core::error::Error for BufferError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn font_error_display_names_font() {
        let err = FontError::new(FontErrorKind::NotFound, "fonts/missing.ttf");
        assert_eq!(err.kind(), FontErrorKind::NotFound);
        assert_eq!(err.name(), "fonts/missing.ttf");
        assert_eq!(
            err.to_string(),
            "font `fonts/missing.ttf` could not be found"
        );
    }

    #[test]
    fn buffer_error_display() {
        assert_eq!(
            BufferError::CacheFull.to_string(),
            "glyph cache is full; flush and retry"
        );
    }
}
