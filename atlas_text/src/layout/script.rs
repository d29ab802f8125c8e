// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripts, layout directions and the locale table.

use core::fmt;
use core::str::FromStr;

/// An ISO 15924 script identifier (four ASCII letters).
///
/// This type stores the canonical `Titlecase` form (e.g. `Latn`, `Arab`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Script {
    raw: [u8; 4],
}

impl Script {
    /// Latin.
    pub const LATIN: Self = Self::from_bytes(*b"Latn");
    /// Arabic.
    pub const ARABIC: Self = Self::from_bytes(*b"Arab");
    /// Hebrew.
    pub const HEBREW: Self = Self::from_bytes(*b"Hebr");
    /// The "unknown" script (`Zzzz`).
    pub const UNKNOWN: Self = Self::from_bytes(*b"Zzzz");

    /// Creates a `Script` from raw ISO 15924 bytes without validation.
    #[must_use]
    #[inline(always)]
    pub const fn from_bytes(raw: [u8; 4]) -> Self {
        Self { raw }
    }

    /// Returns the raw ISO 15924 bytes.
    #[must_use]
    #[inline(always)]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.raw
    }

    /// Returns the canonical string form (e.g. `Latn`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.raw).unwrap_or("Zzzz")
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Script").field(&self.as_str()).finish()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Script {
    type Err = ParseScriptError;

    /// Parsing is case-insensitive; output is normalized to `Titlecase`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 4 {
            return Err(ParseScriptError::InvalidLength);
        }
        if !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(ParseScriptError::InvalidBytes);
        }
        Ok(Self {
            raw: [
                bytes[0].to_ascii_uppercase(),
                bytes[1].to_ascii_lowercase(),
                bytes[2].to_ascii_lowercase(),
                bytes[3].to_ascii_lowercase(),
            ],
        })
    }
}

/// An error returned from parsing a [`Script`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseScriptError {
    /// The input was not exactly four bytes.
    InvalidLength,
    /// The input contained non-ASCII alphabetic bytes.
    InvalidBytes,
}

impl fmt::Display for ParseScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength => f.write_str("invalid script length"),
            Self::InvalidBytes => f.write_str("invalid script bytes"),
        }
    }
}

impl core::error::Error for ParseScriptError {}

/// Direction in which glyphs advance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextLayoutDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
    /// Top to bottom. Not supported for layout.
    Ttb,
}

impl TextLayoutDirection {
    /// Returns `true` for right to left text.
    #[inline]
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

/// A row of the locale table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScriptInfo {
    /// Language subtag, e.g. `en`.
    pub locale: &'static str,
    /// Default script of the language.
    pub script: Script,
    /// Default direction of the language.
    pub direction: TextLayoutDirection,
}

const fn info(locale: &'static str, script: &[u8; 4], direction: TextLayoutDirection) -> ScriptInfo {
    ScriptInfo {
        locale,
        script: Script::from_bytes(*script),
        direction,
    }
}

use TextLayoutDirection::{Ltr, Rtl};

/// Languages with a known script and direction.
pub static SCRIPT_TABLE: &[ScriptInfo] = &[
    info("en", b"Latn", Ltr),
    info("de", b"Latn", Ltr),
    info("es", b"Latn", Ltr),
    info("fr", b"Latn", Ltr),
    info("it", b"Latn", Ltr),
    info("nl", b"Latn", Ltr),
    info("pt", b"Latn", Ltr),
    info("tr", b"Latn", Ltr),
    info("vi", b"Latn", Ltr),
    info("ru", b"Cyrl", Ltr),
    info("uk", b"Cyrl", Ltr),
    info("el", b"Grek", Ltr),
    info("ar", b"Arab", Rtl),
    info("fa", b"Arab", Rtl),
    info("ur", b"Arab", Rtl),
    info("he", b"Hebr", Rtl),
    info("hi", b"Deva", Ltr),
    info("th", b"Thai", Ltr),
    info("ja", b"Jpan", Ltr),
    info("ko", b"Kore", Ltr),
    info("zh", b"Hani", Ltr),
];

impl ScriptInfo {
    /// Looks up the row for a locale such as `en-US`, `pt_BR` or `AR`.
    pub fn find(locale: &str) -> Option<&'static Self> {
        let language = language_of(locale);
        SCRIPT_TABLE
            .iter()
            .find(|row| row.locale.eq_ignore_ascii_case(language))
    }
}

/// Returns the language subtag of a locale.
pub fn language_of(locale: &str) -> &str {
    locale.split(['-', '_']).next().unwrap_or(locale)
}
