// Copyright 2026 the Atlas Text Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line break opportunities.

use alloc::vec::Vec;

/// Finds legal line break opportunities.
pub trait LineBreaker {
    /// Returns the sorted byte offsets at which a new line may start.
    ///
    /// Offset zero is never included; `text.len()` may be.
    fn find_breaks(&mut self, text: &str, language: &str) -> Vec<usize>;
}

/// Returns `true` for characters that force a line break after them.
pub(crate) fn is_mandatory_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Breaks after spaces, hyphens and mandatory breaks, and around CJK
/// ideographs. Ignores the language.
#[derive(Copy, Clone, Debug, Default)]
pub struct SimpleLineBreaker;

fn is_ideographic(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}'
        | '\u{20000}'..='\u{2FFFF}')
}

impl LineBreaker for SimpleLineBreaker {
    fn find_breaks(&mut self, text: &str, _language: &str) -> Vec<usize> {
        let mut breaks = Vec::new();
        let mut prev: Option<char> = None;
        for (offset, c) in text.char_indices() {
            if let Some(p) = prev {
                let allowed = is_mandatory_break(p)
                    || (p.is_whitespace() && !c.is_whitespace())
                    || (p == '-' && !c.is_whitespace())
                    || ((is_ideographic(p) || is_ideographic(c)) && !c.is_whitespace());
                if allowed && !(p == '\r' && c == '\n') {
                    breaks.push(offset);
                }
            }
            prev = Some(c);
        }
        if !text.is_empty() {
            breaks.push(text.len());
        }
        breaks
    }
}

/// UAX #14 line breaking through ICU4X, tailored by language.
#[cfg(feature = "icu")]
#[derive(Copy, Clone, Debug, Default)]
pub struct IcuLineBreaker;

#[cfg(feature = "icu")]
impl IcuLineBreaker {
    /// Creates a breaker backed by compiled ICU4X data.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "icu")]
impl LineBreaker for IcuLineBreaker {
    fn find_breaks(&mut self, text: &str, language: &str) -> Vec<usize> {
        use icu_locale_core::LanguageIdentifier;
        use icu_segmenter::LineSegmenter;
        use icu_segmenter::options::LineBreakOptions;

        let locale = LanguageIdentifier::try_from_str(language).ok();
        let mut options = LineBreakOptions::default();
        options.content_locale = locale.as_ref();
        LineSegmenter::new_auto(options)
            .segment_str(text)
            .filter(|&offset| offset != 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_breaks_after_spaces() {
        let breaks = SimpleLineBreaker.find_breaks("one two  three", "en");
        assert_eq!(breaks, [4, 9, 14]);
    }

    #[test]
    fn simple_breaks_after_newline_and_hyphen() {
        let breaks = SimpleLineBreaker.find_breaks("a\nwell-known", "en");
        assert_eq!(breaks, [2, 7, 12]);
        let crlf = SimpleLineBreaker.find_breaks("a\r\nb", "en");
        assert_eq!(crlf, [3, 4]);
    }

    #[test]
    fn simple_breaks_between_ideographs() {
        let breaks = SimpleLineBreaker.find_breaks("漢字", "ja");
        assert_eq!(breaks, [3, 6]);
    }

    #[cfg(feature = "icu")]
    #[test]
    fn icu_breaks_after_spaces() {
        let breaks = IcuLineBreaker::new().find_breaks("hello world", "en");
        assert_eq!(breaks, [6, 11]);
    }
}
