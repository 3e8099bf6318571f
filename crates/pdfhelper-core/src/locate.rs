//! Locating a search term in extracted word streams
//!
//! Matching is per extracted word token. With `whole_word` set, a term that
//! contains whitespace can never match, since the extractor never yields a
//! token spanning two words. That is a known limitation of the granularity
//! and is kept as-is.

use std::collections::BTreeMap;

use crate::geometry::{ExtractionSpace, Rect};

/// One extracted word and its box in extraction space.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: Rect<ExtractionSpace>,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: Rect<ExtractionSpace>) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Words per 1-based page number, in extraction order.
pub type WordStreams = BTreeMap<u32, Vec<Word>>;

/// Matched boxes per 1-based page number. Pages without matches are absent.
pub type MatchIndex = BTreeMap<u32, Vec<Rect<ExtractionSpace>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    pub match_case: bool,
    pub whole_word: bool,
    /// Padding around each painted box, in points
    pub padding: f64,
    /// Font family for replacement text; Helvetica when unset
    pub font_family: Option<String>,
    pub font_size: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            match_case: false,
            whole_word: true,
            padding: 1.5,
            font_family: None,
            font_size: 11.0,
        }
    }
}

/// Find every word matching `term` across all pages.
///
/// Callers reject blank terms before getting here.
pub fn locate(pages: &WordStreams, term: &str, options: &MatchOptions) -> MatchIndex {
    let term = normalize(term, options.match_case);
    let mut index = MatchIndex::new();

    for (&page_number, words) in pages {
        for word in words {
            let candidate = normalize(&word.text, options.match_case);
            let is_match = if options.whole_word {
                candidate == term
            } else {
                candidate.contains(term.as_str())
            };

            if is_match {
                index.entry(page_number).or_default().push(word.bbox);
            }
        }
    }

    index
}

fn normalize(text: &str, match_case: bool) -> String {
    if match_case {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

/// Total number of matched boxes over all pages.
pub fn match_count(index: &MatchIndex) -> usize {
    index.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x: f64) -> Word {
        Word::new(text, Rect::new(x, 700.0, 30.0, 12.0))
    }

    fn single_page(words: Vec<Word>) -> WordStreams {
        let mut pages = WordStreams::new();
        pages.insert(1, words);
        pages
    }

    #[test]
    fn test_whole_word_ignores_case_by_default() {
        let pages = single_page(vec![word("Hello", 10.0)]);
        let index = locate(&pages, "hello", &MatchOptions::default());
        assert_eq!(index.get(&1).map(Vec::len), Some(1));
    }

    #[test]
    fn test_whole_word_rejects_prefix() {
        let pages = single_page(vec![word("Hello", 10.0)]);
        let index = locate(&pages, "Hell", &MatchOptions::default());
        assert!(index.is_empty());
    }

    #[test]
    fn test_substring_mode_matches_inside_word() {
        let pages = single_page(vec![word("Hello123", 10.0)]);
        let options = MatchOptions {
            whole_word: false,
            ..MatchOptions::default()
        };
        let index = locate(&pages, "ello", &options);
        assert_eq!(index.get(&1).map(Vec::len), Some(1));
    }

    #[test]
    fn test_match_case_is_respected() {
        let pages = single_page(vec![word("Hello", 10.0), word("hello", 50.0)]);
        let options = MatchOptions {
            match_case: true,
            ..MatchOptions::default()
        };
        let index = locate(&pages, "hello", &options);
        assert_eq!(index[&1], vec![Rect::new(50.0, 700.0, 30.0, 12.0)]);
    }

    #[test]
    fn test_phrase_never_matches_whole_word() {
        let pages = single_page(vec![word("Hello", 10.0), word("World", 50.0)]);
        let index = locate(&pages, "Hello World", &MatchOptions::default());
        assert!(index.is_empty());
    }

    #[test]
    fn test_pages_without_matches_are_absent() {
        let mut pages = WordStreams::new();
        pages.insert(1, vec![word("alpha", 10.0)]);
        pages.insert(2, vec![word("beta", 10.0)]);
        pages.insert(3, vec![word("alpha", 20.0)]);

        let index = locate(&pages, "alpha", &MatchOptions::default());
        assert_eq!(index.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!index.contains_key(&2));
    }

    #[test]
    fn test_extraction_order_preserved_without_dedup() {
        let pages = single_page(vec![
            word("tax", 300.0),
            word("tax", 10.0),
            word("tax", 10.0),
        ]);
        let index = locate(&pages, "TAX", &MatchOptions::default());
        let xs: Vec<f64> = index[&1].iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![300.0, 10.0, 10.0]);
        assert_eq!(match_count(&index), 3);
    }

    #[test]
    fn test_unicode_lowering() {
        let pages = single_page(vec![word("STRASSE", 10.0), word("Ärger", 60.0)]);
        let index = locate(&pages, "ärger", &MatchOptions::default());
        assert_eq!(index[&1], vec![Rect::new(60.0, 700.0, 30.0, 12.0)]);
    }

    #[test]
    fn test_malformed_boxes_pass_through() {
        let bbox = Rect::new(5.0, 5.0, -3.0, -1.0);
        let pages = single_page(vec![Word::new("odd", bbox)]);
        let index = locate(&pages, "odd", &MatchOptions::default());
        assert_eq!(index[&1], vec![bbox]);
    }

    #[test]
    fn test_default_options() {
        let options = MatchOptions::default();
        assert!(!options.match_case);
        assert!(options.whole_word);
        assert_eq!(options.padding, 1.5);
        assert_eq!(options.font_family, None);
        assert_eq!(options.font_size, 11.0);
    }
}
