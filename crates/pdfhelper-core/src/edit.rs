//! Find, replace and redact text
//!
//! Words are extracted once for the whole document and matched in a single
//! pass. Only pages with matches get an overlay; every other page is left
//! exactly as it was.

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PdfHelperError, ValidationCode, ValidationError};
use crate::extract::WordExtractor;
use crate::geometry::{Rect, RenderSpace};
use crate::locate::{locate, match_count, MatchIndex, MatchOptions};
use crate::overlay::{plan_paint, plan_text_anchor};
use crate::pages::{load_document, page_height, save_document};
use crate::paint::{Color, PagePainter, StandardFont};

/// Output document of a replace or redact, with how many boxes were painted.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub bytes: Vec<u8>,
    pub matches: usize,
}

/// Planned paint boxes for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMatches {
    pub page: u32,
    pub rects: Vec<Rect<RenderSpace>>,
}

/// Result of a read-only search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindReport {
    pub total: usize,
    pub pages: Vec<PageMatches>,
}

#[derive(Debug, Clone, Copy)]
enum Overlay<'a> {
    Replace(&'a str),
    Redact,
}

/// Cover every match with white and write `replacement` over it.
pub fn replace_text(
    bytes: &[u8],
    find: &str,
    replacement: &str,
    options: &MatchOptions,
    extractor: &dyn WordExtractor,
) -> Result<EditOutcome, PdfHelperError> {
    apply_overlay(bytes, find, options, extractor, Overlay::Replace(replacement))
}

/// Cover every match with a black box.
pub fn redact_text(
    bytes: &[u8],
    find: &str,
    options: &MatchOptions,
    extractor: &dyn WordExtractor,
) -> Result<EditOutcome, PdfHelperError> {
    apply_overlay(bytes, find, options, extractor, Overlay::Redact)
}

/// Report where a replace or redact would paint, without touching the document.
pub fn find_text(
    bytes: &[u8],
    find: &str,
    options: &MatchOptions,
    extractor: &dyn WordExtractor,
) -> Result<FindReport, PdfHelperError> {
    let index = match_document(bytes, find, options, extractor)?;
    let doc = load_document(bytes)?;
    let page_ids = doc.get_pages();

    let pages: Vec<PageMatches> = index
        .iter()
        .filter_map(|(&page, rects)| {
            let page_id = *page_ids.get(&page)?;
            let height = page_height(&doc, page_id);
            Some(PageMatches {
                page,
                rects: rects
                    .iter()
                    .map(|rect| plan_paint(rect, height, options.padding))
                    .collect(),
            })
        })
        .collect();

    Ok(FindReport {
        total: pages.iter().map(|p| p.rects.len()).sum(),
        pages,
    })
}

fn validate_term(find: &str) -> Result<(), ValidationError> {
    if find.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::EmptySearchTerm,
            "Search text must not be empty",
        ));
    }
    Ok(())
}

fn match_document(
    bytes: &[u8],
    find: &str,
    options: &MatchOptions,
    extractor: &dyn WordExtractor,
) -> Result<MatchIndex, PdfHelperError> {
    validate_term(find)?;
    let words = extractor.extract_words(bytes)?;
    let index = locate(&words, find, options);
    debug!(
        pages_with_matches = index.len(),
        matches = match_count(&index),
        "Located search term"
    );
    Ok(index)
}

fn apply_overlay(
    bytes: &[u8],
    find: &str,
    options: &MatchOptions,
    extractor: &dyn WordExtractor,
    overlay: Overlay<'_>,
) -> Result<EditOutcome, PdfHelperError> {
    let index = match_document(bytes, find, options, extractor)?;
    let matches = match_count(&index);
    if matches == 0 {
        info!("No matches, returning document unchanged");
        return Ok(EditOutcome {
            bytes: bytes.to_vec(),
            matches,
        });
    }

    let mut doc = load_document(bytes)?;
    let font = StandardFont::for_family(options.font_family.as_deref(), options.font_size);

    for (page_number, page_id) in doc.get_pages() {
        let Some(rects) = index.get(&page_number) else {
            continue;
        };

        let height = page_height(&doc, page_id);
        let mut painter = PagePainter::new(height);
        for rect in rects {
            let paint = plan_paint(rect, height, options.padding);
            match overlay {
                Overlay::Replace(replacement) => {
                    painter.fill_rect(&paint, Color::White);
                    if !replacement.is_empty() {
                        painter.draw_text(&plan_text_anchor(rect, height), replacement, &font);
                    }
                }
                Overlay::Redact => painter.fill_rect(&paint, Color::Black),
            }
        }
        painter.apply(&mut doc, page_id)?;
    }

    info!(matches, "Applied text overlay");
    Ok(EditOutcome {
        bytes: save_document(&mut doc)?,
        matches,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PdfWordExtractor;
    use crate::locate::{Word, WordStreams};
    use crate::test_support::{operands, operators, page_content, text_pdf};
    use pretty_assertions::assert_eq;

    /// Extractor returning a fixed word stream, ignoring the document.
    struct FixedWords(WordStreams);

    impl WordExtractor for FixedWords {
        fn extract_words(&self, _bytes: &[u8]) -> Result<WordStreams, PdfHelperError> {
            Ok(self.0.clone())
        }
    }

    fn fixed(page: u32, words: &[(&str, f64)]) -> FixedWords {
        let mut pages = WordStreams::new();
        pages.insert(
            page,
            words
                .iter()
                .map(|(text, x)| Word::new(*text, Rect::new(*x, 700.0, 30.0, 12.0)))
                .collect(),
        );
        FixedWords(pages)
    }

    fn validation_code(err: PdfHelperError) -> ValidationCode {
        match err {
            PdfHelperError::Validation(err) => err.code,
            other => panic!("expected validation error, got {}", other),
        }
    }

    #[test]
    fn test_blank_term_is_rejected() {
        let pdf = text_pdf(&["Hello"]);
        let err = redact_text(&pdf, "  ", &MatchOptions::default(), &PdfWordExtractor).unwrap_err();
        assert_eq!(validation_code(err), ValidationCode::EmptySearchTerm);
    }

    #[test]
    fn test_redact_paints_black_box_on_matched_page_only() {
        let pdf = text_pdf(&["Tax here", "Nothing"]);
        let words = fixed(1, &[("tax", 100.0), ("here", 140.0)]);

        let outcome = redact_text(&pdf, "TAX", &MatchOptions::default(), &words).unwrap();
        assert_eq!(outcome.matches, 1);

        // 700 - 1.5 = 698.5 in PDF space, 30 + 3 wide, 12 + 3 tall
        assert_eq!(operands(&outcome.bytes, 1, "re"), vec![vec![98.5, 698.5, 33.0, 15.0]]);
        assert_eq!(operands(&outcome.bytes, 1, "rg"), vec![vec![0.0, 0.0, 0.0]]);
        // Redaction paints only; the original text stays under the box
        let text_ops = operators(&outcome.bytes, 1)
            .into_iter()
            .filter(|op| op == "Tj")
            .count();
        assert_eq!(text_ops, 1);

        assert_eq!(page_content(&outcome.bytes, 2), page_content(&pdf, 2));
    }

    #[test]
    fn test_replace_draws_white_box_then_text() {
        let pdf = text_pdf(&["Hello World"]);
        let words = fixed(1, &[("Hello", 100.0), ("World", 136.0)]);

        let outcome =
            replace_text(&pdf, "world", "Earth", &MatchOptions::default(), &words).unwrap();
        assert_eq!(outcome.matches, 1);
        assert_eq!(operands(&outcome.bytes, 1, "rg")[0], vec![1.0, 1.0, 1.0]);

        // Baseline sits 0.2 of the box height above the box bottom
        let td = operands(&outcome.bytes, 1, "Td");
        let anchor = td.last().unwrap();
        assert_eq!(anchor[0], 136.0);
        assert!((anchor[1] - 702.4).abs() < 1e-3, "baseline: {}", anchor[1]);

        let content = String::from_utf8_lossy(&page_content(&outcome.bytes, 1)).to_string();
        assert!(content.contains("(Earth) Tj"), "content: {}", content);
    }

    #[test]
    fn test_no_matches_returns_input() {
        let pdf = text_pdf(&["Hello"]);
        let words = fixed(1, &[("Hello", 100.0)]);
        let outcome = redact_text(&pdf, "absent", &MatchOptions::default(), &words).unwrap();
        assert_eq!(outcome.matches, 0);
        assert_eq!(outcome.bytes, pdf);
    }

    #[test]
    fn test_matches_on_missing_pages_are_ignored() {
        let pdf = text_pdf(&["Hello"]);
        let words = fixed(7, &[("Hello", 100.0)]);
        let outcome = redact_text(&pdf, "hello", &MatchOptions::default(), &words).unwrap();
        assert_eq!(page_content(&outcome.bytes, 1), page_content(&pdf, 1));
    }

    #[test]
    fn test_find_reports_render_space_boxes() {
        let pdf = text_pdf(&["Hello World"]);
        let words = fixed(1, &[("Hello", 100.0), ("hello", 200.0)]);
        let report = find_text(&pdf, "hello", &MatchOptions::default(), &words).unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].page, 1);
        // 792 - (700 + 12) - 1.5
        assert_eq!(report.pages[0].rects[0], Rect::new(98.5, 78.5, 33.0, 15.0));
    }

    #[test]
    fn test_redact_with_real_extraction() {
        let pdf = text_pdf(&["Hello World"]);
        let outcome =
            redact_text(&pdf, "world", &MatchOptions::default(), &PdfWordExtractor).unwrap();
        assert_eq!(outcome.matches, 1);
        assert_eq!(operands(&outcome.bytes, 1, "re").len(), 1);
    }

    #[test]
    fn test_redaction_covers_descenders() {
        // Baseline at 700, Helvetica 12pt
        let pdf = text_pdf(&["gypsy jumpy"]);
        let outcome =
            redact_text(&pdf, "gypsy", &MatchOptions::default(), &PdfWordExtractor).unwrap();

        let boxes = operands(&outcome.bytes, 1, "re");
        assert_eq!(boxes.len(), 1);
        let (bottom, top) = (boxes[0][1], boxes[0][1] + boxes[0][3]);
        let descender_line = 700.0 - 0.207 * 12.0;
        let ascender_line = 700.0 + 0.718 * 12.0;
        assert!(bottom < descender_line, "box bottom {} above descenders", bottom);
        assert!(top > ascender_line, "box top {} below ascenders", top);
    }

    #[test]
    fn test_replacement_sits_on_original_baseline() {
        let pdf = text_pdf(&["gypsy jumpy"]);
        let outcome = replace_text(
            &pdf,
            "jumpy",
            "happy",
            &MatchOptions::default(),
            &PdfWordExtractor,
        )
        .unwrap();

        let td = operands(&outcome.bytes, 1, "Td");
        let baseline = td.last().unwrap()[1];
        assert!((baseline - 700.0).abs() < 0.5, "baseline: {}", baseline);
    }
}
