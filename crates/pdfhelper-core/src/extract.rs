//! Word extraction using pdf-extract
//!
//! pdf-extract reports one callback per glyph with its text rendering
//! matrix. `WordCollector` groups those glyphs into whitespace-delimited
//! words with a bounding box in PDF user space (extraction space).

use pdf_extract::{MediaBox, OutputDev, OutputError, Transform};
use tracing::debug;

use crate::error::PdfHelperError;
use crate::geometry::Rect;
use crate::locate::{Word, WordStreams};

/// Source of per-page word streams for a document.
pub trait WordExtractor {
    fn extract_words(&self, bytes: &[u8]) -> Result<WordStreams, PdfHelperError>;
}

/// Extractor backed by pdf-extract's glyph output.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfWordExtractor;

impl WordExtractor for PdfWordExtractor {
    fn extract_words(&self, bytes: &[u8]) -> Result<WordStreams, PdfHelperError> {
        // pdf-extract re-exports Document from lopdf
        let doc = pdf_extract::Document::load_mem(bytes)
            .map_err(|e| PdfHelperError::ParseError(e.to_string()))?;

        let mut collector = WordCollector::default();
        pdf_extract::output_doc(&doc, &mut collector)
            .map_err(|e| PdfHelperError::ExtractionError(e.to_string()))?;

        let pages = collector.finish();
        debug!(
            pages = pages.len(),
            words = pages.values().map(Vec::len).sum::<usize>(),
            "Extracted words"
        );
        Ok(pages)
    }
}

/// Vertical drift, as a fraction of glyph size, that still counts as one line.
const BASELINE_TOLERANCE: f64 = 0.5;
/// Horizontal gap, as a fraction of glyph size, that splits two words.
const WORD_GAP_RATIO: f64 = 0.3;
/// Depth below the baseline covered by a word box, as a fraction of glyph
/// size. Deep enough for the standard 14 descenders (Helvetica 0.207,
/// Courier 0.157).
const DESCENT_RATIO: f64 = 0.21;
/// Height above the baseline covered by a word box, as a fraction of glyph size.
const ASCENT_RATIO: f64 = 0.79;

#[derive(Debug)]
struct PendingWord {
    text: String,
    left: f64,
    right: f64,
    baseline: f64,
    size: f64,
}

impl PendingWord {
    /// Box from the descender line up to the ascender line.
    fn into_word(self) -> Word {
        let width = self.right - self.left;
        let bottom = self.baseline - DESCENT_RATIO * self.size;
        let height = (DESCENT_RATIO + ASCENT_RATIO) * self.size;
        Word::new(self.text, Rect::new(self.left, bottom, width, height))
    }
}

/// Groups glyph callbacks into words, page by page.
#[derive(Debug, Default)]
pub struct WordCollector {
    pages: WordStreams,
    current_page: u32,
    pending: Option<PendingWord>,
}

impl WordCollector {
    /// Feed one glyph: its origin, horizontal advance and size, all in user space.
    pub fn push_glyph(&mut self, x: f64, baseline: f64, advance: f64, size: f64, text: &str) {
        if text.chars().all(char::is_whitespace) {
            self.flush();
            return;
        }

        if let Some(pending) = &self.pending {
            let tolerance = pending.size.max(size);
            let new_line = (baseline - pending.baseline).abs() > BASELINE_TOLERANCE * tolerance;
            let gap = x - pending.right;
            let moved_back = x < pending.left;
            if new_line || moved_back || gap > WORD_GAP_RATIO * tolerance {
                self.flush();
            }
        }

        match &mut self.pending {
            Some(pending) => {
                pending.text.push_str(text);
                pending.right = pending.right.max(x + advance);
                pending.size = pending.size.max(size);
            }
            None => {
                self.pending = Some(PendingWord {
                    text: text.to_string(),
                    left: x,
                    right: x + advance,
                    baseline,
                    size,
                });
            }
        }
    }

    /// Start collecting for a 1-based page number.
    pub fn start_page(&mut self, page_number: u32) {
        self.flush();
        self.current_page = page_number;
        self.pages.entry(page_number).or_default();
    }

    /// Close the pending word, if any.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.pages
                .entry(self.current_page)
                .or_default()
                .push(pending.into_word());
        }
    }

    pub fn finish(mut self) -> WordStreams {
        self.flush();
        self.pages
    }
}

impl OutputDev for WordCollector {
    fn begin_page(
        &mut self,
        page_num: u32,
        _media_box: &MediaBox,
        _art_box: Option<(f64, f64, f64, f64)>,
    ) -> Result<(), OutputError> {
        self.start_page(page_num);
        Ok(())
    }

    fn end_page(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }

    fn output_character(
        &mut self,
        trm: &Transform,
        width: f64,
        _spacing: f64,
        font_size: f64,
        char: &str,
    ) -> Result<(), OutputError> {
        let sx = font_size * trm.m11 + font_size * trm.m21;
        let sy = font_size * trm.m12 + font_size * trm.m22;
        let size = (sx * sy).abs().sqrt();
        self.push_glyph(trm.m31, trm.m32, width * size, size, char);
        Ok(())
    }

    fn begin_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_word(&mut self) -> Result<(), OutputError> {
        Ok(())
    }

    fn end_line(&mut self) -> Result<(), OutputError> {
        self.flush();
        Ok(())
    }
}
