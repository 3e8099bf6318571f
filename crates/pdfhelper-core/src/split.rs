//! PDF Split algorithm
//!
//! Extracts pages from a PDF using "Construction by Whitelist".

use std::collections::BTreeSet;

use lopdf::Document;
use tracing::debug;

use crate::error::PdfHelperError;
use crate::pages::{load_document, save_document};
use crate::ranges::{parse_ranges, PageRange};

/// One output document of a split, with the range it was cut from.
#[derive(Debug, Clone)]
pub struct SplitPart {
    pub range: PageRange,
    pub bytes: Vec<u8>,
}

impl SplitPart {
    /// File name inside the split bundle, `index` being 1-based.
    pub fn file_name(&self, index: usize) -> String {
        format!("part_{}_{}-{}.pdf", index, self.range.start, self.range.end)
    }
}

/// Split a document into one PDF per range of `expression`, in input order.
pub fn split_by_ranges(bytes: &[u8], expression: &str) -> Result<Vec<SplitPart>, PdfHelperError> {
    let doc = load_document(bytes)?;
    let page_count = doc.get_pages().len() as u32;
    let ranges = parse_ranges(expression, page_count)?;

    debug!(page_count, parts = ranges.len(), "Splitting document");

    ranges
        .into_iter()
        .map(|range| -> Result<SplitPart, PdfHelperError> {
            let pages: BTreeSet<u32> = range.pages().collect();
            Ok(SplitPart {
                range,
                bytes: keep_pages(&doc, page_count, &pages)?,
            })
        })
        .collect()
}

/// Copy of `doc` holding only `pages` (1-based): every other page is deleted,
/// unreachable objects are pruned and the page tree rebuilt.
fn keep_pages(
    doc: &Document,
    page_count: u32,
    pages: &BTreeSet<u32>,
) -> Result<Vec<u8>, PdfHelperError> {
    let mut new_doc = doc.clone();

    // Delete in reverse order so page numbers stay valid
    let pages_to_delete: Vec<u32> = (1..=page_count).rev().filter(|p| !pages.contains(p)).collect();
    for page_num in pages_to_delete {
        new_doc.delete_pages(&[page_num]);
    }

    new_doc.prune_objects();
    new_doc.compress();

    save_document(&mut new_doc)
}
