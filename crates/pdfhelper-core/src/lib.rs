//! PDF helper operations
//!
//! Range parsing, text location and overlay geometry, plus the lopdf-backed
//! document operations built on them: merge, split, rotate, find, replace
//! and redact.

pub mod edit;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod locate;
pub mod merge;
pub mod overlay;
pub mod pages;
pub mod paint;
pub mod ranges;
pub mod rotate;
pub mod split;

#[cfg(test)]
mod test_support;

pub use edit::{find_text, redact_text, replace_text, EditOutcome, FindReport, PageMatches};
pub use error::{PdfHelperError, ValidationCode, ValidationError};
pub use extract::{PdfWordExtractor, WordExtractor};
pub use geometry::{ExtractionSpace, Point, Rect, RenderSpace};
pub use locate::{locate, MatchIndex, MatchOptions, Word, WordStreams};
pub use merge::merge_documents;
pub use overlay::{flip_y, plan_paint, plan_text_anchor};
pub use ranges::{expand_to_page_set, parse_ranges, PageRange};
pub use rotate::{rotate_pages, RotationAngle};
pub use split::{split_by_ranges, SplitPart};
