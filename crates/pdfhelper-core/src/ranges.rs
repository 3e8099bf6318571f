//! Page range parsing for split and rotate
//!
//! Expressions look like `"1-3, 5, 8-end"`. Tokens are kept in input order;
//! overlapping or repeated ranges are allowed. Only the end of a range is
//! clamped to the page count, the start never is.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{ValidationCode, ValidationError};

/// Inclusive, 1-based page interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Symbolic names for the last page.
const END_ALIASES: &[&str] = &["end", "ende"];

/// Parse a range expression against a document with `page_count` pages.
pub fn parse_ranges(expression: &str, page_count: u32) -> Result<Vec<PageRange>, ValidationError> {
    if expression.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationCode::EmptyExpression,
            "Page range expression must not be empty",
        ));
    }

    let mut ranges = Vec::new();

    for token in expression.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }

        let range = if let Some((low, high)) = token.split_once('-') {
            let start = parse_page_value(low, page_count)?;
            let end = parse_page_value(high, page_count)?;
            if start < 1 || end < 1 || start > end || start > i64::from(page_count) {
                return Err(ValidationError::new(
                    ValidationCode::RangeOutOfBounds,
                    format!("Invalid range: {} (document has {} pages)", token, page_count),
                ));
            }
            let end = end.min(i64::from(page_count));
            PageRange::new(start as u32, end as u32)
        } else {
            let page = parse_page_value(token, page_count)?;
            if page < 1 || page > i64::from(page_count) {
                return Err(ValidationError::new(
                    ValidationCode::RangeOutOfBounds,
                    format!("Invalid page: {} (document has {} pages)", token, page_count),
                ));
            }
            PageRange::new(page as u32, page as u32)
        };

        ranges.push(range);
    }

    if ranges.is_empty() {
        return Err(ValidationError::new(
            ValidationCode::EmptyExpression,
            "Page range expression contains no pages",
        ));
    }

    Ok(ranges)
}

fn parse_page_value(value: &str, page_count: u32) -> Result<i64, ValidationError> {
    let value = value.trim();
    let lower = value.to_lowercase();
    if END_ALIASES.contains(&lower.as_str()) {
        return Ok(i64::from(page_count));
    }

    value.parse::<i64>().map_err(|_| {
        ValidationError::new(
            ValidationCode::InvalidPageValue,
            format!("Invalid page value: '{}'", value),
        )
    })
}

/// Flatten ranges into the set of pages they cover.
pub fn expand_to_page_set(ranges: &[PageRange]) -> BTreeSet<u32> {
    ranges.iter().flat_map(PageRange::pages).collect()
}
