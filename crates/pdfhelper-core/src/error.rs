use std::fmt;

use thiserror::Error;

/// Machine-readable reason a request was rejected before any document work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    EmptyExpression,
    InvalidPageValue,
    RangeOutOfBounds,
    EmptySearchTerm,
    AngleInvalid,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::EmptyExpression => "EMPTY_EXPRESSION",
            ValidationCode::InvalidPageValue => "INVALID_PAGE_VALUE",
            ValidationCode::RangeOutOfBounds => "RANGE_OUT_OF_BOUNDS",
            ValidationCode::EmptySearchTerm => "EMPTY_SEARCH_TERM",
            ValidationCode::AngleInvalid => "ANGLE_INVALID",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum PdfHelperError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Text extraction failed: {0}")]
    ExtractionError(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

impl From<lopdf::Error> for PdfHelperError {
    fn from(err: lopdf::Error) -> Self {
        PdfHelperError::OperationError(err.to_string())
    }
}
