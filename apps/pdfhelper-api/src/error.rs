//! Error types for the PDF helper server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfhelper_core::{PdfHelperError, ValidationCode, ValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("At least two PDF files are required")]
    MinFiles,

    #[error("No file was uploaded")]
    FileMissing,

    #[error("Only PDF files are supported: {0}")]
    UnsupportedFile(String),

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    #[error("No Ghostscript executable found")]
    NoCompressor,

    #[error("Compression failed: {0}")]
    CompressFailed(String),

    #[error("Compression could not be started: {0}")]
    CompressException(String),

    #[error("Compression timed out after {0} seconds")]
    CompressTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error_code: &'static str,
    message: String,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MinFiles => "MIN_FILES",
            ApiError::FileMissing => "FILE_MISSING",
            ApiError::UnsupportedFile(_) => "UNSUPPORTED_FILE",
            ApiError::InvalidUpload(_) => "INVALID_UPLOAD",
            ApiError::Validation(err) => match err.code {
                ValidationCode::EmptySearchTerm => "INVALID_INPUT",
                code => code.as_str(),
            },
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::InvalidPdf(_) => "INVALID_PDF",
            ApiError::NoCompressor => "NO_COMPRESSOR",
            ApiError::CompressFailed(_) => "COMPRESS_FAILED",
            ApiError::CompressException(_) => "COMPRESS_EXCEPTION",
            ApiError::CompressTimeout(_) => "COMPRESS_TIMEOUT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CompressTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error_code: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PdfHelperError> for ApiError {
    fn from(err: PdfHelperError) -> Self {
        match err {
            PdfHelperError::Validation(err) => ApiError::Validation(err),
            PdfHelperError::ParseError(msg) => ApiError::InvalidPdf(msg),
            other => ApiError::Internal(other.into()),
        }
    }
}
