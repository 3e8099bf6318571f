//! HTTP handlers for the PDF helper server
//!
//! Each PDF operation runs on the blocking pool; handlers only read the
//! upload, validate query options and shape the response.

use std::io::{Cursor, Write};

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use pdfhelper_core::{
    find_text, merge_documents, redact_text, replace_text, rotate_pages, split_by_ranges,
    FindReport, MatchOptions, PdfWordExtractor, SplitPart,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compress::compress_pdf;
use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{read_pdf_uploads, read_single_pdf};

const PDF: &str = "application/pdf";
const ZIP: &str = "application/zip";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdfhelper-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct SplitQuery {
    #[serde(default)]
    pub ranges: String,
}

#[derive(Debug, Deserialize)]
pub struct RotateQuery {
    #[serde(default)]
    pub pages: String,
    pub angle: i64,
}

#[derive(Debug, Deserialize)]
pub struct CompressQuery {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "standard".to_string()
}

/// Query options shared by the text endpoints
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextQuery {
    #[serde(default)]
    pub find: String,
    #[serde(default)]
    pub replace: String,
    #[serde(default)]
    pub match_case: bool,
    #[serde(default = "default_whole_word")]
    pub whole_word: bool,
    pub padding: Option<f64>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
}

fn default_whole_word() -> bool {
    true
}

impl TextQuery {
    fn search_term(&self) -> Result<String, ApiError> {
        if self.find.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "Search text must not be empty".to_string(),
            ));
        }
        Ok(self.find.clone())
    }

    fn options(&self) -> MatchOptions {
        let defaults = MatchOptions::default();
        MatchOptions {
            match_case: self.match_case,
            whole_word: self.whole_word,
            padding: self.padding.unwrap_or(defaults.padding),
            font_family: self.font_family.clone(),
            font_size: self.font_size.unwrap_or(defaults.font_size),
        }
    }
}

/// Run CPU-bound PDF work off the async runtime.
async fn run_blocking<T, E, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    ApiError: From<E>,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("PDF worker failed: {}", e)))?
        .map_err(ApiError::from)
}

fn file_response(bytes: Vec<u8>, content_type: &'static str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Pack split parts into one ZIP, entries named by their range.
fn bundle_parts(parts: &[SplitPart]) -> zip::result::ZipResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (index, part) in parts.iter().enumerate() {
            writer.start_file(part.file_name(index + 1), options)?;
            writer.write_all(&part.bytes)?;
        }
        writer.finish()?;
    }
    Ok(buffer)
}

/// Handler: POST /api/merge
pub async fn handle_merge(multipart: Multipart) -> Result<Response, ApiError> {
    let uploads = read_pdf_uploads(multipart).await?;
    if uploads.len() < 2 {
        return Err(ApiError::MinFiles);
    }

    let count = uploads.len();
    let documents: Vec<Vec<u8>> = uploads.into_iter().map(|u| u.bytes).collect();
    let merged = run_blocking(move || merge_documents(documents)).await?;

    info!(files = count, size = merged.len(), "Merged PDFs");
    Ok(file_response(merged, PDF, "merged.pdf"))
}

/// Handler: POST /api/split
pub async fn handle_split(
    Query(query): Query<SplitQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_single_pdf(multipart).await?;
    let file_name = upload.file_name;

    let (parts, archive) = run_blocking(move || -> Result<(usize, Vec<u8>), ApiError> {
        let parts = split_by_ranges(&upload.bytes, &query.ranges)?;
        let archive = bundle_parts(&parts)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to build ZIP: {}", e)))?;
        Ok((parts.len(), archive))
    })
    .await?;

    info!(file = %file_name, parts, "Split PDF");
    Ok(file_response(archive, ZIP, "parts.zip"))
}

/// Handler: POST /api/rotate
pub async fn handle_rotate(
    Query(query): Query<RotateQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_single_pdf(multipart).await?;
    let file_name = upload.file_name;
    let angle = query.angle;

    let rotated =
        run_blocking(move || rotate_pages(&upload.bytes, &query.pages, query.angle)).await?;

    info!(file = %file_name, angle, "Rotated PDF");
    Ok(file_response(rotated, PDF, "rotated.pdf"))
}

/// Handler: POST /api/compress
pub async fn handle_compress(
    State(state): State<AppState>,
    Query(query): Query<CompressQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_single_pdf(multipart).await?;
    let ghostscript = state.ghostscript().ok_or(ApiError::NoCompressor)?;

    let compressed = compress_pdf(
        state.store(),
        ghostscript,
        &upload.bytes,
        &query.level,
        state.compress_timeout(),
    )
    .await?;

    info!(file = %upload.file_name, level = %query.level, "Compressed upload");
    Ok(file_response(compressed, PDF, "compressed.pdf"))
}

/// Handler: POST /api/text/replace
pub async fn handle_text_replace(
    Query(query): Query<TextQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let find = query.search_term()?;
    let upload = read_single_pdf(multipart).await?;
    let options = query.options();
    let replacement = query.replace;

    let outcome = run_blocking(move || {
        replace_text(&upload.bytes, &find, &replacement, &options, &PdfWordExtractor)
    })
    .await?;

    info!(matches = outcome.matches, "Replaced text");
    Ok(file_response(outcome.bytes, PDF, "text-replaced.pdf"))
}

/// Handler: POST /api/text/redact
pub async fn handle_text_redact(
    Query(query): Query<TextQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let find = query.search_term()?;
    let upload = read_single_pdf(multipart).await?;
    let options = query.options();

    let outcome =
        run_blocking(move || redact_text(&upload.bytes, &find, &options, &PdfWordExtractor))
            .await?;

    info!(matches = outcome.matches, "Redacted text");
    Ok(file_response(outcome.bytes, PDF, "text-redacted.pdf"))
}

/// Handler: POST /api/text/find
pub async fn handle_text_find(
    Query(query): Query<TextQuery>,
    multipart: Multipart,
) -> Result<Json<FindReport>, ApiError> {
    let find = query.search_term()?;
    let upload = read_single_pdf(multipart).await?;
    let options = query.options();

    let report =
        run_blocking(move || find_text(&upload.bytes, &find, &options, &PdfWordExtractor)).await?;

    info!(total = report.total, pages = report.pages.len(), "Searched text");
    Ok(Json(report))
}
