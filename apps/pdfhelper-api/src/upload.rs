//! Multipart upload handling

use axum::extract::Multipart;
use tracing::debug;

use crate::error::ApiError;

/// One uploaded file.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

fn is_pdf_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf")
}

/// Read every file part of the form, in order. Parts without a file name
/// are ignored; files not named `*.pdf` are rejected.
pub async fn read_pdf_uploads(mut multipart: Multipart) -> Result<Vec<Upload>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidUpload(format!("Failed to read multipart field: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if !is_pdf_name(&file_name) {
            return Err(ApiError::UnsupportedFile(file_name));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("Failed to read file data: {}", e)))?;
        debug!(file = %file_name, size = bytes.len(), "Received upload");

        uploads.push(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }

    Ok(uploads)
}

/// Read exactly the first uploaded PDF.
pub async fn read_single_pdf(multipart: Multipart) -> Result<Upload, ApiError> {
    read_pdf_uploads(multipart)
        .await?
        .into_iter()
        .next()
        .ok_or(ApiError::FileMissing)
}
