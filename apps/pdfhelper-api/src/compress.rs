//! Ghostscript-backed compression

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::storage::{remove_if_exists, TempStore};

const EXECUTABLE_NAMES: [&str; 3] = ["gswin64c", "gswin32c", "gs"];
const FALLBACK_PATH: &str = "/usr/bin/gs";

/// Locate a Ghostscript executable.
///
/// A configured path wins if it exists. Otherwise `PATH` is searched for the
/// console binaries, then the usual Unix install location.
pub fn find_ghostscript(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!("Configured Ghostscript {} does not exist", path.display());
    }

    let search_path = std::env::var_os("PATH").unwrap_or_default();
    for dir in std::env::split_paths(&search_path) {
        for name in EXECUTABLE_NAMES {
            let candidate = dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    let fallback = PathBuf::from(FALLBACK_PATH);
    fallback.is_file().then_some(fallback)
}

/// Map a compression level to a `-dPDFSETTINGS` preset.
pub fn preset_for_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "low" | "screen" => "/screen",
        "high" | "prepress" => "/prepress",
        _ => "/ebook",
    }
}

fn ghostscript_args(preset: &str, input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-sDEVICE=pdfwrite".to_string(),
        "-dCompatibilityLevel=1.5".to_string(),
        "-dNOPAUSE".to_string(),
        "-dQUIET".to_string(),
        "-dBATCH".to_string(),
        format!("-dPDFSETTINGS={}", preset),
        format!("-sOutputFile={}", output.display()),
        input.display().to_string(),
    ]
}

/// Compress `bytes` with Ghostscript at the given level.
///
/// Input and output live in the temp store for the duration of the call and
/// are removed afterwards whatever the outcome.
pub async fn compress_pdf(
    store: &TempStore,
    ghostscript: &Path,
    bytes: &[u8],
    level: &str,
    limit: Duration,
) -> Result<Vec<u8>, ApiError> {
    let input = store.allocate("compress-in", ".pdf");
    let output = store.allocate("compress-out", ".pdf");

    let result = run_ghostscript(ghostscript, bytes, level, &input, &output, limit).await;

    for path in [&input, &output] {
        if let Err(err) = remove_if_exists(path) {
            warn!("Failed to remove {}: {}", path.display(), err);
        }
    }

    result
}

async fn run_ghostscript(
    ghostscript: &Path,
    bytes: &[u8],
    level: &str,
    input: &Path,
    output: &Path,
    limit: Duration,
) -> Result<Vec<u8>, ApiError> {
    tokio::fs::write(input, bytes)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to write temp input: {}", e)))?;

    let preset = preset_for_level(level);
    debug!("Running {} with preset {}", ghostscript.display(), preset);

    let child = Command::new(ghostscript)
        .args(ghostscript_args(preset, input, output))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ApiError::CompressException(e.to_string()))?;

    // Dropping the child on timeout kills the process.
    let finished = tokio::time::timeout(limit, child.wait_with_output())
        .await
        .map_err(|_| ApiError::CompressTimeout(limit.as_secs()))?
        .map_err(|e| ApiError::CompressException(e.to_string()))?;

    if !finished.status.success() || !output.is_file() {
        let stderr = String::from_utf8_lossy(&finished.stderr).trim().to_string();
        return Err(ApiError::CompressFailed(format!(
            "Ghostscript exited with {}: {}",
            finished.status, stderr
        )));
    }

    let compressed = tokio::fs::read(output)
        .await
        .map_err(|e| ApiError::CompressFailed(format!("Cannot read output: {}", e)))?;

    info!(
        input = bytes.len(),
        output = compressed.len(),
        preset,
        "Compressed PDF"
    );
    Ok(compressed)
}
