//! Command-line and environment configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command-line arguments for the PDF helper server
///
/// Every option can also be set through a `PDFHELPER_*` environment
/// variable, or a `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfhelper-api")]
#[command(about = "HTTP service for merging, splitting, rotating, compressing and editing PDFs")]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "PDFHELPER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PDFHELPER_PORT", default_value = "3000")]
    pub port: u16,

    /// Directory for uploaded and generated files [default: <temp dir>/pdfhelper]
    #[arg(long, env = "PDFHELPER_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Seconds between temp-file cleanup sweeps
    #[arg(long, env = "PDFHELPER_CLEANUP_INTERVAL_SECS", default_value = "30")]
    pub cleanup_interval_secs: u64,

    /// Temp files older than this many seconds are deleted
    #[arg(long, env = "PDFHELPER_CLEANUP_MAX_AGE_SECS", default_value = "120")]
    pub cleanup_max_age_secs: u64,

    /// Ghostscript executable used for compression [default: auto-detect]
    #[arg(long, env = "PDFHELPER_GHOSTSCRIPT")]
    pub ghostscript: Option<PathBuf>,

    /// Compression time limit in seconds
    #[arg(long, env = "PDFHELPER_COMPRESS_TIMEOUT_SECS", default_value = "120")]
    pub compress_timeout_secs: u64,

    /// Maximum request body size in megabytes
    #[arg(long, env = "PDFHELPER_MAX_UPLOAD_MB", default_value = "64")]
    pub max_upload_mb: usize,

    /// Directory of static files served for any other path
    #[arg(long, env = "PDFHELPER_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("pdfhelper"))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn cleanup_max_age(&self) -> Duration {
        Duration::from_secs(self.cleanup_max_age_secs)
    }

    pub fn compress_timeout(&self) -> Duration {
        Duration::from_secs(self.compress_timeout_secs)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}
