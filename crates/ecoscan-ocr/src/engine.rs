//! OCR engines.
//!
//! The trait keeps the HTTP service independent of the actual OCR backend;
//! the only production implementation shells out to the `tesseract` binary.

use crate::error::{OcrError, OcrResult};
use async_trait::async_trait;
use ecoscan_config::OcrConfig;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Text recognition over raw image bytes
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Extract text from an image
    async fn recognize(&self, image: &[u8]) -> OcrResult<String>;
}

/// Engine invoking the Tesseract CLI.
///
/// The image is staged in a temp file because Tesseract wants a path; output
/// goes to stdout. Languages and the binary path come from config
/// (`TESSERACT_CMD` overrides the latter).
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            binary: config.tesseract_cmd.clone(),
            language: config.language.clone(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    async fn recognize(&self, image: &[u8]) -> OcrResult<String> {
        // NamedTempFile is sync; creation and the write are small enough to
        // do inline before handing the path to the subprocess.
        let staged = tempfile::NamedTempFile::new()?;
        let mut file = tokio::fs::File::create(staged.path()).await?;
        file.write_all(image).await?;
        file.flush().await?;

        debug!(binary = ?self.binary, language = %self.language, "Running tesseract");

        let output = Command::new(&self.binary)
            .arg(staged.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| OcrError::Spawn(format!("{}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
