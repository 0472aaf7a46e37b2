//! Document intake: temp-file handling for uploads, PDF text extraction,
//! chunking and CSV loading.

pub mod chunker;
pub mod tabular;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use uuid::Uuid;

/// An uploaded file spilled to disk under a per-request unique name.
/// The file is removed when the guard drops, on every exit path.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn write(extension: &str, bytes: &[u8]) -> Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "aidesk_upload_{}.{}",
            Uuid::new_v4().simple(),
            extension
        ));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write upload to {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Spilled upload to temp file");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if self.path.exists() {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove temp upload");
            }
        }
    }
}

/// Extract the text of a PDF file, one trimmed non-empty line per input line.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read PDF: {}", path.display()))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;

    let cleaned = text
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if cleaned.is_empty() {
        bail!(
            "PDF {} contains no extractable text (it may be scanned images)",
            path.display()
        );
    }

    Ok(cleaned)
}
