//! Document assembly for tailored resumes and cover letters.
//!
//! Content arrives as the LLM's light markdown. Each line is classified with
//! [`markdown::classify_line`] and rendered by the DOCX or PDF backend. Files
//! land in the configured output directory through a temp file that is
//! persisted over the target, so readers never see a half-written document.

pub mod docx;
pub mod font_metrics;
pub mod markdown;
pub mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DOCX rendering failed: {0}")]
    Docx(String),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Unsupported format '{0}', expected 'docx' or 'pdf'")]
    UnsupportedFormat(String),

    #[error("Rendering task failed: {0}")]
    Task(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Kinds and formats
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Fixed filename used by the HTTP endpoints; each call replaces the last one.
    pub fn latest_filename(self, format: DocumentFormat) -> String {
        match self {
            DocumentKind::Resume => format!("latest_resume.{}", format.extension()),
            DocumentKind::CoverLetter => format!("latest_cover_letter.{}", format.extension()),
        }
    }

    /// Unique filename used by agent tools, so concurrent runs never collide.
    pub fn unique_filename(self, format: DocumentFormat) -> String {
        let prefix = match self {
            DocumentKind::Resume => "tailored_resume",
            DocumentKind::CoverLetter => "cover_letter",
        };
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("{prefix}_{}.{}", &id[..8], format.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            DocumentFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentFormat::Pdf => "application/pdf",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            other => Err(DocumentError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// A rendered document persisted in the output directory.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DocumentGenerator {
    output_dir: PathBuf,
}

impl DocumentGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders `content` and writes it to `output_dir/filename`.
    ///
    /// Rendering and file I/O are blocking, so they run on the blocking pool.
    pub async fn generate(
        &self,
        kind: DocumentKind,
        format: DocumentFormat,
        content: String,
        filename: String,
    ) -> Result<GeneratedDocument, DocumentError> {
        let generator = self.clone();
        tokio::task::spawn_blocking(move || generator.generate_sync(kind, format, &content, &filename))
            .await
            .map_err(|e| DocumentError::Task(e.to_string()))?
    }

    pub fn generate_sync(
        &self,
        kind: DocumentKind,
        format: DocumentFormat,
        content: &str,
        filename: &str,
    ) -> Result<GeneratedDocument, DocumentError> {
        let bytes = render(kind, format, content)?;
        let path = self.write_atomic(filename, &bytes)?;
        info!(
            "Generated {:?} ({}): {} bytes at {}",
            kind,
            format.extension(),
            bytes.len(),
            path.display()
        );
        Ok(GeneratedDocument {
            path,
            filename: filename.to_string(),
            format,
            bytes,
        })
    }

    fn write_atomic(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, DocumentError> {
        std::fs::create_dir_all(&self.output_dir)?;
        let target = self.output_dir.join(filename);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| DocumentError::Io(e.error))?;
        Ok(target)
    }

    /// Resolves a user-supplied document path to an existing file inside the
    /// output directory.
    ///
    /// Tries the path relative to the output directory, then its bare
    /// filename there. Anything that resolves outside the output directory,
    /// through `..`, an absolute path, or a symlink, is rejected.
    pub fn resolve_existing(&self, path: &str) -> Option<PathBuf> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        let root = self.output_dir.canonicalize().ok()?;
        let given = PathBuf::from(path);
        let inside = |candidate: &Path| {
            candidate.is_file()
                && candidate
                    .canonicalize()
                    .is_ok_and(|real| real.starts_with(&root))
        };

        let joined = self.output_dir.join(&given);
        if inside(&joined) {
            return Some(joined);
        }
        let by_name = self.output_dir.join(given.file_name()?);
        inside(&by_name).then_some(by_name)
    }
}

/// Renders `content` into the bytes of a document file.
pub fn render(
    kind: DocumentKind,
    format: DocumentFormat,
    content: &str,
) -> Result<Vec<u8>, DocumentError> {
    match (format, kind) {
        (DocumentFormat::Docx, DocumentKind::Resume) => docx::render_resume(content),
        (DocumentFormat::Docx, DocumentKind::CoverLetter) => docx::render_cover_letter(content),
        (DocumentFormat::Pdf, DocumentKind::Resume) => pdf::render_resume(content),
        (DocumentFormat::Pdf, DocumentKind::CoverLetter) => pdf::render_cover_letter(content),
    }
}
