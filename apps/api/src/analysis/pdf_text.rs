//! Plain-text extraction from PDF uploads and files.
//!
//! `pdf-extract` is synchronous and may panic on malformed input, so every call
//! runs inside `spawn_blocking`; a panic surfaces as a join error.

use std::path::PathBuf;

use bytes::Bytes;
use tracing::warn;

use crate::errors::AppError;

pub async fn extract_text_from_bytes(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Pdf(format!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(normalize(&text))
}

pub async fn extract_text_from_path(path: PathBuf) -> Result<String, AppError> {
    if !path.is_file() {
        return Err(AppError::NotFound(format!("File not found: {}", path.display())));
    }
    let shown = path.display().to_string();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text(&path))
        .await
        .map_err(|e| AppError::Pdf(format!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Pdf(format!("{shown}: {e}")))?;
    let text = normalize(&text);
    if text.is_empty() {
        warn!("No text extracted from {shown}");
    }
    Ok(text)
}

/// Trims every line and collapses runs of blank lines into one.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            blank_run = true;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        out.push_str(line);
        blank_run = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_lines() {
        let raw = "\n\n  Jane Doe  \n\n\n\nEngineer\nRust\n\n";
        assert_eq!(normalize(raw), "Jane Doe\n\nEngineer\nRust");
    }

    #[test]
    fn test_normalize_whitespace_only_is_empty() {
        assert_eq!(normalize(" \n\t\n "), "");
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_a_pdf_error() {
        let err = extract_text_from_bytes(Bytes::from_static(b"definitely not a pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Pdf(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = extract_text_from_path(PathBuf::from("invalid/nonexistent_file.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unreadable_file_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let err = extract_text_from_path(path.clone()).await.unwrap_err();
        match err {
            AppError::Pdf(msg) => assert!(msg.contains(&path.display().to_string())),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
