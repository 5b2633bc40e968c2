use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::analysis::pdf_text::extract_text_from_bytes;
use crate::analysis::pipeline::{run_analysis, AnalysisResult};
use crate::analysis::tailoring::{generate_cover_letter, generate_tailored_resume};
use crate::documents::{DocumentFormat, DocumentKind};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::state::AppState;

/// A PDF file field from a multipart form.
#[derive(Debug)]
struct PdfUpload {
    filename: String,
    bytes: Bytes,
}

/// Fields shared by the analysis and generation endpoints.
#[derive(Debug, Default)]
struct DocumentForm {
    resume: Option<PdfUpload>,
    job_description: Option<PdfUpload>,
    format: Option<String>,
}

/// Extracted texts of a validated form.
#[derive(Debug)]
struct FormTexts {
    resume_text: String,
    job_text: String,
}

async fn read_form(mut multipart: Multipart) -> Result<DocumentForm, AppError> {
    let mut form = DocumentForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" | "job_description" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read {name}: {e}")))?;
                let upload = Some(PdfUpload { filename, bytes });
                if name == "resume" {
                    form.resume = upload;
                } else {
                    form.job_description = upload;
                }
            }
            "format" => {
                form.format = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Could not read format: {e}")))?,
                );
            }
            _ => {}
        }
    }
    Ok(form)
}

fn require_pdf(upload: Option<PdfUpload>, label: &str) -> Result<PdfUpload, AppError> {
    let upload = upload.ok_or_else(|| AppError::Validation(format!("{label} file is required")))?;
    if !upload.filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation(format!("{label} must be a PDF file")));
    }
    Ok(upload)
}

fn require_llm(state: &AppState) -> Result<&LlmClient, AppError> {
    state.llm.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable(
            "AI service not configured. Please set GEMINI_API_KEY".to_string(),
        )
    })
}

/// Validates both uploads and extracts their text.
async fn extract_texts(form: DocumentForm) -> Result<FormTexts, AppError> {
    let resume = require_pdf(form.resume, "Resume")?;
    let job = require_pdf(form.job_description, "Job description")?;

    info!("Extracting text from PDFs...");
    let (resume_text, job_text) = tokio::try_join!(
        extract_text_from_bytes(resume.bytes),
        extract_text_from_bytes(job.bytes),
    )?;
    if resume_text.is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from resume".to_string(),
        ));
    }
    if job_text.is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from job description".to_string(),
        ));
    }
    Ok(FormTexts {
        resume_text,
        job_text,
    })
}

/// POST /api/upload-and-analyze
pub async fn handle_upload_and_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let form = read_form(multipart).await?;
    let llm = require_llm(&state)?;
    let texts = extract_texts(form).await?;
    let result = run_analysis(&texts.resume_text, &texts.job_text, llm).await?;
    Ok(Json(result))
}

/// POST /api/generate-resume
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    generate_document(state, multipart, DocumentKind::Resume).await
}

/// POST /api/generate-cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    generate_document(state, multipart, DocumentKind::CoverLetter).await
}

async fn generate_document(
    state: AppState,
    multipart: Multipart,
    kind: DocumentKind,
) -> Result<Response, AppError> {
    let mut form = read_form(multipart).await?;
    let format = match form.format.take() {
        Some(raw) => raw
            .parse::<DocumentFormat>()
            .map_err(|_| AppError::Validation("Format must be 'docx' or 'pdf'".to_string()))?,
        None => DocumentFormat::default(),
    };
    let llm = require_llm(&state)?;
    let texts = extract_texts(form).await?;

    info!("Generating {:?} ({})...", kind, format.extension());
    let content = match kind {
        DocumentKind::Resume => {
            generate_tailored_resume(&texts.resume_text, &texts.job_text, llm).await?
        }
        DocumentKind::CoverLetter => {
            generate_cover_letter(&texts.resume_text, &texts.job_text, llm).await?
        }
    };

    let filename = kind.latest_filename(format);
    let document = state
        .documents
        .generate(kind, format, content, filename)
        .await?;

    Ok(file_response(document.format, &document.filename, document.bytes))
}

fn file_response(format: DocumentFormat, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, format.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn upload(filename: &str) -> Option<PdfUpload> {
        Some(PdfUpload {
            filename: filename.to_string(),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        })
    }

    #[test]
    fn test_require_pdf_accepts_any_case_extension() {
        assert!(require_pdf(upload("resume.PDF"), "Resume").is_ok());
        assert!(require_pdf(upload("resume.pdf"), "Resume").is_ok());
    }

    #[test]
    fn test_require_pdf_rejects_other_files() {
        let err = require_pdf(upload("resume.docx"), "Resume").unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Resume must be a PDF file"));
        assert!(require_pdf(None, "Resume").is_err());
    }

    #[tokio::test]
    async fn test_extract_texts_validates_before_parsing() {
        let form = DocumentForm {
            resume: upload("cv.pdf"),
            job_description: upload("job.txt"),
            format: None,
        };
        let err = extract_texts(form).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_file_response_headers() {
        let response = file_response(DocumentFormat::Pdf, "latest_resume.pdf", b"%PDF".to_vec());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"latest_resume.pdf\""
        );
    }
}
