use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::documents::DocumentGenerator;
use crate::email::{validate_email, ApplicationEmail};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub resume_path: Option<String>,
    #[serde(default)]
    pub cover_letter_path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
}

/// Resolves the requested attachment paths, dropping any that do not exist.
pub fn resolve_attachments(documents: &DocumentGenerator, paths: &[Option<&str>]) -> Vec<PathBuf> {
    paths
        .iter()
        .flatten()
        .filter_map(|path| {
            let resolved = documents.resolve_existing(path);
            match &resolved {
                Some(found) => info!("Attachment found: {}", found.display()),
                None => warn!("File not found at path: {path}"),
            }
            resolved
        })
        .collect()
}

/// POST /api/send-email
pub async fn handle_send_email(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<EmailResponse>, AppError> {
    let email = state.email.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable(
            "Email not configured. Please set SENDER_EMAIL and SENDER_PASSWORD".to_string(),
        )
    })?;

    if !validate_email(&req.recipient_email) {
        return Err(AppError::Validation(
            "Invalid recipient email address".to_string(),
        ));
    }

    let attachments = resolve_attachments(
        &state.documents,
        &[req.resume_path.as_deref(), req.cover_letter_path.as_deref()],
    );
    if attachments.is_empty() {
        return Err(AppError::Validation(format!(
            "No valid attachments found. Resume path: {}, Cover letter path: {}",
            req.resume_path.as_deref().unwrap_or("-"),
            req.cover_letter_path.as_deref().unwrap_or("-"),
        )));
    }

    info!("Sending application email to {}", req.recipient_email);
    email
        .send(&ApplicationEmail {
            recipient: req.recipient_email,
            subject: req.subject,
            body: req.body,
            attachments,
        })
        .await?;

    Ok(Json(EmailResponse {
        success: true,
        message: "Application email sent successfully!".to_string(),
    }))
}
