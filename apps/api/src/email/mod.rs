//! SMTP delivery of application emails with document attachments.
//!
//! Uses a STARTTLS relay authenticated with the configured sender account.
//! Attachments that no longer exist on disk are skipped with a warning.

pub mod handlers;

use std::path::{Path, PathBuf};

use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::SmtpConfig;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Could not read attachment {path}: {source}")]
    Attachment {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Basic syntactic check of an email address.
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// A ready-to-send application email.
#[derive(Debug, Clone)]
pub struct ApplicationEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl EmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)?
            .port(config.port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .build();
        Ok(Self {
            transport,
            sender: config.sender_email.clone(),
        })
    }

    pub async fn send(&self, email: &ApplicationEmail) -> Result<(), EmailError> {
        let attachments = load_attachments(&email.attachments).await?;
        let message = build_message(&self.sender, email, attachments)?;
        self.transport.send(message).await?;
        info!("Email sent successfully to {}", email.recipient);
        Ok(())
    }
}

/// Reads every existing attachment; missing files are skipped.
async fn load_attachments(paths: &[PathBuf]) -> Result<Vec<(String, Vec<u8>)>, EmailError> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_file() {
            warn!("Attachment not found: {}", path.display());
            continue;
        }
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| EmailError::Attachment {
                path: path.display().to_string(),
                source,
            })?;
        loaded.push((attachment_name(path), bytes));
    }
    Ok(loaded)
}

fn attachment_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string())
}

/// Assembles a multipart message: plain-text body followed by
/// `application/octet-stream` attachments.
fn build_message(
    sender: &str,
    email: &ApplicationEmail,
    attachments: Vec<(String, Vec<u8>)>,
) -> Result<Message, EmailError> {
    if !validate_email(&email.recipient) {
        return Err(EmailError::InvalidAddress(email.recipient.clone()));
    }
    let from: Mailbox = sender
        .parse()
        .map_err(|_| EmailError::InvalidAddress(sender.to_string()))?;
    let to: Mailbox = email
        .recipient
        .parse()
        .map_err(|_| EmailError::InvalidAddress(email.recipient.clone()))?;

    let octet_stream = ContentType::parse("application/octet-stream")
        .unwrap_or(ContentType::TEXT_PLAIN);
    let body = attachments.into_iter().fold(
        MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone())),
        |multipart, (name, bytes)| {
            multipart.singlepart(Attachment::new(name).body(bytes, octet_stream.clone()))
        },
    );

    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(recipient: &str) -> ApplicationEmail {
        ApplicationEmail {
            recipient: recipient.to_string(),
            subject: "Application: Backend Engineer".to_string(),
            body: "Please find my resume attached.".to_string(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jane.doe+jobs@example.co.uk"));
        assert!(validate_email("a_b%c@sub-domain.example.io"));
        assert!(!validate_email("jane@example"));
        assert!(!validate_email("jane example.com"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("jane@example.c"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_build_message_includes_body_and_attachments() {
        let attachments = vec![("latest_resume.pdf".to_string(), b"%PDF-1.3".to_vec())];
        let message = build_message("me@example.com", &email("hr@acme.test"), attachments).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Application: Backend Engineer"));
        assert!(raw.contains("To: hr@acme.test"));
        assert!(raw.contains("Please find my resume attached."));
        assert!(raw.contains("latest_resume.pdf"));
        assert!(raw.contains("application/octet-stream"));
    }

    #[test]
    fn test_build_message_rejects_invalid_recipient() {
        let err = build_message("me@example.com", &email("not-an-email"), Vec::new()).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_missing_attachments_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("latest_cover_letter.docx");
        std::fs::write(&present, b"PK").unwrap();
        let missing = dir.path().join("gone.pdf");

        let loaded = load_attachments(&[present, missing]).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].0, "latest_cover_letter.docx");
        assert_eq!(loaded[0].1, b"PK");
    }
}
