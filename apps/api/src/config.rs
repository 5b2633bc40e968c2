use std::path::PathBuf;

use anyhow::{Context, Result};

/// SMTP settings. Only present when both sender credentials are configured.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub sender_email: String,
    pub sender_password: String,
}

/// Application configuration loaded from environment variables.
///
/// Only malformed values are fatal. A missing `GEMINI_API_KEY` or missing SMTP
/// credentials disable the dependent endpoints instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub output_dir: PathBuf,
    pub evaluation_dir: PathBuf,
    pub cors_origins: Vec<String>,
    pub smtp: Option<SmtpConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_dir: optional_env("OUTPUT_DIR")
                .unwrap_or_else(|| "generated".to_string())
                .into(),
            evaluation_dir: optional_env("EVALUATION_DIR")
                .unwrap_or_else(|| "evaluation_results".to_string())
                .into(),
            cors_origins: parse_origins(
                &optional_env("CORS_ORIGINS")
                    .unwrap_or_else(|| "http://localhost:3000,http://localhost:3001".to_string()),
            ),
            smtp: smtp_from_env()?,
        })
    }
}

fn smtp_from_env() -> Result<Option<SmtpConfig>> {
    let (Some(sender_email), Some(sender_password)) =
        (optional_env("SENDER_EMAIL"), optional_env("SENDER_PASSWORD"))
    else {
        return Ok(None);
    };

    Ok(Some(SmtpConfig {
        server: optional_env("SMTP_SERVER").unwrap_or_else(|| "smtp.gmail.com".to_string()),
        port: optional_env("SMTP_PORT")
            .unwrap_or_else(|| "587".to_string())
            .parse::<u16>()
            .context("SMTP_PORT must be a valid port number")?,
        sender_email,
        sender_password,
    }))
}

/// Reads an env var, treating empty values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
