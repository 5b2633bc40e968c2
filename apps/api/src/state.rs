use std::sync::Arc;

use crate::agent::CareerAgent;
use crate::config::Config;
use crate::documents::DocumentGenerator;
use crate::email::EmailService;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` without `GEMINI_API_KEY`; AI endpoints then answer 503.
    pub llm: Option<LlmClient>,
    pub documents: DocumentGenerator,
    /// `None` unless SMTP sender credentials are configured.
    pub email: Option<Arc<EmailService>>,
    pub agent: Option<Arc<CareerAgent>>,
}
