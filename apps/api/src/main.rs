mod agent;
mod analysis;
mod config;
mod documents;
mod email;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::agent::tools::ToolServices;
use crate::agent::CareerAgent;
use crate::config::Config;
use crate::documents::DocumentGenerator;
use crate::email::EmailService;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Assistant API v{}", env!("CARGO_PKG_VERSION"));

    let documents = DocumentGenerator::new(config.output_dir.clone());
    info!("Generated documents go to {}", documents.output_dir().display());

    let llm = match &config.gemini_api_key {
        Some(key) => {
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(LlmClient::new(key.clone()))
        }
        None => {
            warn!("GEMINI_API_KEY not set; AI endpoints will answer 503");
            None
        }
    };

    let email = match &config.smtp {
        Some(smtp) => match EmailService::new(smtp) {
            Ok(service) => {
                info!("Email service initialized ({}:{})", smtp.server, smtp.port);
                Some(Arc::new(service))
            }
            Err(e) => {
                warn!("Email service disabled: {e}");
                None
            }
        },
        None => {
            warn!("SENDER_EMAIL/SENDER_PASSWORD not set; email sending disabled");
            None
        }
    };

    let agent = llm.clone().map(|llm| {
        let agent = CareerAgent::new(ToolServices {
            llm,
            documents: documents.clone(),
            email: email.clone(),
        });
        info!("Career agent initialized with {} tools", agent.tools().len());
        Arc::new(agent)
    });

    let state = AppState {
        config: config.clone(),
        llm,
        documents,
        email,
        agent,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS for the configured frontend origins. Unparseable origins are skipped.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
