//! Site HTTP server: contact form relay and chatbot relay.

pub mod chatbot;
pub mod contact;
pub mod mailer;

pub use chatbot::{ChatRelay, ChatReply};
pub use mailer::{Mailer, OutgoingEmail, SmtpMailer};

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// None when SMTP is not configured; the contact route then answers 500.
    pub mailer: Option<Arc<dyn Mailer>>,
    pub chat: ChatRelay,
}

impl AppState {
    pub fn from_config(config: &SiteConfig) -> Self {
        let mailer = config
            .email
            .clone()
            .map(|email| Arc::new(SmtpMailer::new(email)) as Arc<dyn Mailer>);
        Self {
            mailer,
            chat: ChatRelay::new(config.chatbot_backend_url.clone()),
        }
    }
}

/// Build the site router.
pub fn site_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/contact/route", post(contact::submit_contact))
        .route("/api/contact/chatbot/route", post(chatbot::relay_chat))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "agent-studio"
    }))
}
