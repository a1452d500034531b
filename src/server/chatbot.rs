//! POST /api/contact/chatbot/route: forwards widget messages to the chat backend.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::AppState;
use crate::error::RelayError;

pub const RELAY_FAILED_ERROR: &str = "Failed to process your request";

/// Cookie carrying the visitor's chat session.
pub const SESSION_COOKIE: &str = "session_id";

const RELAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct ChatbotRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// What the chat backend answers, passed through to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(rename = "type", default = "default_reply_type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

fn default_reply_type() -> String {
    "text".to_string()
}

/// HTTP client pointed at the chat backend.
#[derive(Clone)]
pub struct ChatRelay {
    client: reqwest::Client,
    backend_url: String,
}

impl ChatRelay {
    pub fn new(backend_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client for chat relay");
                reqwest::Client::new()
            });
        Self {
            client,
            backend_url: backend_url.into(),
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    pub async fn forward(&self, message: &str, session_id: &str) -> Result<ChatReply, RelayError> {
        let resp = self
            .client
            .post(&self.backend_url)
            .json(&serde_json::json!({
                "message": message,
                "session_id": session_id,
            }))
            .send()
            .await
            .map_err(|e| RelayError::Unreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RelayError::Status(status.as_u16()));
        }

        resp.json::<ChatReply>()
            .await
            .map_err(|e| RelayError::InvalidResponse(e.to_string()))
    }
}

/// Visitor session id from the request cookies, if one is set.
fn session_from(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(Some(SameSite::Lax));
    cookie
}

fn relay_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": RELAY_FAILED_ERROR })),
    )
        .into_response()
}

pub async fn relay_chat(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<ChatbotRequest>, JsonRejection>,
) -> Response {
    let message = match payload {
        Ok(Json(ChatbotRequest {
            message: Some(message),
        })) if !message.trim().is_empty() => message,
        Ok(_) => {
            warn!("Chatbot request without a message");
            return relay_failed();
        }
        Err(e) => {
            warn!(error = %e, "Unreadable chatbot request body");
            return relay_failed();
        }
    };

    let (session_id, minted) = match session_from(&jar) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    debug!(session_id = %session_id, "Relaying chat message");
    let reply = match state.chat.forward(&message, &session_id).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                error = %e,
                session_id = %session_id,
                backend = state.chat.backend_url(),
                "Chat relay failed"
            );
            return relay_failed();
        }
    };

    if minted {
        (jar.add(session_cookie(session_id)), Json(reply)).into_response()
    } else {
        Json(reply).into_response()
    }
}
