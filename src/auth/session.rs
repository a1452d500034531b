//! AuthSession: the current user's tokens and profile, with an explicit
//! start / teardown lifecycle.
//!
//! One session is created at application start and handed to every feature
//! that needs it (wizard, dashboard client). Only `login` and `logout` write
//! to the underlying storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::api::extract_error_message;
use crate::config::ApiConfig;
use crate::error::{ApiError, AuthError};
use crate::uploads::id_string;

use super::storage::{SessionStorage, keys};

/// Login endpoint exchanging an identity-provider credential for backend tokens.
pub const GOOGLE_LOGIN_PATH: &str = "/b2c/google/login/";

/// Where the app navigates after logout.
pub const LOGOUT_REDIRECT: &str = "/";

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    tokens: TokenPair,
    user: User,
}

/// Session context: storage plus the cached user.
pub struct AuthSession {
    api: ApiConfig,
    client: reqwest::Client,
    storage: Arc<dyn SessionStorage>,
    user: RwLock<Option<User>>,
}

impl AuthSession {
    pub fn new(api: ApiConfig, storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            api,
            client: reqwest::Client::new(),
            storage,
            user: RwLock::new(None),
        }
    }

    /// Create the session and rehydrate it from storage.
    pub async fn start(api: ApiConfig, storage: Arc<dyn SessionStorage>) -> Arc<Self> {
        let session = Arc::new(Self::new(api, storage));
        if let Some(user) = session.check_auth().await {
            tracing::info!(user_id = %user.id, "Session restored");
        }
        session
    }

    /// Drop the in-memory user. Stored tokens stay with the tab.
    pub async fn teardown(&self) {
        *self.user.write().await = None;
        tracing::debug!("Session torn down");
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(keys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.storage.get(keys::REFRESH_TOKEN)
    }

    /// Exchange an opaque identity-provider credential for backend tokens.
    pub async fn login(&self, credential: &str) -> Result<User, AuthError> {
        let url = self.api.url(GOOGLE_LOGIN_PATH);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "credential": credential }))
            .send()
            .await
            .map_err(|e| ApiError::Network {
                path: GOOGLE_LOGIN_PATH.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ApiError::Network {
            path: GOOGLE_LOGIN_PATH.to_string(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Login rejected by backend");
            let message = extract_error_message(&body);
            return Err(AuthError::LoginRejected(if message.is_empty() {
                format!("status {}", status.as_u16())
            } else {
                message
            }));
        }

        let parsed: LoginResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
                path: GOOGLE_LOGIN_PATH.to_string(),
                reason: e.to_string(),
            })?;

        let user_json = serde_json::to_string(&parsed.user).map_err(|e| {
            AuthError::Corrupted(format!("failed to serialize user profile: {e}"))
        })?;

        self.storage.set(keys::ACCESS_TOKEN, parsed.tokens.access);
        self.storage.set(keys::REFRESH_TOKEN, parsed.tokens.refresh);
        self.storage.set(keys::USER, user_json);
        *self.user.write().await = Some(parsed.user.clone());

        tracing::info!(user_id = %parsed.user.id, "User logged in");
        Ok(parsed.user)
    }

    /// Clear tokens and profile. Returns the redirect target.
    pub async fn logout(&self) -> &'static str {
        self.clear_storage();
        *self.user.write().await = None;
        tracing::info!("User logged out");
        LOGOUT_REDIRECT
    }

    /// Rehydrate the user from storage.
    ///
    /// A missing token or an unreadable profile counts as signed out, and the
    /// storage is cleared.
    pub async fn check_auth(&self) -> Option<User> {
        let token = self.storage.get(keys::ACCESS_TOKEN);
        let raw_user = self.storage.get(keys::USER);

        let user = match (token, raw_user) {
            (Some(_), Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored user profile unreadable, clearing session");
                    None
                }
            },
            _ => None,
        };

        if user.is_none() {
            self.clear_storage();
        }
        *self.user.write().await = user.clone();
        user
    }

    fn clear_storage(&self) {
        for key in keys::ALL {
            self.storage.remove(key);
        }
    }
}
