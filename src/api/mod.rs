//! Backend REST API: typed client and the seam the wizard depends on.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    Agent, AgentSummary, Conversation, ConversationMessage, DashboardStats, MessageRole,
};

use async_trait::async_trait;

use crate::error::ApiError;
use crate::uploads::{StagedFile, UploadedFile};
use crate::wizard::form::AgentPayload;

/// Maximum length of a raw (non-JSON) error body surfaced to the user.
const MAX_RAW_ERROR_LEN: usize = 200;

/// Remote operations the agent wizard triggers.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Upload one knowledge file; the backend assigns its id and timestamp.
    async fn upload_file(&self, file: &StagedFile) -> Result<UploadedFile, ApiError>;

    /// Create an agent. Returns its id when the backend reports one.
    async fn create_agent(&self, payload: &AgentPayload) -> Result<Option<String>, ApiError>;

    /// Update an existing agent.
    async fn update_agent(
        &self,
        agent_id: &str,
        payload: &AgentPayload,
    ) -> Result<Option<String>, ApiError>;
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error`, `detail` and `message` in JSON bodies; otherwise returns
/// the trimmed raw text, truncated.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "detail", "message"] {
            if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    body.trim().chars().take(MAX_RAW_ERROR_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_json_keys() {
        assert_eq!(extract_error_message(r#"{"error": "Bad name"}"#), "Bad name");
        assert_eq!(
            extract_error_message(r#"{"detail": "Token expired"}"#),
            "Token expired"
        );
        assert_eq!(extract_error_message(r#"{"message": "Nope"}"#), "Nope");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        assert_eq!(extract_error_message("  Bad Gateway \n"), "Bad Gateway");
        assert_eq!(extract_error_message(""), "");
        let long = "x".repeat(500);
        assert_eq!(extract_error_message(&long).len(), MAX_RAW_ERROR_LEN);
    }
}
