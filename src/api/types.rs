//! Backend REST API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::uploads::{UploadedFile, id_string};
use crate::wizard::form::{AgentForm, MediaType};

/// List endpoints answer either with a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Plain(items) | Self::Paged { results: items } => items,
        }
    }
}

/// Row in the dashboard's agent table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conversation_count: u64,
}

/// Full agent, as needed to pre-populate the wizard in edit mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Agent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(flatten)]
    pub form: AgentForm,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One visitor conversation with an agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Conversation {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub last_message: Option<String>,
}

/// Who wrote a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    #[serde(alias = "bot")]
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationMessage {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Headline numbers for the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub total_agents: u64,
    pub active_agents: u64,
    pub total_conversations: u64,
    pub total_messages: u64,
    pub total_files: u64,
}

/// Response of the agent create/update endpoints: `{ ok, error?, id? }`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAgentResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "bot_id", deserialize_with = "opt_id_string")]
    pub id: Option<String>,
}

fn default_ok() -> bool {
    true
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_accepts_both_shapes() {
        let plain: Listing<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(plain.into_vec(), vec![1, 2]);
        let paged: Listing<u32> =
            serde_json::from_str(r#"{"count": 2, "next": null, "results": [3, 4]}"#).unwrap();
        assert_eq!(paged.into_vec(), vec![3, 4]);
    }

    #[test]
    fn agent_flattens_form_fields() {
        let json = r#"{
            "id": 12,
            "name": "Front Desk",
            "media_type": "both",
            "voice_type": "nova",
            "speaking_rate": 1.25,
            "files": [{"id": "f1", "name": "menu.pdf", "size": 10,
                       "type": "application/pdf", "uploaded_at": "2026-03-01T00:00:00Z"}]
        }"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.id, "12");
        assert_eq!(agent.form.name, "Front Desk");
        assert_eq!(agent.form.media_type, MediaType::Both);
        assert_eq!(agent.form.speaking_rate, Some(1.25));
        assert_eq!(agent.files.len(), 1);
        // Fields the backend omitted fall back to defaults.
        assert_eq!(agent.form.font, "Inter");
    }

    #[test]
    fn save_response_variants() {
        let ok: SaveAgentResponse = serde_json::from_str(r#"{"ok": true, "bot_id": 7}"#).unwrap();
        assert!(ok.ok);
        assert_eq!(ok.id.as_deref(), Some("7"));

        let failed: SaveAgentResponse =
            serde_json::from_str(r#"{"ok": false, "error": "Quota exceeded"}"#).unwrap();
        assert!(!failed.ok);
        assert_eq!(failed.error.as_deref(), Some("Quota exceeded"));
        assert!(failed.id.is_none());
    }

    #[test]
    fn message_role_accepts_bot_alias() {
        let role: MessageRole = serde_json::from_str("\"bot\"").unwrap();
        assert_eq!(role, MessageRole::Assistant);
    }
}
