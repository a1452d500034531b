//! ApiClient: typed wrappers around the backend REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::{AuthSession, User};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::uploads::{StagedFile, UploadedFile};
use crate::wizard::form::AgentPayload;

use super::types::{
    Agent, AgentSummary, Conversation, ConversationMessage, DashboardStats, Listing,
    SaveAgentResponse,
};
use super::{AgentApi, extract_error_message};

pub const CREATE_AGENT_PATH: &str = "/bots/create/";
pub const UPLOAD_FILE_PATH: &str = "/bots/files/upload/";

/// Bearer-authenticated client for the dashboard and the wizard.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: reqwest::Client,
    session: Arc<AuthSession>,
}

impl ApiClient {
    pub fn new(config: ApiConfig, session: Arc<AuthSession>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            session,
        }
    }

    fn bearer(&self) -> Result<String, ApiError> {
        self.session
            .access_token()
            .ok_or(ApiError::Unauthenticated)
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.bearer()?;
        Ok(self
            .client
            .request(method, self.config.url(path))
            .bearer_auth(token))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = builder.send().await.map_err(|e| ApiError::Network {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(path, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        resp.json::<T>().await.map_err(|e| ApiError::InvalidResponse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let builder = self.request(Method::GET, path)?;
        self.execute(path, builder).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!(path, %method, "JSON request");
        let builder = self.request(method, path)?.json(body);
        self.execute(path, builder).await
    }

    async fn save_agent(
        &self,
        method: Method,
        path: &str,
        payload: &AgentPayload,
    ) -> Result<Option<String>, ApiError> {
        let resp: SaveAgentResponse = self.send_json(method, path, payload).await?;
        if !resp.ok {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: 200,
                message: resp.error.unwrap_or_default(),
            });
        }
        Ok(resp.id)
    }

    // ── Dashboard ───────────────────────────────────────────────────

    pub async fn list_agents(&self) -> Result<Vec<AgentSummary>, ApiError> {
        let listing: Listing<AgentSummary> = self.get("/bots/").await?;
        Ok(listing.into_vec())
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError> {
        self.get(&format!("/bots/{agent_id}/")).await
    }

    pub async fn list_agent_files(&self, agent_id: &str) -> Result<Vec<UploadedFile>, ApiError> {
        let listing: Listing<UploadedFile> = self.get(&format!("/bots/{agent_id}/files/")).await?;
        Ok(listing.into_vec())
    }

    pub async fn list_conversations(&self, agent_id: &str) -> Result<Vec<Conversation>, ApiError> {
        let listing: Listing<Conversation> = self
            .get(&format!("/bots/{agent_id}/conversations/"))
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn get_conversation_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ConversationMessage>, ApiError> {
        let listing: Listing<ConversationMessage> = self
            .get(&format!("/conversations/{conversation_id}/messages/"))
            .await?;
        Ok(listing.into_vec())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/dashboard/stats/").await
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get("/b2c/me/").await
    }
}

#[async_trait]
impl AgentApi for ApiClient {
    async fn upload_file(&self, file: &StagedFile) -> Result<UploadedFile, ApiError> {
        let part = Part::bytes(file.data.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| ApiError::InvalidFile {
                name: file.name.clone(),
                reason: e.to_string(),
            })?;
        let form = Form::new().part("file", part);

        tracing::debug!(file = %file.name, size = file.size(), "Uploading file");
        let builder = self
            .request(Method::POST, UPLOAD_FILE_PATH)?
            .multipart(form);
        self.execute(UPLOAD_FILE_PATH, builder).await
    }

    async fn create_agent(&self, payload: &AgentPayload) -> Result<Option<String>, ApiError> {
        self.save_agent(Method::POST, CREATE_AGENT_PATH, payload)
            .await
    }

    async fn update_agent(
        &self,
        agent_id: &str,
        payload: &AgentPayload,
    ) -> Result<Option<String>, ApiError> {
        let path = format!("/bots/{agent_id}/update/");
        let id = self.save_agent(Method::PUT, &path, payload).await?;
        Ok(id.or_else(|| Some(agent_id.to_string())))
    }
}
