//! Configuration types, built from environment variables.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default backend REST API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default chat backend address the chatbot relay forwards to.
pub const DEFAULT_CHATBOT_BACKEND_URL: &str = "http://localhost:8000/chat/";

/// Default SMTP relay host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Backend REST API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without trailing slash.
    pub base_url: String,
    /// OAuth client id handed to the identity SDK.
    pub google_client_id: Option<String>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            google_client_id: None,
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("NEXT_PUBLIC_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self {
            base_url: normalize_base_url(&base_url),
            google_client_id: std::env::var("NEXT_PUBLIC_GOOGLE_CLIENT_ID")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    /// Join an API path (starting with `/`) onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// SMTP settings for the contact form relay.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: SecretString,
    pub from_address: String,
    pub to_address: String,
}

impl EmailConfig {
    /// Build config from environment variables.
    /// Returns `Ok(None)` if `EMAIL_USER` is not set (contact relay disabled).
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(username) = std::env::var("EMAIL_USER").ok().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let password = std::env::var("EMAIL_PASSWORD").unwrap_or_default();

        let smtp_host =
            std::env::var("EMAIL_SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = match std::env::var("EMAIL_SMTP_PORT") {
            Ok(raw) => parse_port("EMAIL_SMTP_PORT", &raw)?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        let from_address = std::env::var("EMAIL_FROM").unwrap_or_else(|_| username.clone());
        let to_address = std::env::var("EMAIL_TO").unwrap_or_else(|_| username.clone());

        Ok(Some(Self {
            smtp_host,
            smtp_port,
            username,
            password: SecretString::from(password),
            from_address,
            to_address,
        }))
    }
}

/// Everything the site server needs at startup.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub port: u16,
    pub api: ApiConfig,
    pub email: Option<EmailConfig>,
    pub chatbot_backend_url: String,
}

impl SiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("AGENT_STUDIO_PORT") {
            Ok(raw) => parse_port("AGENT_STUDIO_PORT", &raw)?,
            Err(_) => 3000,
        };

        let chatbot_backend_url = std::env::var("CHATBOT_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_CHATBOT_BACKEND_URL.to_string());
        if !chatbot_backend_url.starts_with("http://") && !chatbot_backend_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                key: "CHATBOT_BACKEND_URL".to_string(),
                message: "must be an http(s) URL".to_string(),
            });
        }

        Ok(Self {
            port,
            api: ApiConfig::from_env(),
            email: EmailConfig::from_env()?,
            chatbot_backend_url,
        })
    }
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("not a port number: {raw}"),
    })
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
