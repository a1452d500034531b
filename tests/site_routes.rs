//! Integration tests for the contact and chatbot relay endpoints.
//!
//! Each test spins up the site router on a random port (plus a stub chat
//! backend where needed) and exercises the real HTTP contract.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use agent_studio::error::MailError;
use agent_studio::server::{AppState, ChatRelay, Mailer, OutgoingEmail, site_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Mailer that records emails instead of talking SMTP.
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Send("connection refused".into()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

async fn serve(app: Router) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

/// Stub chat backend that echoes the message and session id back.
async fn start_chat_backend() -> u16 {
    let app = Router::new()
        .route(
            "/chat/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "reply": format!("echo: {}", body["message"].as_str().unwrap_or("")),
                    "type": "text",
                    "data": { "session_id": body["session_id"] },
                }))
            }),
        )
        .route(
            "/broken/",
            post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
    serve(app).await
}

/// Start the site server. Returns (port, mailer).
async fn start_site(
    mailer: Option<Arc<RecordingMailer>>,
    chat_backend_url: String,
) -> (u16, Option<Arc<RecordingMailer>>) {
    let state = AppState {
        mailer: mailer.clone().map(|m| m as Arc<dyn Mailer>),
        chat: ChatRelay::new(chat_backend_url),
    };
    (serve(site_routes(state)).await, mailer)
}

fn unused_backend() -> String {
    "http://127.0.0.1:9/chat/".to_string()
}

// ── Contact form ──────────────────────────────────────────────────────

#[tokio::test]
async fn contact_missing_name_is_400() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (port, _) = start_site(Some(Arc::clone(&mailer)), unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/route"))
            .json(&json!({"name": "", "email": "a@b.com", "message": "hi"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"error": "Missing required fields"}));
        assert!(mailer.sent.lock().unwrap().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_malformed_body_is_400() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site(Some(Arc::default()), unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/route"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Missing required fields");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_success_sends_html_email() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (port, _) = start_site(Some(Arc::clone(&mailer)), unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/route"))
            .json(&json!({
                "name": "Ann",
                "email": "ann@example.com",
                "message": "Interested in <pricing>",
                "company": "Acme"
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"success": true}));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_to.as_deref(), Some("ann@example.com"));
        assert!(sent[0].html.contains("Interested in &lt;pricing&gt;"));
        assert!(sent[0].html.contains("Acme"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_smtp_failure_is_500() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let (port, _) = start_site(Some(mailer), unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/route"))
            .json(&json!({"name": "Ann", "email": "a@b.com", "message": "hi"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"error": "Failed to send email"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_without_mailer_is_500() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site(None, unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/route"))
            .json(&json!({"name": "Ann", "email": "a@b.com", "message": "hi"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
    })
    .await
    .expect("test timed out");
}

// ── Chatbot relay ─────────────────────────────────────────────────────

#[tokio::test]
async fn chatbot_forwards_cookie_session() {
    timeout(TEST_TIMEOUT, async {
        let backend = start_chat_backend().await;
        let (port, _) = start_site(None, format!("http://127.0.0.1:{backend}/chat/")).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/chatbot/route"))
            .header("cookie", "session_id=visitor-42")
            .json(&json!({"message": "hello"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert!(resp.headers().get("set-cookie").is_none());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["reply"], "echo: hello");
        assert_eq!(body["type"], "text");
        assert_eq!(body["data"]["session_id"], "visitor-42");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chatbot_mints_session_cookie_when_absent() {
    timeout(TEST_TIMEOUT, async {
        let backend = start_chat_backend().await;
        let (port, _) = start_site(None, format!("http://127.0.0.1:{backend}/chat/")).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/chatbot/route"))
            .json(&json!({"message": "hello"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let cookie = resp
            .headers()
            .get("set-cookie")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("session_id="));

        let body: Value = resp.json().await.unwrap();
        let echoed = body["data"]["session_id"].as_str().unwrap();
        assert!(cookie.contains(echoed));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chatbot_backend_error_is_500() {
    timeout(TEST_TIMEOUT, async {
        let backend = start_chat_backend().await;
        let (port, _) = start_site(None, format!("http://127.0.0.1:{backend}/broken/")).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/chatbot/route"))
            .json(&json!({"message": "hello"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"error": "Failed to process your request"}));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn chatbot_unreachable_backend_is_500() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site(None, unused_backend()).await;

        let resp = reqwest::Client::new()
            .post(format!("http://127.0.0.1:{port}/api/contact/chatbot/route"))
            .json(&json!({"message": "hello"}))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Failed to process your request");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let (port, _) = start_site(None, unused_backend()).await;
        let body: Value = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}
