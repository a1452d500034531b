//! POST /api/contact/route: relays the marketing site's contact form by email.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use super::AppState;
use super::mailer::{OutgoingEmail, escape_html};

pub const MISSING_FIELDS_ERROR: &str = "Missing required fields";
pub const SEND_FAILED_ERROR: &str = "Failed to send email";

/// Body posted by the contact form. Everything is optional on the wire so a
/// missing field yields the 400 contract rather than a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
}

/// A contact form with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ContactForm {
    /// `None` when name, email or message is missing or blank.
    pub fn validate(self) -> Option<ContactRequest> {
        Some(ContactRequest {
            name: present(self.name)?,
            email: present(self.email)?,
            message: present(self.message)?,
            company: present(self.company),
            phone: present(self.phone),
            subject: present(self.subject),
        })
    }
}

impl ContactRequest {
    /// Compose the notification email; all visitor text is HTML-escaped.
    pub fn to_email(&self) -> OutgoingEmail {
        let subject = match &self.subject {
            Some(s) => format!("Contact: {s}"),
            None => format!("New Contact Form Submission from {}", self.name),
        };

        let mut rows = vec![
            ("Name", self.name.as_str()),
            ("Email", self.email.as_str()),
        ];
        if let Some(company) = &self.company {
            rows.push(("Company", company.as_str()));
        }
        if let Some(phone) = &self.phone {
            rows.push(("Phone", phone.as_str()));
        }

        let details: String = rows
            .iter()
            .map(|(label, value)| {
                format!(
                    "<p><strong>{label}:</strong> {}</p>",
                    escape_html(value)
                )
            })
            .collect();

        let message = escape_html(&self.message).replace('\n', "<br>");
        let html = format!(
            "<h2>New Contact Form Submission</h2>{details}\
             <p><strong>Message:</strong></p><p>{message}</p>"
        );

        OutgoingEmail {
            reply_to: Some(self.email.clone()),
            subject: subject.replace(['\r', '\n'], " "),
            html,
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(Json(form)) => form,
        Err(e) => {
            warn!(error = %e, "Unreadable contact form body");
            return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS_ERROR);
        }
    };

    let Some(request) = form.validate() else {
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS_ERROR);
    };

    let Some(mailer) = state.mailer.as_ref() else {
        warn!("Contact form submitted but no mailer is configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED_ERROR);
    };

    match mailer.send(request.to_email()).await {
        Ok(()) => {
            info!(from = %request.email, "Contact form relayed");
            (
                StatusCode::OK,
                Json(serde_json::json!({ "success": true })),
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "Contact form email failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, SEND_FAILED_ERROR)
        }
    }
}
