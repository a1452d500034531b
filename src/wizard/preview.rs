//! Live chat-widget preview, derived purely from the form.

use serde::Serialize;

use super::form::{AgentForm, VoiceType};

pub const DEFAULT_PREVIEW_TITLE: &str = "Your Agent";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi! How can I help you today?";

/// Everything the preview pane needs to draw the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatPreview {
    pub title: String,
    pub accent_color: String,
    pub font_family: String,
    pub font_style: String,
    pub font_size_px: u16,
    pub welcome_message: String,
    pub show_text_input: bool,
    pub show_mic_button: bool,
    /// e.g. "Nova · 1.5x"
    pub voice_badge: Option<String>,
    pub calendly_link: Option<String>,
}

impl ChatPreview {
    pub fn render(form: &AgentForm) -> Self {
        let title = match form.name.trim() {
            "" => DEFAULT_PREVIEW_TITLE.to_string(),
            name => name.to_string(),
        };
        let welcome_message = match form.welcome_message.trim() {
            "" => DEFAULT_WELCOME_MESSAGE.to_string(),
            msg => msg.to_string(),
        };

        let voice_badge = form
            .voice()
            .map(|(voice, rate): (VoiceType, f32)| format!("{} · {}x", voice.label(), rate));

        let calendly_link = if form.calendly_enabled {
            form.calendly_link.clone()
        } else {
            None
        };

        Self {
            title,
            accent_color: form.color.clone(),
            font_family: form.font.clone(),
            font_style: form.font_style.clone(),
            font_size_px: form.font_size,
            welcome_message,
            show_text_input: form.media_type.supports_text(),
            show_mic_button: form.media_type.supports_voice(),
            voice_badge,
            calendly_link,
        }
    }

    /// Inline CSS for the widget root.
    pub fn style(&self) -> String {
        format!(
            "--accent: {}; font-family: {}; font-style: {}; font-size: {}px;",
            self.accent_color, self.font_family, self.font_style, self.font_size_px
        )
    }
}
