//! Agent form fields accumulated across wizard steps.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::uploads::UploadedFile;

/// Minimum agent name length (after trimming).
pub const MIN_NAME_LEN: usize = 2;

/// Allowed speaking-rate range for voice agents.
pub const SPEAKING_RATE_RANGE: (f32, f32) = (0.25, 4.0);

/// How the agent talks to visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Text,
    Audio,
    Both,
}

impl MediaType {
    /// Whether voice settings mean anything for this media type.
    pub fn supports_voice(&self) -> bool {
        matches!(self, Self::Audio | Self::Both)
    }

    pub fn supports_text(&self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text Only",
            Self::Audio => "Voice Only",
            Self::Both => "Text & Voice",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Both => "both",
        };
        write!(f, "{s}")
    }
}

/// Text-to-speech voices offered for audio agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoiceType {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl VoiceType {
    pub const ALL: [VoiceType; 6] = [
        Self::Alloy,
        Self::Echo,
        Self::Fable,
        Self::Onyx,
        Self::Nova,
        Self::Shimmer,
    ];

    /// Capitalized name shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Alloy => "Alloy",
            Self::Echo => "Echo",
            Self::Fable => "Fable",
            Self::Onyx => "Onyx",
            Self::Nova => "Nova",
            Self::Shimmer => "Shimmer",
        }
    }
}

/// Every field the wizard collects.
///
/// Fields persist across step navigation; only an explicit patch overwrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentForm {
    pub name: String,
    pub media_type: MediaType,
    pub color: String,
    pub font: String,
    pub font_style: String,
    pub font_size: u16,
    pub default_model: String,
    pub prompt: String,
    pub welcome_message: String,
    pub calendly_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendly_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<VoiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f32>,
}

impl Default for AgentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            media_type: MediaType::Text,
            color: "#6366f1".to_string(),
            font: "Inter".to_string(),
            font_style: "normal".to_string(),
            font_size: 14,
            default_model: "gpt-4o-mini".to_string(),
            prompt: String::new(),
            welcome_message: String::new(),
            calendly_enabled: false,
            calendly_link: None,
            voice_type: None,
            speaking_rate: None,
        }
    }
}

/// A partial form update. Present fields overwrite, absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormPatch {
    pub name: Option<String>,
    pub media_type: Option<MediaType>,
    pub color: Option<String>,
    pub font: Option<String>,
    pub font_style: Option<String>,
    pub font_size: Option<u16>,
    pub default_model: Option<String>,
    pub prompt: Option<String>,
    pub welcome_message: Option<String>,
    pub calendly_enabled: Option<bool>,
    pub calendly_link: Option<String>,
    pub voice_type: Option<VoiceType>,
    pub speaking_rate: Option<f32>,
}

impl FormPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

impl AgentForm {
    /// Shallow merge of a patch. No validation happens here.
    pub fn apply(&mut self, patch: FormPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(media_type) = patch.media_type {
            self.media_type = media_type;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(font) = patch.font {
            self.font = font;
        }
        if let Some(font_style) = patch.font_style {
            self.font_style = font_style;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(model) = patch.default_model {
            self.default_model = model;
        }
        if let Some(prompt) = patch.prompt {
            self.prompt = prompt;
        }
        if let Some(welcome) = patch.welcome_message {
            self.welcome_message = welcome;
        }
        if let Some(enabled) = patch.calendly_enabled {
            self.calendly_enabled = enabled;
        }
        if let Some(link) = patch.calendly_link {
            self.calendly_link = Some(link).filter(|l| !l.trim().is_empty());
        }
        if let Some(voice) = patch.voice_type {
            self.voice_type = Some(voice);
        }
        if let Some(rate) = patch.speaking_rate {
            self.speaking_rate = Some(rate);
        }
    }

    /// Whether the name clears the step-1 gate.
    pub fn has_valid_name(&self) -> bool {
        self.name.trim().chars().count() >= MIN_NAME_LEN
    }

    /// Effective voice settings; `None` for text-only agents.
    pub fn voice(&self) -> Option<(VoiceType, f32)> {
        if !self.media_type.supports_voice() {
            return None;
        }
        Some((
            self.voice_type.unwrap_or_default(),
            self.speaking_rate.unwrap_or(1.0),
        ))
    }

    /// Validate and build the create/update request body.
    ///
    /// Voice fields are dropped for text-only agents.
    pub fn to_payload(&self, files: &[UploadedFile]) -> Result<AgentPayload, WizardError> {
        if !self.has_valid_name() {
            return Err(WizardError::InvalidField {
                field: "name",
                reason: format!("must be at least {MIN_NAME_LEN} characters"),
            });
        }

        let voice = self.voice();
        if let Some((_, rate)) = voice {
            let (min, max) = SPEAKING_RATE_RANGE;
            if !(min..=max).contains(&rate) {
                return Err(WizardError::InvalidField {
                    field: "speaking_rate",
                    reason: format!("must be between {min} and {max}"),
                });
            }
        }

        let calendly_link = if self.calendly_enabled {
            let link = self.calendly_link.as_deref().map(str::trim).unwrap_or("");
            if !(link.starts_with("https://") || link.starts_with("http://")) {
                return Err(WizardError::InvalidField {
                    field: "calendly_link",
                    reason: "an http(s) link is required when Calendly is enabled".to_string(),
                });
            }
            Some(link.to_string())
        } else {
            None
        };

        Ok(AgentPayload {
            name: self.name.trim().to_string(),
            media_type: self.media_type,
            color: self.color.clone(),
            font: self.font.clone(),
            font_style: self.font_style.clone(),
            font_size: self.font_size,
            default_model: self.default_model.clone(),
            prompt: self.prompt.clone(),
            welcome_message: self.welcome_message.clone(),
            calendly_enabled: self.calendly_enabled,
            calendly_link,
            voice_type: voice.map(|(v, _)| v),
            speaking_rate: voice.map(|(_, r)| r),
            file_ids: files.iter().map(|f| f.id.clone()).collect(),
        })
    }
}

/// Validated body sent to the agent create/update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPayload {
    pub name: String,
    pub media_type: MediaType,
    pub color: String,
    pub font: String,
    pub font_style: String,
    pub font_size: u16,
    pub default_model: String,
    pub prompt: String,
    pub welcome_message: String,
    pub calendly_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendly_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<VoiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_rate: Option<f32>,
    pub file_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> AgentForm {
        AgentForm {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn patch_overwrites_only_present_fields() {
        let mut form = named("Support Bot");
        form.apply(FormPatch {
            prompt: Some("Be concise".into()),
            ..Default::default()
        });
        form.apply(FormPatch {
            color: Some("#000000".into()),
            ..Default::default()
        });
        assert_eq!(form.name, "Support Bot");
        assert_eq!(form.prompt, "Be concise");
        assert_eq!(form.color, "#000000");

        form.apply(FormPatch::name("Sales Bot"));
        assert_eq!(form.name, "Sales Bot");
        assert_eq!(form.prompt, "Be concise");
    }

    #[test]
    fn blank_calendly_link_clears_it() {
        let mut form = AgentForm::default();
        form.apply(FormPatch {
            calendly_link: Some("https://calendly.com/acme".into()),
            ..Default::default()
        });
        assert!(form.calendly_link.is_some());
        form.apply(FormPatch {
            calendly_link: Some("  ".into()),
            ..Default::default()
        });
        assert!(form.calendly_link.is_none());
    }

    #[test]
    fn name_gate_counts_trimmed_chars() {
        assert!(!named("A").has_valid_name());
        assert!(!named(" A ").has_valid_name());
        assert!(named("AB").has_valid_name());
    }

    #[test]
    fn text_agents_drop_voice_fields() {
        let mut form = named("Helper");
        form.apply(FormPatch {
            voice_type: Some(VoiceType::Nova),
            speaking_rate: Some(1.5),
            ..Default::default()
        });
        assert!(form.voice().is_none());

        let payload = form.to_payload(&[]).unwrap();
        assert!(payload.voice_type.is_none());
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("voice_type").is_none());
        assert!(json.get("speaking_rate").is_none());
    }

    #[test]
    fn audio_agents_default_voice() {
        let mut form = named("Receptionist");
        form.apply(FormPatch {
            media_type: Some(MediaType::Audio),
            ..Default::default()
        });
        assert_eq!(form.voice(), Some((VoiceType::Alloy, 1.0)));

        let payload = form.to_payload(&[]).unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["media_type"], "audio");
        assert_eq!(json["voice_type"], "alloy");
    }

    #[test]
    fn payload_rejects_out_of_range_rate() {
        let mut form = named("Receptionist");
        form.apply(FormPatch {
            media_type: Some(MediaType::Both),
            speaking_rate: Some(9.0),
            ..Default::default()
        });
        let err = form.to_payload(&[]).unwrap_err();
        assert!(matches!(err, WizardError::InvalidField { field: "speaking_rate", .. }));
    }

    #[test]
    fn payload_requires_calendly_link_when_enabled() {
        let mut form = named("Booker");
        form.calendly_enabled = true;
        assert!(form.to_payload(&[]).is_err());

        form.calendly_link = Some("https://calendly.com/acme/30min".into());
        let payload = form.to_payload(&[]).unwrap();
        assert_eq!(
            payload.calendly_link.as_deref(),
            Some("https://calendly.com/acme/30min")
        );
    }

    #[test]
    fn payload_rejects_short_name() {
        assert!(named("A").to_payload(&[]).is_err());
    }

    #[test]
    fn voice_labels_capitalize_wire_names() {
        for voice in VoiceType::ALL {
            let wire = serde_json::to_value(voice).unwrap();
            let wire = wire.as_str().unwrap();
            let mut chars = wire.chars();
            let capitalized: String = chars
                .next()
                .map(|c| c.to_ascii_uppercase())
                .into_iter()
                .chain(chars)
                .collect();
            assert_eq!(voice.label(), capitalized);
        }
        assert_eq!(VoiceType::ALL.len(), 6);
    }

    #[test]
    fn patch_deserializes_from_partial_json() {
        let patch: FormPatch =
            serde_json::from_str(r#"{"media_type": "both", "voice_type": "shimmer"}"#).unwrap();
        assert_eq!(patch.media_type, Some(MediaType::Both));
        assert_eq!(patch.voice_type, Some(VoiceType::Shimmer));
        assert!(patch.name.is_none());
    }

    #[test]
    fn form_deserializes_with_missing_fields() {
        let form: AgentForm = serde_json::from_str(r#"{"name": "Legacy"}"#).unwrap();
        assert_eq!(form.name, "Legacy");
        assert_eq!(form.font_size, 14);
        assert_eq!(form.media_type, MediaType::Text);
    }
}
