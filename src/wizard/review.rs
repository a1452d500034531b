//! Review-step summary of everything the wizard collected.

use serde::Serialize;

use crate::uploads::format_file_size;

use super::state::WizardState;

/// One labelled line on the review step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub rows: Vec<ReviewRow>,
    pub file_names: Vec<String>,
}

impl ReviewSummary {
    pub fn build(state: &WizardState) -> Self {
        let form = &state.form;
        let mut rows = vec![
            row("Agent Name", form.name.trim()),
            row("Media Type", form.media_type.label()),
        ];

        if let Some((voice, rate)) = form.voice() {
            rows.push(row("Voice", voice.label()));
            rows.push(row("Speaking Rate", format!("{rate}x Speed")));
        }

        rows.push(row("AI Model", &form.default_model));
        rows.push(row(
            "Font",
            format!("{} ({}, {}px)", form.font, form.font_style, form.font_size),
        ));
        rows.push(row("Theme Color", &form.color));

        if !form.welcome_message.trim().is_empty() {
            rows.push(row("Welcome Message", form.welcome_message.trim()));
        }

        let calendly = match (&form.calendly_enabled, &form.calendly_link) {
            (true, Some(link)) => link.clone(),
            (true, None) => "Enabled (no link)".to_string(),
            (false, _) => "Disabled".to_string(),
        };
        rows.push(row("Calendly", calendly));

        // Only confirmed uploads count toward the totals.
        let uploaded = state.uploaded_files();
        rows.push(row("Knowledge Files", uploaded.len().to_string()));
        rows.push(row(
            "Total Size",
            format_file_size(state.files.total_uploaded_size()),
        ));

        Self {
            rows,
            file_names: uploaded.iter().map(|f| f.name.clone()).collect(),
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }

    /// Plain-text rendering, one `Label: value` per line.
    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| format!("{}: {}", r.label, r.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn row(label: &'static str, value: impl Into<String>) -> ReviewRow {
    ReviewRow {
        label,
        value: value.into(),
    }
}
