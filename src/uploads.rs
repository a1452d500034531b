//! Upload staging: files selected locally vs. files the backend has confirmed.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, WizardError};

/// Knowledge-base file extensions the backend can ingest.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt", "md", "xlsx", "xls", "csv"];

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Lowercased suffix after the last dot, if any.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether a file name carries one of [`ALLOWED_EXTENSIONS`] (case-insensitive).
pub fn is_allowed_file(name: &str) -> bool {
    file_extension(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Format a byte count with base-1024 units, rounded to two decimals.
///
/// `0` → `"0 Bytes"`, `1536` → `"1.5 KB"`, `1024` → `"1 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit < SIZE_UNITS.len() - 1 && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{} {}", value, SIZE_UNITS[unit])
}

/// Guess a MIME type from the file extension.
pub fn content_type_for(name: &str) -> &'static str {
    match file_extension(name).as_deref() {
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

/// A file chosen locally but not yet confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Local identity, stable while the file sits in the queue.
    pub key: Uuid,
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            key: Uuid::new_v4(),
            content_type: content_type_for(&name).to_string(),
            name,
            data,
        }
    }

    /// Read a file from disk into a staged entry.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let data = tokio::fs::read(path).await?;
        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A file the backend has acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub file_type: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Accept ids the backend sends either as strings or as integers.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

/// Outcome of applying one upload batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: Vec<String>,
}

impl UploadReport {
    pub fn attempted(&self) -> usize {
        self.uploaded + self.failed.len()
    }

    /// Summary for the inline error panel, `None` when every file went through.
    pub fn failure_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!(
            "Failed to upload {} of {} files: {}",
            self.failed.len(),
            self.attempted(),
            self.failed.join(", ")
        ))
    }
}

/// The two-phase file lists: staged locally, then confirmed remotely.
#[derive(Debug, Clone, Default)]
pub struct UploadStagingQueue {
    selected: Vec<StagedFile>,
    uploaded: Vec<UploadedFile>,
}

impl UploadStagingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from files an existing agent already has.
    pub fn with_uploaded(uploaded: Vec<UploadedFile>) -> Self {
        Self {
            selected: Vec::new(),
            uploaded,
        }
    }

    pub fn selected(&self) -> &[StagedFile] {
        &self.selected
    }

    pub fn uploaded(&self) -> &[UploadedFile] {
        &self.uploaded
    }

    /// Append allowed files in order; returns how many were accepted.
    pub fn stage(&mut self, files: impl IntoIterator<Item = StagedFile>) -> usize {
        let mut accepted = 0;
        for file in files {
            if is_allowed_file(&file.name) {
                self.selected.push(file);
                accepted += 1;
            } else {
                tracing::warn!(file = %file.name, "Dropping file with unsupported extension");
            }
        }
        accepted
    }

    /// Remove exactly one staged file.
    pub fn unstage(&mut self, index: usize) -> Result<StagedFile, WizardError> {
        if index >= self.selected.len() {
            return Err(WizardError::IndexOutOfRange {
                index,
                len: self.selected.len(),
            });
        }
        Ok(self.selected.remove(index))
    }

    /// Apply upload results in request order.
    ///
    /// Successes move from `selected` to `uploaded`; failures stay staged.
    /// Entries no longer staged (removed mid-flight) are still recorded as uploaded.
    pub fn confirm(
        &mut self,
        results: Vec<(StagedFile, Result<UploadedFile, ApiError>)>,
    ) -> UploadReport {
        let mut report = UploadReport::default();
        for (staged, result) in results {
            match result {
                Ok(uploaded) => {
                    if let Some(pos) = self.selected.iter().position(|f| f.key == staged.key) {
                        self.selected.remove(pos);
                    }
                    tracing::debug!(file = %uploaded.name, id = %uploaded.id, "File confirmed");
                    self.uploaded.push(uploaded);
                    report.uploaded += 1;
                }
                Err(e) => {
                    tracing::warn!(file = %staged.name, error = %e, "File upload failed");
                    report.failed.push(staged.name);
                }
            }
        }
        report
    }

    /// Sum of confirmed upload sizes. Staged files are not counted.
    pub fn total_uploaded_size(&self) -> u64 {
        self.uploaded.iter().map(|f| f.size).sum()
    }
}
