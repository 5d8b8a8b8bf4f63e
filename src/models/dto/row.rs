use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::schema::asset::{AssetKind, AssetRecord};
use crate::database::schema::request::{Request, RequestFields, RequestType};

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human readable size, two decimals at most: `1.5 KB`, `0 Bytes`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", scaled);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

/// `mm:ss`
pub fn format_length(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Display projection of one asset table row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRow {
    pub id: String,
    pub kind: AssetKind,
    pub name: String,
    pub category: String,
    pub tags: String,
    pub size: String,
    pub date: String,
    pub uploader: String,
    pub duration: Option<String>,
    pub preview: Option<String>,
    /// Number of rejected versions before approval, for assets from a board
    pub revisions: Option<usize>,
}

impl From<&AssetRecord> for AssetRow {
    fn from(record: &AssetRecord) -> Self {
        Self {
            id: record.id.to_string(),
            kind: record.kind,
            name: record.name.clone(),
            category: record.category_label().to_string(),
            tags: record.tags.join(", "),
            size: format_file_size(record.size),
            date: format_date(&record.date),
            uploader: record.uploader.clone(),
            duration: record.duration_secs.map(format_length),
            preview: record
                .source
                .as_ref()
                .map(|source| source.inline.clone().unwrap_or_else(|| source.uri.clone())),
            revisions: record
                .workflow_history
                .as_ref()
                .map(|history| history.revision_history.len()),
        }
    }
}

/// Display projection of a request on a review board.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub id: String,
    pub filename: String,
    /// Description, or the frame/slide summary on the video board
    pub details: String,
    pub badge: &'static str,
    pub version: usize,
    pub size: String,
    pub feedback: Option<String>,
    pub previous_feedback: Vec<String>,
}

impl From<&Request> for RequestRow {
    fn from(request: &Request) -> Self {
        let details = match &request.fields {
            RequestFields::Image { .. } => request.fields.summary().into_owned(),
            RequestFields::Video {
                desired_length_secs,
                ..
            } => format!(
                "{} ({})",
                request.fields.summary(),
                format_length(*desired_length_secs)
            ),
        };
        let badge = match request.request_type {
            RequestType::New => "New Request",
            RequestType::Revision => "Revision Needed",
        };
        Self {
            id: request.id.to_string(),
            filename: request.filename().to_string(),
            details,
            badge,
            version: request.version(),
            size: request
                .size
                .map(format_file_size)
                .unwrap_or_else(|| "N/A".to_string()),
            feedback: request.feedback.clone(),
            previous_feedback: request
                .revision_history
                .iter()
                .rev()
                .map(|entry| entry.feedback.clone())
                .collect(),
        }
    }
}
