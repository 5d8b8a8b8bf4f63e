use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::asset::{AssetKind, AssetRef, RecordId};
use crate::common::errors::{WorkflowError, WorkflowResult};
use crate::database::store::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Uploaded,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    #[default]
    New,
    Revision,
}

/// A superseded upload together with the feedback that rejected it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionEntry {
    pub asset: AssetRef,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub feedback: String,
}

/// Submitter-supplied metadata, one shape per board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "board", rename_all = "lowercase")]
pub enum RequestFields {
    #[serde(rename_all = "camelCase")]
    Image {
        filename: String,
        #[serde(default)]
        description: String,
    },
    #[serde(rename_all = "camelCase")]
    Video {
        frame_chain: String,
        frame: String,
        slide: String,
        filename: String,
        desired_length_secs: u32,
    },
}

impl RequestFields {
    pub fn kind(&self) -> AssetKind {
        match self {
            RequestFields::Image { .. } => AssetKind::Image,
            RequestFields::Video { .. } => AssetKind::Video,
        }
    }

    pub fn filename(&self) -> &str {
        match self {
            RequestFields::Image { filename, .. } | RequestFields::Video { filename, .. } => {
                filename
            }
        }
    }

    /// Free text shown for the request: the description, or
    /// `chain / frame / slide` on the video board.
    pub fn summary(&self) -> Cow<'_, str> {
        match self {
            RequestFields::Image { description, .. } => Cow::Borrowed(description),
            RequestFields::Video {
                frame_chain,
                frame,
                slide,
                ..
            } => Cow::Owned(format!("{frame_chain} / {frame} / {slide}")),
        }
    }
}

/// Raw form input before validation. Every value is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestInput {
    Image {
        filename: String,
        description: String,
    },
    Video {
        frame_chain: String,
        frame: String,
        slide: String,
        filename: String,
        desired_length: String,
    },
}

impl RequestInput {
    pub fn image(filename: impl Into<String>, description: impl Into<String>) -> Self {
        RequestInput::Image {
            filename: filename.into(),
            description: description.into(),
        }
    }

    pub fn video(
        frame_chain: impl Into<String>,
        frame: impl Into<String>,
        slide: impl Into<String>,
        filename: impl Into<String>,
        desired_length: impl Into<String>,
    ) -> Self {
        RequestInput::Video {
            frame_chain: frame_chain.into(),
            frame: frame.into(),
            slide: slide.into(),
            filename: filename.into(),
            desired_length: desired_length.into(),
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            RequestInput::Image { .. } => AssetKind::Image,
            RequestInput::Video { .. } => AssetKind::Video,
        }
    }

    /// Check required fields and turn the input into request metadata.
    pub fn validate(&self) -> WorkflowResult<RequestFields> {
        match self {
            RequestInput::Image {
                filename,
                description,
            } => Ok(RequestFields::Image {
                filename: valid_filename(filename)?,
                description: description.trim().to_string(),
            }),
            RequestInput::Video {
                frame_chain,
                frame,
                slide,
                filename,
                desired_length,
            } => {
                let frame_chain = required("frame chain", frame_chain)?;
                let frame = required("frame", frame)?;
                let slide = required("slide", slide)?;
                let filename = valid_filename(filename)?;
                let length = required("desired length", desired_length)?;
                let desired_length_secs = parse_length(&length).ok_or_else(|| {
                    WorkflowError::Validation(format!("Invalid desired length: {length}"))
                })?;
                Ok(RequestFields::Video {
                    frame_chain,
                    frame,
                    slide,
                    filename,
                    desired_length_secs,
                })
            }
        }
    }
}

fn required(name: &str, value: &str) -> WorkflowResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::Validation(format!("Missing {name}")));
    }
    Ok(value.to_string())
}

fn valid_filename(value: &str) -> WorkflowResult<String> {
    let filename = required("filename", value)?;
    if filename.contains('/') || filename.contains('\\') {
        return Err(WorkflowError::Validation(format!(
            "Filename must not contain a path separator: {filename}"
        )));
    }
    Ok(filename)
}

/// Parse `mm:ss` or plain seconds.
pub fn parse_length(value: &str) -> Option<u32> {
    let value = value.trim();
    match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.trim().parse().ok()?;
            let seconds: u32 = match seconds.trim() {
                "" => 0,
                s => s.parse().ok()?,
            };
            minutes.checked_mul(60)?.checked_add(seconds)
        }
        None => value.parse().ok(),
    }
}

/// A unit of work moving through submit, upload and review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RecordId,
    #[serde(flatten)]
    pub fields: RequestFields,
    pub status: RequestStatus,
    #[serde(default)]
    pub approval_status: Option<ApprovalStatus>,
    #[serde(rename = "type", default)]
    pub request_type: RequestType,
    #[serde(default)]
    pub uploaded_asset: Option<AssetRef>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub revision_history: Vec<RevisionEntry>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub uploader: String,
    #[serde(default)]
    pub size: Option<u64>,
}

impl Request {
    pub fn new(
        id: RecordId,
        fields: RequestFields,
        uploader: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            fields,
            status: RequestStatus::Pending,
            approval_status: None,
            request_type: RequestType::New,
            uploaded_asset: None,
            feedback: None,
            revision_history: Vec::new(),
            created_at: now,
            uploaded_at: None,
            reviewed_at: None,
            approved_at: None,
            uploader: uploader.into(),
            size: None,
        }
    }

    pub fn filename(&self) -> &str {
        self.fields.filename()
    }

    /// Version number the current upload will be shown as.
    pub fn version(&self) -> usize {
        self.revision_history.len() + 1
    }
}

impl Record for Request {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn strip_transient(&mut self) -> bool {
        let mut stripped = self
            .uploaded_asset
            .as_mut()
            .map_or(false, |asset| asset.strip_inline());
        for entry in &mut self.revision_history {
            stripped |= entry.asset.strip_inline();
        }
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_requires_only_filename() {
        let fields = RequestInput::image("  banner.jpg ", "").validate().unwrap();
        assert_eq!(
            fields,
            RequestFields::Image {
                filename: "banner.jpg".into(),
                description: String::new()
            }
        );
        assert!(RequestInput::image("   ", "home").validate().is_err());
        assert!(RequestInput::image("a/b.jpg", "").validate().is_err());
    }

    #[test]
    fn video_requires_every_field() {
        let ok = RequestInput::video("c1", "f2", "s3", "intro.mp4", "1:30")
            .validate()
            .unwrap();
        assert!(matches!(
            ok,
            RequestFields::Video {
                desired_length_secs: 90,
                ..
            }
        ));
        let missing = RequestInput::video("c1", "", "s3", "intro.mp4", "90").validate();
        assert!(matches!(missing, Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn length_formats() {
        assert_eq!(parse_length("2:05"), Some(125));
        assert_eq!(parse_length("3:"), Some(180));
        assert_eq!(parse_length("45"), Some(45));
        assert_eq!(parse_length("abc"), None);
        assert_eq!(parse_length("1:xx"), None);
    }

    #[test]
    fn request_json_uses_board_tag_and_type() {
        let request = Request::new(
            RecordId::from("00000000-0000-0000-0000-000000000001").unwrap(),
            RequestInput::image("banner.jpg", "home banner")
                .validate()
                .unwrap(),
            "someone",
            Utc::now(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["board"], "image");
        assert_eq!(value["filename"], "banner.jpg");
        assert_eq!(value["type"], "new");
        assert_eq!(value["status"], "pending");
        let back: Request = serde_json::from_value(value).unwrap();
        assert_eq!(back, request);
    }
}
