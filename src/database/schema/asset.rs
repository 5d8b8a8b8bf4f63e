use arrayvec::ArrayString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CollectionKey;
use super::request::RevisionEntry;
use crate::common::{
    AUDIO_CATEGORIES, IMAGE_CATEGORIES, UNCATEGORIZED, VALID_AUDIO_EXTENSIONS,
    VALID_IMAGE_EXTENSIONS, VALID_VIDEO_EXTENSIONS, VIDEO_CATEGORIES,
};
use crate::database::store::Record;

/// Canonical hyphenated identifier, `8-4-4-4-12` hex.
pub type RecordId = ArrayString<36>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
}

impl AssetKind {
    /// Collection holding the finished assets of this kind.
    pub fn collection(&self) -> CollectionKey {
        match self {
            AssetKind::Image => CollectionKey::Images,
            AssetKind::Video => CollectionKey::Videos,
            AssetKind::Audio => CollectionKey::AudioFiles,
        }
    }

    pub fn valid_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => VALID_IMAGE_EXTENSIONS,
            AssetKind::Video => VALID_VIDEO_EXTENSIONS,
            AssetKind::Audio => VALID_AUDIO_EXTENSIONS,
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            AssetKind::Image => IMAGE_CATEGORIES,
            AssetKind::Video => VIDEO_CATEGORIES,
            AssetKind::Audio => AUDIO_CATEGORIES,
        }
    }

    /// Category given to freshly added assets.
    pub fn default_category(&self) -> &'static str {
        match self {
            AssetKind::Image => "",
            AssetKind::Video => "tutorial",
            AssetKind::Audio => UNCATEGORIZED,
        }
    }

    /// Kind implied by a file extension, if it is one we manage.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [AssetKind::Image, AssetKind::Video, AssetKind::Audio]
            .into_iter()
            .find(|kind| kind.valid_extensions().contains(&ext.as_str()))
    }

    /// Whether a MIME type belongs to this kind (`image/*`, `video/*`, `audio/*`).
    pub fn accepts_media_type(&self, media_type: &str) -> bool {
        media_type.starts_with(self.media_prefix())
    }

    fn media_prefix(&self) -> &'static str {
        match self {
            AssetKind::Image => "image/",
            AssetKind::Video => "video/",
            AssetKind::Audio => "audio/",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Video => write!(f, "video"),
            AssetKind::Audio => write!(f, "audio"),
        }
    }
}

/// Opaque reference to an uploaded artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRef {
    pub uri: String,
    pub media_type: String,
    pub size: u64,
    pub hash: ArrayString<64>,
    /// `data:` URI preview; transient, may be stripped before persisting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline: Option<String>,
}

impl AssetRef {
    pub fn strip_inline(&mut self) -> bool {
        self.inline.take().is_some()
    }
}

/// Lineage of an asset that came out of a review board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowHistory {
    pub created_at: DateTime<Utc>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub approved_at: DateTime<Utc>,
    pub revision_history: Vec<RevisionEntry>,
}

/// A row of the image, video or audio tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: RecordId,
    pub kind: AssetKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub size: u64,
    pub media_type: String,
    pub uploader: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<AssetRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_history: Option<WorkflowHistory>,
}

impl AssetRecord {
    /// Record for an asset added straight to a table.
    pub fn new(
        id: RecordId,
        kind: AssetKind,
        name: impl Into<String>,
        source: AssetRef,
        uploader: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            description: String::new(),
            category: kind.default_category().to_string(),
            tags: Vec::new(),
            size: source.size,
            media_type: source.media_type.clone(),
            uploader: uploader.into(),
            approver: None,
            date: Utc::now(),
            source: Some(source),
            duration_secs: None,
            workflow_history: None,
        }
    }

    /// Category shown in the table; blank categories read as uncategorized.
    pub fn category_label(&self) -> &str {
        if self.category.is_empty() {
            UNCATEGORIZED
        } else {
            &self.category
        }
    }
}

impl Record for AssetRecord {
    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn strip_transient(&mut self) -> bool {
        let mut stripped = self
            .source
            .as_mut()
            .map_or(false, |source| source.strip_inline());
        if let Some(history) = self.workflow_history.as_mut() {
            for entry in &mut history.revision_history {
                stripped |= entry.asset.strip_inline();
            }
        }
        stripped
    }
}
