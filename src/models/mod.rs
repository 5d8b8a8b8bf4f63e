pub mod dto;
pub mod filter;

use chrono::{DateTime, Utc};
use std::borrow::Cow;

use crate::database::schema::asset::{AssetKind, AssetRecord};
use crate::database::schema::request::Request;

/// Read access the filter and sort engine needs from a table entry.
pub trait TableEntry {
    fn id(&self) -> &str;
    fn kind(&self) -> AssetKind;
    fn name(&self) -> &str;
    fn description(&self) -> Cow<'_, str>;
    fn tags(&self) -> &[String];
    fn category(&self) -> &str;
    fn uploader(&self) -> &str;
    fn date(&self) -> DateTime<Utc>;
    fn size(&self) -> u64;
}

impl TableEntry for AssetRecord {
    fn id(&self) -> &str {
        self.id.as_str()
    }
    fn kind(&self) -> AssetKind {
        self.kind
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.description)
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn uploader(&self) -> &str {
        &self.uploader
    }
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
    fn size(&self) -> u64 {
        self.size
    }
}

impl TableEntry for Request {
    fn id(&self) -> &str {
        self.id.as_str()
    }
    fn kind(&self) -> AssetKind {
        self.fields.kind()
    }
    fn name(&self) -> &str {
        self.filename()
    }
    fn description(&self) -> Cow<'_, str> {
        self.fields.summary()
    }
    fn tags(&self) -> &[String] {
        &[]
    }
    fn category(&self) -> &str {
        ""
    }
    fn uploader(&self) -> &str {
        &self.uploader
    }
    fn date(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn size(&self) -> u64 {
        self.size.unwrap_or(0)
    }
}
