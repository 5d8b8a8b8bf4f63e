use dotenv::dotenv;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::{
    DEFAULT_APPROVER_LABEL, DEFAULT_INLINE_ASSET_LIMIT, DEFAULT_PAGE_SIZE,
    DEFAULT_SLOT_QUOTA_BYTES, DEFAULT_UPLOADER, PAGE_SIZE_OPTIONS,
};

/// Prefix of every environment variable read by [`AppConfig::from_env`].
pub const ENV_PREFIX: &str = "ASSET_WORKFLOW_";

/// What happens to the current asset when an approver rejects it.
///
/// In both cases the rejected asset is recorded in the revision history at
/// rejection time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RejectedAssetPolicy {
    /// Drop the current asset; the creator must upload a new version.
    #[default]
    Clear,
    /// Keep showing the rejected asset next to the feedback.
    Retain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// redb file holding every collection slot
    pub db_path: PathBuf,
    /// Rows per table page when the caller does not pick one
    pub page_size: usize,
    /// Page sizes offered by the tables
    pub page_size_options: Vec<usize>,
    /// Identity stamped on submitted requests and uploaded assets
    pub uploader: String,
    /// Label recorded as the approver of archived assets
    pub approver_label: String,
    /// Largest serialized collection a slot accepts
    pub slot_quota_bytes: usize,
    /// Assets up to this size keep an inline preview
    pub inline_asset_limit: u64,
    pub rejected_asset_policy: RejectedAssetPolicy,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./db/workflow.redb"),
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
            uploader: DEFAULT_UPLOADER.to_string(),
            approver_label: DEFAULT_APPROVER_LABEL.to_string(),
            slot_quota_bytes: DEFAULT_SLOT_QUOTA_BYTES,
            inline_asset_limit: DEFAULT_INLINE_ASSET_LIMIT,
            rejected_asset_policy: RejectedAssetPolicy::Clear,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `.env` (if present) and then every `ASSET_WORKFLOW_*` variable.
    ///
    /// Variables that are missing keep their default; a malformed value makes
    /// the whole environment layer fall back to defaults with a warning.
    pub fn from_env() -> Self {
        dotenv().ok();
        match envy::prefixed(ENV_PREFIX).from_env::<AppConfig>() {
            Ok(config) => {
                info!("Loaded config from environment.");
                config.normalized()
            }
            Err(e) => {
                warn!("Invalid {ENV_PREFIX}* environment, using defaults: {e}");
                AppConfig::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.page_size_options.retain(|size| *size > 0);
        if self.page_size_options.is_empty() {
            self.page_size_options = PAGE_SIZE_OPTIONS.to_vec();
        }
        self
    }
}
