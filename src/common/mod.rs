pub mod errors;

pub const DEFAULT_PAGE_SIZE: usize = 10;

pub const PAGE_SIZE_OPTIONS: &[usize] = &[10, 25, 50, 100];

/// Typical browser local-storage quota.
pub const DEFAULT_SLOT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

pub const DEFAULT_INLINE_ASSET_LIMIT: u64 = 256 * 1024;

pub const DEFAULT_UPLOADER: &str = "guanglei.zhang";

pub const DEFAULT_APPROVER_LABEL: &str = "approver";

pub const UNCATEGORIZED: &str = "Uncategorized";

pub const IMAGE_CATEGORIES: &[&str] = &["work", "personal", "nature"];

pub const VIDEO_CATEGORIES: &[&str] =
    &["tutorial", "marketing", "product", "training"];

pub const AUDIO_CATEGORIES: &[&str] =
    &["music", "podcast", "voiceover", "effects", UNCATEGORIZED];

pub const VALID_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "jfif", "jpe", "png", "gif", "tif", "tiff", "webp", "bmp", "svg",
];

pub const VALID_VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mkv", "mov", "avi", "flv", "wmv", "mpeg",
];

pub const VALID_AUDIO_EXTENSIONS: &[&str] =
    &["mp3", "wav", "ogg", "oga", "flac", "aac", "m4a", "opus"];
