pub mod asset;
pub mod request;

use redb::TableDefinition;

/// One row per collection; the value is the JSON array of the collection.
pub const COLLECTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("collections");

/// Fixed logical names of the persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    ImageRequests,
    VideoRequests,
    Images,
    Videos,
    AudioFiles,
}

impl CollectionKey {
    pub const ALL: [CollectionKey; 5] = [
        CollectionKey::ImageRequests,
        CollectionKey::VideoRequests,
        CollectionKey::Images,
        CollectionKey::Videos,
        CollectionKey::AudioFiles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::ImageRequests => "imageRequests",
            CollectionKey::VideoRequests => "videoRequests",
            CollectionKey::Images => "images",
            CollectionKey::Videos => "videos",
            CollectionKey::AudioFiles => "audioFiles",
        }
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
