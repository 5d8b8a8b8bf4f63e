//! Reading asset files into [`AssetRef`]s.
//!
//! Reads are awaitable and run to completion once started; there is no
//! cancellation.

use arrayvec::ArrayString;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use blake3::Hasher;
use log::debug;
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::common::errors::{WorkflowError, WorkflowResult};
use crate::database::schema::asset::AssetRef;

/// Read `path`, hash it and describe it.
///
/// Files no larger than `inline_limit` bytes also carry a `data:` URI
/// preview.
pub async fn read_asset(path: impl AsRef<Path>, inline_limit: u64) -> WorkflowResult<AssetRef> {
    let start_time = Instant::now();
    let path = absolute(path.as_ref()).clean();

    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| WorkflowError::AssetRead {
            path: path.clone(),
            source,
        })?;

    let mut hasher = Hasher::new();
    hasher.update(&bytes);
    let hash: ArrayString<64> = hasher.finalize().to_hex();

    let media_type = guess_media_type(&path);
    let size = bytes.len() as u64;
    let inline = (size <= inline_limit)
        .then(|| format!("data:{};base64,{}", media_type, STANDARD.encode(&bytes)));

    debug!(
        duration = &*format!("{:?}", start_time.elapsed());
        "Read asset {:?} ({} bytes)", path, size
    );

    Ok(AssetRef {
        uri: file_uri(&path),
        media_type,
        size,
        hash,
        inline,
    })
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.to_string_lossy().replace('\\', "/"))
}

/// MIME type implied by the file extension, `application/octet-stream` if unknown.
pub fn guess_media_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn small_file_gets_inline_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not really a png")
            .unwrap();

        let asset = read_asset(&path, 1024).await.unwrap();
        assert_eq!(asset.media_type, "image/png");
        assert_eq!(asset.size, 16);
        assert_eq!(asset.hash.as_str(), blake3::hash(b"not really a png").to_hex().as_str());
        assert!(asset.uri.starts_with("file://"));
        assert!(asset.uri.ends_with("banner.png"));
        assert!(
            asset
                .inline
                .as_deref()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );

        let large = read_asset(&path, 4).await.unwrap();
        assert_eq!(large.inline, None);
    }

    #[tokio::test]
    async fn missing_file_is_an_asset_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_asset(dir.path().join("nope.jpg"), 1024).await;
        assert!(matches!(result, Err(WorkflowError::AssetRead { .. })));
    }

    #[test]
    fn media_type_follows_extension() {
        assert_eq!(guess_media_type(Path::new("clip.MOV")), "video/quicktime");
        assert_eq!(guess_media_type(Path::new("theme.mp3")), "audio/mpeg");
        assert_eq!(guess_media_type(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(guess_media_type(Path::new("blob.zzzq")), "application/octet-stream");
        assert_eq!(guess_media_type(Path::new("no_extension")), "application/octet-stream");
    }
}
