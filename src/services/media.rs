use std::path::Path;

use anyhow::Context;
use uuid::Uuid;

use crate::models::MediaType;

/// Stores an uploaded booking media file under the media directory and
/// returns its public url path plus the inferred media kind. Only image/*
/// and video/* uploads are accepted.
pub async fn store_upload(
    media_dir: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> anyhow::Result<(String, MediaType)> {
    let media_type = MediaType::from_mime(content_type)
        .ok_or_else(|| anyhow::anyhow!("unsupported media type: {content_type}"))?;

    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    let stored_name = format!("{}.{ext}", Uuid::new_v4());

    tokio::fs::create_dir_all(media_dir)
        .await
        .context("failed to create media directory")?;
    tokio::fs::write(Path::new(media_dir).join(&stored_name), bytes)
        .await
        .context("failed to write media file")?;

    Ok((format!("/media/{stored_name}"), media_type))
}

/// Best-effort removal of a stored file by its public url path. Used to
/// undo a store when the booking insert itself fails.
pub async fn discard(media_dir: &str, media_url: &str) {
    if let Some(name) = media_url.strip_prefix("/media/") {
        let _ = tokio::fs::remove_file(Path::new(media_dir).join(name)).await;
    }
}

/// Reads a stored media file back. File names containing path separators
/// are refused so the lookup cannot escape the media directory.
pub async fn read_stored(media_dir: &str, file_name: &str) -> anyhow::Result<Option<Vec<u8>>> {
    if file_name.contains('/') || file_name.contains('\\') || file_name.contains("..") {
        return Ok(None);
    }

    match tokio::fs::read(Path::new(media_dir).join(file_name)).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("failed to read media file"),
    }
}

/// Best-effort content type for serving a stored file back.
pub fn content_type_for(file_name: &str) -> &'static str {
    match Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
    {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_read_roundtrip() {
        let dir = std::env::temp_dir().join(format!("screenbook-media-{}", Uuid::new_v4()));
        let dir = dir.to_str().unwrap().to_string();

        let (url, media_type) = store_upload(&dir, "ad.png", "image/png", b"fake-png")
            .await
            .unwrap();
        assert_eq!(media_type, MediaType::Image);
        assert!(url.starts_with("/media/"));
        assert!(url.ends_with(".png"));

        let file_name = url.strip_prefix("/media/").unwrap();
        let bytes = read_stored(&dir, file_name).await.unwrap().unwrap();
        assert_eq!(bytes, b"fake-png");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_discard_removes_stored_file() {
        let dir = std::env::temp_dir().join(format!("screenbook-media-{}", Uuid::new_v4()));
        let dir = dir.to_str().unwrap().to_string();

        let (url, _) = store_upload(&dir, "ad.png", "image/png", b"fake-png")
            .await
            .unwrap();
        discard(&dir, &url).await;

        let file_name = url.strip_prefix("/media/").unwrap();
        assert!(read_stored(&dir, file_name).await.unwrap().is_none());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_unsupported_mime_rejected() {
        let dir = std::env::temp_dir().join("screenbook-media-nope");
        let result = store_upload(dir.to_str().unwrap(), "x.pdf", "application/pdf", b"x").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_path_escape_refused() {
        let dir = std::env::temp_dir();
        let result = read_stored(dir.to_str().unwrap(), "../etc/passwd")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.mp4"), "video/mp4");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
