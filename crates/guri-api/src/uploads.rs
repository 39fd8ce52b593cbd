//! Local-disk storage for uploaded images and story media.
//!
//! Files get generated names and are served back under `/uploads`.

use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use guri_types::MediaType;

use crate::config::UploadsConfig;
use crate::error::{ApiError, ApiResult};

/// What an upload endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accept {
    Images,
    /// Story media
    ImagesAndVideo,
}

/// Extension for each accepted content type
fn extension_for(content_type: &str, accept: Accept) -> Option<&'static str> {
    let ext = match content_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "video/mp4" if accept == Accept::ImagesAndVideo => "mp4",
        "video/webm" if accept == Accept::ImagesAndVideo => "webm",
        "video/quicktime" if accept == Accept::ImagesAndVideo => "mov",
        _ => return None,
    };
    Some(ext)
}

/// An accepted upload. Nothing is on disk until [`UploadStore::commit`] runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub url: String,
    pub content_type: String,
    name: String,
}

impl StoredFile {
    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::from_content_type(&self.content_type)
    }
}

pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
    max_file_bytes: usize,
    max_files: usize,
}

impl UploadStore {
    pub fn new(config: &UploadsConfig, public_base_url: &str) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            url_prefix: format!("{}/uploads", public_base_url.trim_end_matches('/')),
            max_file_bytes: config.max_file_bytes,
            max_files: config.max_files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Check type and size and pick a name and URL, without touching disk
    pub fn prepare(&self, content_type: &str, bytes: &[u8], accept: Accept) -> ApiResult<StoredFile> {
        let ext = extension_for(content_type, accept)
            .ok_or_else(|| ApiError::UnsupportedMedia(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_file_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "{} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_file_bytes
            )));
        }

        let name = format!("{}.{}", Uuid::new_v4().simple(), ext);
        Ok(StoredFile {
            url: format!("{}/{}", self.url_prefix, name),
            content_type: content_type.to_string(),
            name,
        })
    }

    pub async fn commit(&self, file: &StoredFile, bytes: &[u8]) -> ApiResult<()> {
        self.ensure_dir().await?;
        tokio::fs::write(self.dir.join(&file.name), bytes).await?;
        tracing::debug!(file = %file.name, size = bytes.len(), "upload stored");
        Ok(())
    }

    /// Validate and write one file
    pub async fn save(&self, content_type: &str, bytes: &[u8], accept: Accept) -> ApiResult<StoredFile> {
        let file = self.prepare(content_type, bytes, accept)?;
        self.commit(&file, bytes).await?;
        Ok(file)
    }

    /// Every `images` part of a gallery upload, in order. Other parts are
    /// ignored. All parts are checked before the first one is written.
    pub async fn save_images(&self, mut multipart: Multipart) -> ApiResult<Vec<String>> {
        let mut accepted = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            if field.name() != Some("images") {
                continue;
            }
            if accepted.len() == self.max_files {
                return Err(ApiError::PayloadTooLarge(format!(
                    "at most {} files per upload",
                    self.max_files
                )));
            }
            let content_type = field
                .content_type()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("file part has no content type".to_string()))?;
            let bytes = field.bytes().await?;
            let file = self.prepare(&content_type, &bytes, Accept::Images)?;
            accepted.push((file, bytes));
        }

        if accepted.is_empty() {
            return Err(ApiError::BadRequest("no files in field 'images'".to_string()));
        }

        let mut urls = Vec::with_capacity(accepted.len());
        for (file, bytes) in &accepted {
            if let Err(err) = self.commit(file, bytes).await {
                self.discard(&urls).await;
                return Err(err);
            }
            urls.push(file.url.clone());
        }
        Ok(urls)
    }

    /// Remove files this store handed out. URLs it does not recognise are skipped.
    pub async fn discard(&self, urls: &[String]) {
        for url in urls {
            let Some(name) = url
                .strip_prefix(&self.url_prefix)
                .and_then(|rest| rest.strip_prefix('/'))
                .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.'))
            else {
                continue;
            };
            if let Err(err) = tokio::fs::remove_file(self.dir.join(name)).await {
                tracing::warn!(file = %name, error = %err, "failed to remove upload");
            }
        }
    }

    /// Pass `attached` through, removing `urls` again when it failed
    pub async fn settle<T>(&self, urls: &[String], attached: ApiResult<T>) -> ApiResult<T> {
        if attached.is_err() {
            self.discard(urls).await;
        }
        attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> UploadStore {
        let config = UploadsConfig {
            dir: dir.to_string_lossy().into_owned(),
            max_file_bytes: 16,
            max_files: 2,
        };
        UploadStore::new(&config, "https://cdn.guri.so/")
    }

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("guri-uploads-{}-{}", name, Uuid::new_v4().simple()))
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/jpeg", Accept::Images), Some("jpg"));
        assert_eq!(extension_for("IMAGE/PNG", Accept::Images), Some("png"));
        assert_eq!(extension_for("video/mp4", Accept::Images), None);
        assert_eq!(extension_for("video/mp4", Accept::ImagesAndVideo), Some("mp4"));
        assert_eq!(extension_for("application/pdf", Accept::ImagesAndVideo), None);
    }

    #[tokio::test]
    async fn test_save_writes_file_and_builds_url() {
        let dir = scratch_dir("save");
        let store = store(&dir);

        let stored = store.save("image/png", b"png-bytes", Accept::Images).await.unwrap();
        assert!(stored.url.starts_with("https://cdn.guri.so/uploads/"));
        assert!(stored.url.ends_with(".png"));
        assert_eq!(stored.media_type(), Some(MediaType::Image));

        let name = stored.url.rsplit('/').next().unwrap();
        assert_eq!(std::fs::read(dir.join(name)).unwrap(), b"png-bytes");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_save_rejects_bad_uploads() {
        let dir = scratch_dir("reject");
        let store = store(&dir);

        assert!(matches!(
            store.save("text/html", b"<p>", Accept::Images).await,
            Err(ApiError::UnsupportedMedia(_))
        ));
        assert!(matches!(
            store.save("image/png", &[0u8; 17], Accept::Images).await,
            Err(ApiError::PayloadTooLarge(_))
        ));
        assert!(matches!(
            store.save("image/png", b"", Accept::Images).await,
            Err(ApiError::BadRequest(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_prepare_writes_nothing() {
        let dir = scratch_dir("prepare");
        let store = store(&dir);

        let file = store.prepare("video/mp4", b"mp4", Accept::ImagesAndVideo).unwrap();
        assert_eq!(file.media_type(), Some(MediaType::Video));
        assert!(!dir.exists());

        store.commit(&file, b"mp4").await.unwrap();
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_discard_removes_only_own_files() {
        let dir = scratch_dir("discard");
        let store = store(&dir);

        let kept = store.save("image/png", b"keep", Accept::Images).await.unwrap();
        let dropped = store.save("image/gif", b"drop", Accept::Images).await.unwrap();
        store
            .discard(&[
                dropped.url.clone(),
                "https://elsewhere.example/uploads/x.png".to_string(),
                "https://cdn.guri.so/uploads/../secret".to_string(),
            ])
            .await;

        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![kept.url.rsplit('/').next().unwrap().to_string()]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_settle_discards_on_failure() {
        let dir = scratch_dir("settle");
        let store = store(&dir);

        let file = store.save("image/png", b"orphan", Accept::Images).await.unwrap();
        let failed: ApiResult<()> = Err(ApiError::not_found("Project", 7));
        let result = store.settle(&[file.url.clone()], failed).await;

        assert!(matches!(result, Err(ApiError::NotFound { .. })));
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
        std::fs::remove_dir_all(&dir).ok();
    }
}
