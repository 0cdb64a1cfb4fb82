//! Avatar object storage.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::errors::AppError;

/// Accepted image types: content type, file extension, leading magic bytes.
const IMAGE_TYPES: &[(&str, &str, &[u8])] = &[
    ("image/png", "png", b"\x89PNG\r\n\x1a\n"),
    ("image/jpeg", "jpg", b"\xff\xd8\xff"),
    ("image/gif", "gif", b"GIF8"),
    ("image/webp", "webp", b"RIFF"),
];

/// Object storage for profile pictures.
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Store an image and return its public URL.
    async fn put(&self, user_id: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError>;
}

/// Stores avatars as files in a local directory served under `/avatars`.
pub struct LocalAvatarStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalAvatarStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
            max_bytes,
        }
    }
}

#[async_trait]
impl AvatarStore for LocalAvatarStore {
    async fn put(&self, user_id: &str, content_type: &str, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Image is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds {} bytes",
                self.max_bytes
            )));
        }
        let ext = image_extension(content_type, bytes)?;

        let file_name = format!("{}-{}.{}", user_id, uuid::Uuid::new_v4(), ext);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(user_id, file = %file_name, size = bytes.len(), "Avatar stored");

        Ok(format!("{}/avatars/{}", self.public_base_url, file_name))
    }
}

/// Check the declared type against the allow-list and the file's own header.
fn image_extension(content_type: &str, bytes: &[u8]) -> Result<&'static str, AppError> {
    let content_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let (_, ext, magic) = IMAGE_TYPES
        .iter()
        .find(|(mime, _, _)| *mime == content_type)
        .ok_or_else(|| {
            AppError::Validation(format!("Unsupported image type '{}'", content_type))
        })?;

    let matches = bytes.starts_with(magic)
        && (*ext != "webp" || bytes.get(8..12) == Some(b"WEBP".as_slice()));
    if !matches {
        return Err(AppError::Validation(
            "Image content does not match its declared type".to_string(),
        ));
    }

    Ok(*ext)
}
