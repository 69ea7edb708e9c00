//! Image upload storage behind the `BlobStorage` port.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use rand::Rng;
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

pub const MAX_UPLOAD_SIZE: usize = 4 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "heic", "heif"];

#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), AppError>;
    /// `None` when no blob with that name exists.
    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError>;
}

pub struct LocalBlobStorage {
    dir: PathBuf,
}

impl LocalBlobStorage {
    pub async fn new(data_dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = data_dir.as_ref().join("uploads");
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
        }
        Ok(Self { dir })
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        fs::write(self.dir.join(name), bytes)
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("upload write failed: {e}")))
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        match fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::StorageError(anyhow::anyhow!(
                "upload read failed: {e}"
            ))),
        }
    }
}

pub struct S3BlobStorage {
    client: S3Client,
    bucket: String,
}

impl S3BlobStorage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn key(name: &str) -> String {
        format!("uploads/{name}")
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::key(name))
            .body(ByteStream::from(bytes))
            .content_type(mime_from_extension(name))
            .send()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 upload failed: {e}")))?;
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<Vec<u8>>, AppError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::key(name))
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    return Ok(None);
                }
                return Err(AppError::StorageError(anyhow::anyhow!(
                    "S3 download failed: {service_err}"
                )));
            }
        };

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 body collection failed: {e}")))?
            .into_bytes()
            .to_vec();
        Ok(Some(bytes))
    }
}

/// Server-generated name: millisecond timestamp plus a random token,
/// with the client extension kept only when it is a known image type.
pub fn safe_file_name(original: &str) -> String {
    let extension = original
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| "jpg".to_string());

    let millis = chrono::Utc::now().timestamp_millis();
    let token: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("{millis}-{token}.{extension}")
}

/// Strip any path components a client might smuggle into the name.
pub fn sanitize_blob_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

pub fn mime_from_extension(name: &str) -> &'static str {
    match name.rsplit('.').next().map(|ext| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

pub type SharedBlobStorage = Arc<dyn BlobStorage>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_file_name_keeps_known_extensions() {
        let name = safe_file_name("schita finala.PNG");
        assert!(name.ends_with(".png"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn safe_file_name_defaults_unknown_extensions_to_jpg() {
        assert!(safe_file_name("payload.exe").ends_with(".jpg"));
        assert!(safe_file_name("no-extension").ends_with(".jpg"));
    }

    #[test]
    fn blob_names_are_stripped_of_paths() {
        assert_eq!(sanitize_blob_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_blob_name("windows\\path\\a.png"), "a.png");
        assert_eq!(sanitize_blob_name("plain.jpg"), "plain.jpg");
    }

    #[test]
    fn mime_types_match_extensions() {
        assert_eq!(mime_from_extension("a.png"), "image/png");
        assert_eq!(mime_from_extension("a.webp"), "image/webp");
        assert_eq!(mime_from_extension("a.jpg"), "image/jpeg");
        assert_eq!(mime_from_extension("weird"), "image/jpeg");
    }

    #[tokio::test]
    async fn local_blob_storage_round_trips() {
        let dir = std::env::temp_dir().join(format!("assistant-uploads-{}", uuid::Uuid::new_v4()));
        let storage = LocalBlobStorage::new(&dir).await.unwrap();

        storage.put("test.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(storage.get("test.png").await.unwrap(), Some(vec![1, 2, 3]));
        assert!(storage.get("missing.png").await.unwrap().is_none());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
