use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use uuid::Uuid;

/// Lifetime of presigned CV download links.
pub const CV_URL_TTL: Duration = Duration::from_secs(15 * 60);

#[async_trait]
pub trait ObjectStorage: Send + Sync + 'static {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
        content_disposition: Option<String>,
    ) -> Result<()>;

    async fn presign_get_object(&self, key: &str, expires_in: Duration) -> Result<String>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}

pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
        content_disposition: Option<String>,
    ) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }
        if let Some(content_disposition) = content_disposition {
            request = request.content_disposition(content_disposition);
        }

        request.send().await.context("failed to upload CV to S3")?;
        Ok(())
    }

    async fn presign_get_object(&self, key: &str, expires_in: Duration) -> Result<String> {
        let presign_config = PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .context("failed to build S3 presigning config")?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .context("failed to generate presigned CV URL")?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .context("failed to delete CV from S3")?;
        Ok(())
    }
}

/// Longest filename kept in a CV object key. Keys must fit `cv_file`.
pub const MAX_CV_FILENAME_CHARS: usize = 200;

/// Shortens the stem of an overlong name, keeping its extension.
fn truncate_filename(name: String, max: usize) -> String {
    if name.chars().count() <= max {
        return name;
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().count() < max / 2 => {
            (stem, Some(ext))
        }
        _ => (name.as_str(), None),
    };
    let reserved = extension.map_or(0, |ext| ext.chars().count() + 1);
    let mut truncated: String = stem.chars().take(max - reserved).collect();
    if let Some(ext) = extension {
        truncated.push('.');
        truncated.push_str(ext);
    }
    truncated
}

/// Replaces path separators and control characters so the name is safe as
/// the last segment of an object key. Long names are shortened to
/// [`MAX_CV_FILENAME_CHARS`].
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let cleaned: String = base
        .chars()
        .map(|ch| match ch {
            '"' | '\\' | '/' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect();
    if cleaned.is_empty() {
        "cv".to_string()
    } else {
        truncate_filename(cleaned, MAX_CV_FILENAME_CHARS)
    }
}

pub fn cv_object_key(applicant_id: Uuid, uploaded_at_millis: i64, filename: &str) -> String {
    format!(
        "cv/{applicant_id}/{uploaded_at_millis}-{}",
        sanitize_filename(filename)
    )
}

/// Original filename recovered from a key built by [`cv_object_key`].
pub fn filename_from_key(key: &str) -> &str {
    let last = key.rsplit('/').next().unwrap_or(key);
    match last.split_once('-') {
        Some((millis, name)) if millis.chars().all(|c| c.is_ascii_digit()) => name,
        _ => last,
    }
}

pub fn attachment_content_disposition(filename: &str) -> String {
    let sanitized = sanitize_filename(filename);
    let encoded =
        percent_encoding::utf8_percent_encode(&sanitized, percent_encoding::NON_ALPHANUMERIC);
    format!("attachment; filename=\"{sanitized}\"; filename*=UTF-8''{encoded}")
}

/// Prefers the declared content type, then guesses from the extension.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    declared
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != "application/octet-stream")
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
}
