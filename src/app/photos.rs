use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::app::view::{self, DisplayItem};
use crate::domain::photo::{Photo, Upload};
use crate::error::{Error, Result};
use crate::infra::{BlobStore, PhotoStore};

#[derive(Clone)]
pub struct PhotoService {
    blobs: Arc<dyn BlobStore>,
    photos: Arc<dyn PhotoStore>,
}

impl PhotoService {
    pub fn new(blobs: Arc<dyn BlobStore>, photos: Arc<dyn PhotoStore>) -> Self {
        Self { blobs, photos }
    }

    pub async fn feed(&self, now: OffsetDateTime) -> Result<Vec<DisplayItem>> {
        let photos = self.photos.list_all().await?;
        Ok(view::to_view_models(&photos, now))
    }

    pub async fn owner_feed(&self, owner: &str, now: OffsetDateTime) -> Result<Vec<DisplayItem>> {
        let photos = self.photos.list_by_owner(owner).await?;
        Ok(view::to_view_models(&photos, now))
    }

    /// Uploads the file, then records it. If the record cannot be written the
    /// blob is deleted again; a failed delete leaves an orphan that is only
    /// logged.
    pub async fn add_photo(&self, owner: &str, upload: Upload, now: OffsetDateTime) -> Result<Photo> {
        if owner.trim().is_empty() {
            return Err(Error::Validation("no dog specified :(".to_string()));
        }

        let timestamp = now.unix_timestamp();
        let key = object_key(owner, timestamp, &upload.content_type);

        let url = self
            .blobs
            .upload(&key, &upload.content_type, upload.body)
            .await?;

        let photo = Photo {
            owner: owner.to_string(),
            key,
            timestamp,
            url,
            tags: upload.tags,
        };

        if let Err(err) = self.photos.insert(&photo).await {
            warn!(error = %err, key = %photo.key, "failed to record photo, deleting upload");
            match self.blobs.delete(&photo.key).await {
                Ok(()) => info!(key = %photo.key, "deleted orphaned upload"),
                Err(delete_err) => {
                    warn!(error = %delete_err, key = %photo.key, "failed to delete orphaned upload")
                }
            }
            return Err(err);
        }

        info!(owner, key = %photo.key, "added photo");
        Ok(photo)
    }
}

/// `{owner}/{unix seconds}.{ext}`
pub fn object_key(owner: &str, timestamp: i64, content_type: &str) -> String {
    format!("{}/{}.{}", owner, timestamp, extension_from_content_type(content_type))
}

fn extension_from_content_type(content_type: &str) -> String {
    let subtype = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .strip_prefix("image/")
        .unwrap_or_default()
        .to_ascii_lowercase();

    match subtype.as_str() {
        "jpeg" | "jpg" | "pjpeg" => "jpg".to_string(),
        other => {
            let ext: String = other
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if ext.is_empty() {
                "gif".to_string()
            } else {
                ext
            }
        }
    }
}

/// Splits the raw `tags` form value on commas. Segments are kept verbatim:
/// no trimming, duplicates and empty segments included.
pub fn parse_tags(raw: Option<&str>) -> Option<Vec<String>> {
    match raw {
        None | Some("") => None,
        Some(raw) => Some(raw.split(',').map(str::to_string).collect()),
    }
}
