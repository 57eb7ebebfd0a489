use serde::{Deserialize, Serialize};

/// A single uploaded picture. Records are written once and never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub owner: String,
    pub key: String,
    /// Unix seconds, assigned by the server at upload time.
    pub timestamp: i64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Photo {
    /// Most recent first.
    pub fn sort_newest_first(photos: &mut [Photo]) {
        photos.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }
}

/// Bytes of an uploaded file together with the metadata the form sent.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub body: bytes::Bytes,
    pub tags: Option<Vec<String>>,
}

impl Upload {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
