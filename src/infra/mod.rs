pub mod storage;
pub mod table;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use bytes::Bytes;

use crate::config::AppConfig;
use crate::domain::photo::Photo;
use crate::error::Result;

/// Bucket-like blob storage holding the uploaded pictures.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `body` under `key`, makes it publicly readable and returns its URL.
    async fn upload(&self, key: &str, content_type: &str, body: Bytes) -> Result<String>;

    async fn delete(&self, key: &str) -> Result<()>;
}

/// Table-like store of photo records.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn insert(&self, photo: &Photo) -> Result<()>;

    /// Every record, newest first.
    async fn list_all(&self) -> Result<Vec<Photo>>;

    /// Records for one owner, newest first.
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Photo>>;
}

/// Loads the AWS configuration shared by the S3 and DynamoDB clients.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    let region_provider = RegionProviderChain::first_try(Region::new(config.aws_region.clone()));
    aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await
}
