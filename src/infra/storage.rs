use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;
use url::Url;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::infra::BlobStore;

#[derive(Clone)]
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    region: String,
    public_endpoint: Option<String>,
}

impl ObjectStorage {
    pub fn new(shared_config: &SdkConfig, config: &AppConfig) -> Self {
        let mut s3_builder = aws_sdk_s3::config::Builder::from(shared_config)
            .region(shared_config.region().cloned());
        if let Some(endpoint) = &config.s3_endpoint {
            s3_builder = s3_builder.endpoint_url(endpoint.clone()).force_path_style(true);
        }
        if let Some(provider) = shared_config.credentials_provider() {
            s3_builder = s3_builder.credentials_provider(provider);
        }

        Self {
            client: Client::from_conf(s3_builder.build()),
            bucket: config.photo_bucket.clone(),
            region: config.aws_region.clone(),
            public_endpoint: config.s3_public_endpoint.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for ObjectStorage {
    async fn upload(&self, key: &str, content_type: &str, body: Bytes) -> Result<String> {
        let bytes = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| Error::store_unavailable(DisplayErrorContext(err)))?;
        debug!(bucket = %self.bucket, key, bytes, "wrote object");

        // Some buckets ignore the ACL sent with the write; set it explicitly.
        self.client
            .put_object_acl()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|err| Error::AclError {
                key: key.to_string(),
                message: DisplayErrorContext(err).to_string(),
            })?;

        Ok(public_object_url(
            self.public_endpoint.as_deref(),
            &self.bucket,
            &self.region,
            key,
        ))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| Error::store_unavailable(DisplayErrorContext(err)))?;
        Ok(())
    }
}

/// URL under which a public-read object is served. Key segments are
/// percent-encoded individually so `/` keeps separating them.
pub fn public_object_url(
    public_endpoint: Option<&str>,
    bucket: &str,
    region: &str,
    key: &str,
) -> String {
    let base = match public_endpoint {
        Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), bucket),
        None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
    };

    let Ok(mut url) = Url::parse(&base) else {
        return format!("{}/{}", base, key);
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(key.split('/'));
    }
    url.to_string()
}
