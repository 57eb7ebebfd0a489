use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::photo::Photo;
use crate::error::{Error, Result};
use crate::infra::PhotoStore;

pub const ATTR_OWNER: &str = "dog-name";
pub const ATTR_TIMESTAMP: &str = "timestamp";
pub const ATTR_KEY: &str = "key";
pub const ATTR_URL: &str = "url";
pub const ATTR_TAGS: &str = "tags";

type Item = HashMap<String, AttributeValue>;

/// DynamoDB table keyed by `dog-name` (hash) and `timestamp` (range).
#[derive(Clone)]
pub struct PhotoTable {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for PhotoTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoTable")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl PhotoTable {
    pub fn new(shared_config: &SdkConfig, config: &AppConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(shared_config);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: config.table_name.clone(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl PhotoStore for PhotoTable {
    async fn insert(&self, photo: &Photo) -> Result<()> {
        let item = photo_to_item(photo)?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|err| Error::store_unavailable(DisplayErrorContext(err)))?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Photo>> {
        let mut photos = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let out = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| Error::store_unavailable(DisplayErrorContext(err)))?;

            for item in out.items() {
                photos.push(item_to_photo(item)?);
            }
            match out.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }
        debug!(table = %self.table_name, count = photos.len(), "scanned photos");

        // Scan order is unspecified.
        Photo::sort_newest_first(&mut photos);
        Ok(photos)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Photo>> {
        let mut photos = Vec::new();
        let mut start_key: Option<Item> = None;
        loop {
            let out = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :owner")
                .expression_attribute_names("#pk", ATTR_OWNER)
                .expression_attribute_values(":owner", AttributeValue::S(owner.to_string()))
                .scan_index_forward(false)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| Error::store_unavailable(DisplayErrorContext(err)))?;

            for item in out.items() {
                photos.push(item_to_photo(item)?);
            }
            match out.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }
        debug!(table = %self.table_name, owner, count = photos.len(), "queried photos");

        Photo::sort_newest_first(&mut photos);
        Ok(photos)
    }
}

/// Converts a record to its wire attributes, rejecting records with empty
/// required fields. Numbers travel as decimal strings.
pub fn photo_to_item(photo: &Photo) -> Result<Item> {
    if photo.owner.is_empty() {
        return Err(Error::SchemaMismatch(ATTR_OWNER));
    }
    if photo.key.is_empty() {
        return Err(Error::SchemaMismatch(ATTR_KEY));
    }
    if photo.url.is_empty() {
        return Err(Error::SchemaMismatch(ATTR_URL));
    }

    let mut item = HashMap::from([
        (ATTR_OWNER.to_string(), AttributeValue::S(photo.owner.clone())),
        (ATTR_TIMESTAMP.to_string(), AttributeValue::N(photo.timestamp.to_string())),
        (ATTR_KEY.to_string(), AttributeValue::S(photo.key.clone())),
        (ATTR_URL.to_string(), AttributeValue::S(photo.url.clone())),
    ]);
    // A list rather than a string set: sets reject empty and repeated values.
    if let Some(tags) = &photo.tags {
        let tags = tags.iter().cloned().map(AttributeValue::S).collect();
        item.insert(ATTR_TAGS.to_string(), AttributeValue::L(tags));
    }
    Ok(item)
}

/// Parses a stored item. Any malformed attribute fails the whole item.
pub fn item_to_photo(item: &Item) -> Result<Photo> {
    let timestamp = item
        .get(ATTR_TIMESTAMP)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| Error::CorruptRecord(format!("missing attribute {}", ATTR_TIMESTAMP)))?;
    let timestamp = timestamp
        .parse::<i64>()
        .map_err(|err| Error::CorruptRecord(format!("timestamp {:?}: {}", timestamp, err)))?;

    Ok(Photo {
        owner: required_string(item, ATTR_OWNER)?,
        key: required_string(item, ATTR_KEY)?,
        timestamp,
        url: required_string(item, ATTR_URL)?,
        tags: tags(item)?,
    })
}

fn required_string(item: &Item, name: &str) -> Result<String> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| Error::CorruptRecord(format!("missing attribute {}", name)))
}

fn tags(item: &Item) -> Result<Option<Vec<String>>> {
    match item.get(ATTR_TAGS) {
        None => Ok(None),
        Some(AttributeValue::Ss(values)) => Ok(Some(values.clone())),
        Some(AttributeValue::L(values)) => values
            .iter()
            .map(|v| {
                v.as_s()
                    .cloned()
                    .map_err(|_| Error::CorruptRecord(format!("non-string value in {}", ATTR_TAGS)))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(_) => Err(Error::CorruptRecord(format!("unexpected type for {}", ATTR_TAGS))),
    }
}
