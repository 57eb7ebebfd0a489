#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use time::UtcOffset;
use tower::ServiceExt;

use dogfeed::app::photos::PhotoService;
use dogfeed::config::AppConfig;
use dogfeed::domain::photo::Photo;
use dogfeed::error::{Error, Result};
use dogfeed::http::Pages;
use dogfeed::infra::{BlobStore, PhotoStore};
use dogfeed::AppState;

pub const STYLESHEET: &str = "https://assets.s3.amazonaws.com/main.css";
pub const BLOB_BASE_URL: &str = "https://pics.example";

// ---------------------------------------------------------------------------
// In-memory stores that record every call
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryBlobs {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_upload: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MemoryBlobs {
    pub fn uploaded(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobs {
    async fn upload(&self, key: &str, _content_type: &str, _body: Bytes) -> Result<String> {
        self.uploads.lock().unwrap().push(key.to_string());
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("bucket is down".into()));
        }
        Ok(format!("{}/{}", BLOB_BASE_URL, key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("bucket is down".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTable {
    rows: Mutex<Vec<Photo>>,
    pub insert_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub fail_insert: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryTable {
    pub fn seed(&self, photo: Photo) {
        self.rows.lock().unwrap().push(photo);
    }

    pub fn rows(&self) -> Vec<Photo> {
        self.rows.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst) + self.read_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoStore for MemoryTable {
    async fn insert(&self, photo: &Photo) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("table is down".into()));
        }
        self.rows.lock().unwrap().push(photo.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Photo>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("table is down".into()));
        }
        let mut rows = self.rows();
        Photo::sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Photo>> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailable("table is down".into()));
        }
        let mut rows: Vec<Photo> = self.rows().into_iter().filter(|p| p.owner == owner).collect();
        Photo::sort_newest_first(&mut rows);
        Ok(rows)
    }
}

pub fn photo(owner: &str, timestamp: i64) -> Photo {
    let key = format!("{}/{}.jpg", owner, timestamp);
    Photo {
        owner: owner.to_string(),
        url: format!("{}/{}", BLOB_BASE_URL, key),
        key,
        timestamp,
        tags: None,
    }
}

// ---------------------------------------------------------------------------
// TestApp — the real router over in-memory stores
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub blobs: Arc<MemoryBlobs>,
    pub table: Arc<MemoryTable>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body_bytes).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.body_bytes.is_empty()
    }
}

pub enum Part<'a> {
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

const BOUNDARY: &str = "dogfeed-test-boundary";

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

impl TestApp {
    pub fn new() -> Self {
        let blobs = Arc::new(MemoryBlobs::default());
        let table = Arc::new(MemoryTable::default());

        let state = AppState {
            photos: PhotoService::new(blobs.clone(), table.clone()),
            pages: Pages::new().expect("templates register"),
            stylesheet_url: STYLESHEET.to_string(),
            local_offset: UtcOffset::UTC,
            upload_max_bytes: 1024 * 1024,
        };

        TestApp {
            router: dogfeed::http::router(state),
            blobs,
            table,
        }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        send(&self.router, request).await
    }

    pub async fn post_form(&self, path: &str, parts: &[Part<'_>]) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        send(&self.router, request).await
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("oneshot failed");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to collect body")
        .to_bytes();

    TestResponse {
        status,
        headers,
        body_bytes,
    }
}

// ---------------------------------------------------------------------------
// Throwaway HTTP servers standing in for external endpoints
// ---------------------------------------------------------------------------

pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("test server addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    listener.local_addr().expect("probe addr")
}

pub fn frontend_config(s3_endpoint: &str, dynamodb_endpoint: &str) -> AppConfig {
    let vars: HashMap<&str, String> = HashMap::from([
        ("BUCKET_NAME", "pics".to_string()),
        ("MY_TABLE_NAME", "photos".to_string()),
        ("ASSETS_BUCKET_NAME", "assets".to_string()),
        ("AWS_REGION", "us-east-1".to_string()),
        ("S3_ENDPOINT", s3_endpoint.to_string()),
        ("DYNAMODB_ENDPOINT", dynamodb_endpoint.to_string()),
    ]);
    AppConfig::from_lookup(|key| vars.get(key).cloned()).expect("test config")
}

/// Dummy credentials for clients pointed at the fake endpoints.
pub fn set_test_credentials() {
    std::env::set_var("AWS_ACCESS_KEY_ID", "test");
    std::env::set_var("AWS_SECRET_ACCESS_KEY", "test");
    std::env::set_var("AWS_EC2_METADATA_DISABLED", "true");
}
