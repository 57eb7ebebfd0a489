pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod infra;

use time::{OffsetDateTime, UtcOffset};

use crate::app::photos::PhotoService;
use crate::app::relay::RelayService;
use crate::http::Pages;

#[derive(Clone)]
pub struct AppState {
    pub photos: PhotoService,
    pub pages: Pages,
    pub stylesheet_url: String,
    /// Offset used for "today"/"yesterday" decisions.
    pub local_offset: UtcOffset,
    pub upload_max_bytes: usize,
}

impl AppState {
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.local_offset)
    }
}

#[derive(Clone)]
pub struct RelayState {
    pub relay: RelayService,
}
