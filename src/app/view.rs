use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::photo::Photo;

const GLOBAL_TITLE_FLAVOR: &str = "dog pics";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub url: String,
    pub owner_label: String,
    pub friendly_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageData {
    pub stylesheet: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    #[serde(flatten)]
    pub page: PageData,
    pub items: Vec<DisplayItem>,
    pub title_flavor: String,
}

impl FeedPage {
    pub fn global(page: PageData, items: Vec<DisplayItem>) -> Self {
        Self {
            page,
            items,
            title_flavor: GLOBAL_TITLE_FLAVOR.to_string(),
        }
    }

    pub fn for_owner(page: PageData, owner: &str, items: Vec<DisplayItem>) -> Self {
        Self {
            page,
            items,
            title_flavor: owner.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddPage {
    #[serde(flatten)]
    pub page: PageData,
    pub dog_name: String,
}

/// Buckets an upload time into "today", "yesterday", "N days ago" or
/// "N weeks ago".
///
/// "yesterday" is decided by comparing the elapsed hours with the wall-clock
/// hour of `now`, not by calendar day, so the result is only approximate
/// around midnight.
pub fn relative_time(uploaded_at: i64, now: OffsetDateTime) -> String {
    let elapsed_nanos = now.unix_timestamp_nanos() - i128::from(uploaded_at) * 1_000_000_000;
    let hours = elapsed_nanos as f64 / 3_600_000_000_000.0;
    let crosses_midnight = f64::from(now.hour()) - hours < 0.0;

    if hours < 24.0 {
        if crosses_midnight {
            "yesterday".to_string()
        } else {
            "today".to_string()
        }
    } else if hours / 24.0 < 7.0 {
        format!("{} days ago", (hours / 24.0) as i64)
    } else {
        format!("{} weeks ago", (hours / 24.0 / 7.0) as i64)
    }
}

pub fn to_view_model(photo: &Photo, now: OffsetDateTime) -> DisplayItem {
    DisplayItem {
        url: photo.url.clone(),
        owner_label: photo.owner.clone(),
        friendly_date: relative_time(photo.timestamp, now),
    }
}

pub fn to_view_models(photos: &[Photo], now: OffsetDateTime) -> Vec<DisplayItem> {
    photos.iter().map(|photo| to_view_model(photo, now)).collect()
}
