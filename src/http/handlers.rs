use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use url::Url;

use crate::app::photos::parse_tags;
use crate::app::view::{AddPage, FeedPage, PageData};
use crate::domain::photo::Upload;
use crate::http::pages::{ADD, INDEX};
use crate::http::AppError;
use crate::{AppState, RelayState};

pub const FORM_FILE_KEY: &str = "myFile";
pub const FORM_TAGS_KEY: &str = "tags";

pub const ERR_NO_DOG_SPECIFIED: &str = "no dog specified :(";
pub const ERR_BAD_FILE: &str = "bad file o_O";

pub async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

/// Every photo, newest first.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let items = state.photos.feed(state.now()).await.map_err(|err| {
        error!(error = %err, "failed to list photos");
        AppError::internal(format!("cannot scan photos: {}", err))
    })?;

    let page = FeedPage::global(page_data(&state), items);
    state.pages.render(INDEX, &page)
}

pub async fn show_owner(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Html<String>, AppError> {
    let items = state
        .photos
        .owner_feed(&owner, state.now())
        .await
        .map_err(|err| {
            error!(error = %err, owner = %owner, "failed to list photos for owner");
            AppError::internal(format!("cannot query photos: {}", err))
        })?;

    let page = FeedPage::for_owner(page_data(&state), &owner, items);
    state.pages.render(INDEX, &page)
}

pub async fn add_page(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Html<String>, AppError> {
    if owner.trim().is_empty() {
        return Err(AppError::bad_request(ERR_NO_DOG_SPECIFIED));
    }

    let page = AddPage {
        page: page_data(&state),
        dog_name: owner,
    };
    state.pages.render(ADD, &page)
}

pub async fn add_photo(
    State(state): State<AppState>,
    Path(owner): Path<String>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    if owner.trim().is_empty() {
        return Err(AppError::bad_request(ERR_NO_DOG_SPECIFIED));
    }

    let mut file = None;
    let mut raw_tags = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        warn!(error = %err, "error parsing form");
        AppError::bad_request(ERR_BAD_FILE)
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FORM_FILE_KEY) => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().unwrap_or_default().to_string();
                let body = field.bytes().await.map_err(|err| {
                    warn!(error = %err, "error reading file");
                    AppError::bad_request(ERR_BAD_FILE)
                })?;
                file = Some((file_name, content_type, body));
            }
            Some(FORM_TAGS_KEY) => {
                raw_tags = Some(field.text().await.map_err(|err| {
                    warn!(error = %err, "error reading tags");
                    AppError::bad_request(ERR_BAD_FILE)
                })?);
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, body)) = file else {
        warn!(owner = %owner, "form has no {} field", FORM_FILE_KEY);
        return Err(AppError::bad_request(ERR_BAD_FILE));
    };

    let upload = Upload {
        file_name,
        content_type,
        body,
        tags: parse_tags(raw_tags.as_deref()),
    };
    if !upload.is_image() {
        info!(file = ?upload.file_name, content_type = %upload.content_type, "file is not an image");
        return Ok(Redirect::to(&owner_location(&owner, Some("add"))));
    }
    info!(
        file = ?upload.file_name,
        bytes = upload.body.len(),
        content_type = %upload.content_type,
        "uploaded file"
    );

    state
        .photos
        .add_photo(&owner, upload, state.now())
        .await
        .map_err(|err| {
            error!(error = %err, owner = %owner, "failed to add photo");
            AppError::from(err)
        })?;

    Ok(Redirect::to(&owner_location(&owner, None)))
}

#[derive(Debug, Deserialize)]
pub struct NewPhotoNotice {
    pub s3url: String,
}

/// Announces a new photo of `name` in the chat room.
pub async fn announce(
    State(state): State<RelayState>,
    Path(name): Path<String>,
    Json(notice): Json<NewPhotoNotice>,
) -> Result<StatusCode, AppError> {
    info!(name = %name, "announcement requested");
    state
        .relay
        .announce(&name, &notice.s3url)
        .await
        .map_err(|err| {
            error!(error = %err, "failed to send message to chat room");
            AppError::from(err)
        })?;

    Ok(StatusCode::CREATED)
}

fn page_data(state: &AppState) -> PageData {
    PageData {
        stylesheet: state.stylesheet_url.clone(),
    }
}

/// Path to an owner's feed (or a page below it) with the owner encoded as a
/// single segment.
pub fn owner_location(owner: &str, tail: Option<&str>) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return match tail {
            Some(tail) => format!("/{}/{}", owner, tail),
            None => format!("/{}", owner),
        };
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(owner).extend(tail);
    }
    url.path().to_string()
}
