//! Statuses API: home timeline, mentions, posting and reposting.

use crate::api::comments::{AuthorFilter, SourceFilter};
use crate::api::{check_id, check_text, Paging, MAX_STATUS_LEN};
use crate::client::{RequestDescriptor, WeiboClient};
use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::params::{batch_ids, Blob, ParameterBag};

/// Most picture ids `upload_url_text` accepts.
pub const PIC_ID_MAX: usize = 9;

/// Largest picture `upload` accepts.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

const PICTURE_TYPES: [&str; 3] = ["image/jpeg", "image/gif", "image/png"];

/// Kind of status to return from the home timeline (`feature`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Feature {
    #[default]
    All = 0,
    Original = 1,
    Picture = 2,
    Video = 3,
    Music = 4,
}

/// Original statuses only, or reposts too (`filter_by_type`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeFilter {
    #[default]
    All = 0,
    Original = 1,
}

/// Whether a repost also leaves a comment (`is_comment`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum RepostComment {
    #[default]
    None = 0,
    OnCurrent = 1,
    OnOriginal = 2,
    OnBoth = 3,
}

pub struct StatusesApi<'a> {
    client: &'a WeiboClient,
}

impl<'a> StatusesApi<'a> {
    pub(crate) fn new(client: &'a WeiboClient) -> Self {
        Self { client }
    }

    /// Statuses of the current user and the accounts they follow.
    pub fn friends_timeline(
        &self,
        paging: &Paging,
        base_app: bool,
        feature: Feature,
        trim_user: bool,
    ) -> Result<RequestDescriptor, ApiError> {
        let mut params = paging.to_params()?;
        params
            .put_flag("base_app", base_app)
            .put_flag("trim_user", trim_user)
            .put("feature", feature as u8);
        self.client.build(Operation::StatusesFriendsTimeline, params)
    }

    /// Statuses that @-mention the current user.
    pub fn mentions(
        &self,
        paging: &Paging,
        author: AuthorFilter,
        source: SourceFilter,
        filter_type: TypeFilter,
        trim_user: bool,
    ) -> Result<RequestDescriptor, ApiError> {
        let mut params = paging.to_params()?;
        params
            .put("filter_by_author", author as u8)
            .put("filter_by_source", source as u8)
            .put("filter_by_type", filter_type as u8)
            .put_flag("trim_user", trim_user);
        self.client.build(Operation::StatusesMentions, params)
    }

    /// Post a text status. Two consecutive identical statuses are rejected
    /// by the server.
    pub fn update(
        &self,
        status: &str,
        lat: Option<f64>,
        long: Option<f64>,
    ) -> Result<RequestDescriptor, ApiError> {
        let params = update_params(status, lat, long)?;
        self.client.build(Operation::StatusesUpdate, params)
    }

    /// Repost status `id`, optionally with added text.
    pub fn repost(
        &self,
        id: i64,
        status: Option<&str>,
        is_comment: RepostComment,
    ) -> Result<RequestDescriptor, ApiError> {
        check_id("id", id)?;
        if let Some(text) = status {
            check_text("status", text, MAX_STATUS_LEN)?;
        }
        let mut params = ParameterBag::new();
        params
            .put("id", id)
            .put_opt("status", status)
            .put("is_comment", is_comment as u8);
        self.client.build(Operation::StatusesRepost, params)
    }

    /// Post a status with one picture (JPEG, GIF or PNG, at most 5 MiB).
    pub fn upload(
        &self,
        status: &str,
        pic: Blob,
        lat: Option<f64>,
        long: Option<f64>,
    ) -> Result<RequestDescriptor, ApiError> {
        check_picture(&pic)?;
        let mut params = update_params(status, lat, long)?;
        params.put("pic", pic);
        self.client.build(Operation::StatusesUpload, params)
    }

    /// Post a status with a picture given by URL or by already-uploaded
    /// picture ids. The server prefers `pic_id` when both are sent.
    pub fn upload_url_text(
        &self,
        status: &str,
        url: Option<&str>,
        pic_ids: &[&str],
        lat: Option<f64>,
        long: Option<f64>,
    ) -> Result<RequestDescriptor, ApiError> {
        if url.is_none() && pic_ids.is_empty() {
            return Err(ApiError::validation("url", "either url or pic_id is required"));
        }
        if let Some(url) = url {
            if !url.starts_with("http") {
                return Err(ApiError::validation("url", "must be an http(s) URL"));
            }
        }
        let mut params = update_params(status, lat, long)?;
        params.put_opt("url", url);
        if !pic_ids.is_empty() {
            params.put("pic_id", batch_ids(pic_ids, PIC_ID_MAX)?);
        }
        self.client.build(Operation::StatusesUploadUrlText, params)
    }
}

fn update_params(status: &str, lat: Option<f64>, long: Option<f64>) -> Result<ParameterBag, ApiError> {
    check_text("status", status, MAX_STATUS_LEN)?;
    check_coordinate("lat", lat, 90.0)?;
    check_coordinate("long", long, 180.0)?;
    let mut params = ParameterBag::new();
    params
        .put("status", status)
        .put_opt("long", long.map(|v| v.to_string()))
        .put_opt("lat", lat.map(|v| v.to_string()));
    Ok(params)
}

fn check_coordinate(field: &'static str, value: Option<f64>, bound: f64) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > bound => Err(ApiError::validation(
            field,
            format!("must be within [-{bound}, {bound}], got {v}"),
        )),
        _ => Ok(()),
    }
}

fn check_picture(pic: &Blob) -> Result<(), ApiError> {
    if pic.bytes.is_empty() {
        return Err(ApiError::validation("pic", "picture is empty"));
    }
    if pic.bytes.len() > MAX_PICTURE_BYTES {
        return Err(ApiError::validation(
            "pic",
            format!("picture is {} bytes, limit is {MAX_PICTURE_BYTES}", pic.bytes.len()),
        ));
    }
    if !PICTURE_TYPES.contains(&pic.content_type.as_str()) {
        return Err(ApiError::validation(
            "pic",
            format!("unsupported content type {}", pic.content_type),
        ));
    }
    Ok(())
}
