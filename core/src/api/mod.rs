//! Per-group method surfaces built on `WeiboClient::build`.
//!
//! # Design
//! Each group is a borrowed view over the client. A method validates its
//! arguments, fills a `ParameterBag` through a private builder and returns
//! the authenticated `RequestDescriptor`; the caller then picks blocking or
//! non-blocking dispatch. Nothing here touches the network, so every error a
//! method returns is local.

mod comments;
mod invite;
mod logout;
mod statuses;
mod users;

pub use comments::{AuthorFilter, CommentsApi, SourceFilter, DESTROY_BATCH_MAX, SHOW_BATCH_MAX};
pub use invite::{Invitation, InviteApi, MAX_INVITE_TEXT};
pub use logout::LogoutApi;
pub use statuses::{
    Feature, RepostComment, StatusesApi, TypeFilter, MAX_PICTURE_BYTES, PIC_ID_MAX,
};
pub use users::{UserRef, UsersApi, COUNTS_MAX};

use crate::error::ApiError;
use crate::params::ParameterBag;

/// Longest status or comment, in Weibo characters.
pub const MAX_STATUS_LEN: usize = 140;

/// Largest page size the timeline endpoints accept.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Cursor and page window shared by every timeline-style read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Only return items newer than this id; `0` disables the bound.
    pub since_id: i64,
    /// Only return items older than or equal to this id; `0` disables it.
    pub max_id: i64,
    pub count: u32,
    pub page: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            since_id: 0,
            max_id: 0,
            count: 50,
            page: 1,
        }
    }
}

impl Paging {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        check_cursor("since_id", self.since_id)?;
        check_cursor("max_id", self.max_id)?;
        if self.count == 0 || self.count > MAX_PAGE_SIZE {
            return Err(ApiError::validation(
                "count",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {}", self.count),
            ));
        }
        if self.page == 0 {
            return Err(ApiError::validation("page", "pages start at 1"));
        }
        Ok(())
    }

    /// Validated `since_id`, `max_id`, `count`, `page` parameters.
    fn to_params(self) -> Result<ParameterBag, ApiError> {
        self.validate()?;
        let mut params = ParameterBag::new();
        params
            .put("since_id", self.since_id)
            .put("max_id", self.max_id)
            .put("count", self.count)
            .put("page", self.page);
        Ok(params)
    }
}

/// Length as Weibo counts it: ASCII characters count half, rounded up.
pub fn weibo_len(text: &str) -> usize {
    let (ascii, wide) = text.chars().fold((0usize, 0usize), |(ascii, wide), c| {
        if c.is_ascii() {
            (ascii + 1, wide)
        } else {
            (ascii, wide + 1)
        }
    });
    wide + ascii.div_ceil(2)
}

fn check_id(field: &'static str, id: i64) -> Result<(), ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(field, format!("must be positive, got {id}")));
    }
    Ok(())
}

/// Every id in a batch must be positive; the first bad one is reported.
fn check_ids(field: &'static str, ids: &[i64]) -> Result<(), ApiError> {
    ids.iter().try_for_each(|&id| check_id(field, id))
}

fn check_cursor(field: &'static str, id: i64) -> Result<(), ApiError> {
    if id < 0 {
        return Err(ApiError::validation(field, format!("must not be negative, got {id}")));
    }
    Ok(())
}

fn check_text(field: &'static str, text: &str, max: usize) -> Result<(), ApiError> {
    if text.trim().is_empty() {
        return Err(ApiError::validation(field, "must not be empty"));
    }
    let len = weibo_len(text);
    if len > max {
        return Err(ApiError::validation(
            field,
            format!("is {len} characters long, limit is {max}"),
        ));
    }
    Ok(())
}
