//! C-ABI wrapper around `weibo-core`.
//!
//! # Overview
//! Exposes request building for the Weibo API groups through `extern "C"`
//! functions. The host executes the returned `FfiHttpRequest` with its own
//! HTTP stack and hands the response (or transport failure) back to
//! `weibo_complete`, which folds it into the same envelope every builder
//! uses.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data` carries
//!   built requests, response bodies and errors uniformly.
//! - Null pointers produce a `NullArg` result, never undefined behaviour.
//! - The C caller owns all returned pointers and must call the matching
//!   `weibo_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use weibo_core::{
    normalize, AccessToken, ApiConfig, ApiError, AuthScheme, AuthorFilter, Feature,
    HttpResponse, Invitation, Paging, RepostComment, RequestDescriptor, TransportError, UserRef,
    WeiboClient,
};

use types::*;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

type Built = Result<RequestDescriptor, *mut FfiResult>;

fn invalid(field: &'static str, reason: &str) -> *mut FfiResult {
    FfiResult::from_error(ApiError::Validation {
        field,
        reason: reason.to_string(),
    })
}

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn required_str<'a>(ptr: *const c_char, name: &'static str) -> Result<&'a str, *mut FfiResult> {
    if ptr.is_null() {
        return Err(FfiResult::null_arg(name));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| invalid(name, "is not valid UTF-8"))
}

/// # Safety
/// `ptr` must be null or a valid NUL-terminated string.
unsafe fn optional_str<'a>(
    ptr: *const c_char,
    name: &'static str,
) -> Result<Option<&'a str>, *mut FfiResult> {
    if ptr.is_null() {
        return Ok(None);
    }
    required_str(ptr, name).map(Some)
}

/// # Safety
/// When `len > 0`, `ptr` must point to `len` readable `i64`s.
unsafe fn id_slice<'a>(ptr: *const i64, len: usize, name: &'static str) -> Result<&'a [i64], *mut FfiResult> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(FfiResult::null_arg(name));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

fn author_filter(value: u8) -> Result<AuthorFilter, *mut FfiResult> {
    match value {
        0 => Ok(AuthorFilter::All),
        1 => Ok(AuthorFilter::Followings),
        2 => Ok(AuthorFilter::Strangers),
        _ => Err(invalid("filter_by_author", "must be 0, 1 or 2")),
    }
}

fn feature(value: u8) -> Result<Feature, *mut FfiResult> {
    match value {
        0 => Ok(Feature::All),
        1 => Ok(Feature::Original),
        2 => Ok(Feature::Picture),
        3 => Ok(Feature::Video),
        4 => Ok(Feature::Music),
        _ => Err(invalid("feature", "must be between 0 and 4")),
    }
}

fn repost_comment(value: u8) -> Result<RepostComment, *mut FfiResult> {
    match value {
        0 => Ok(RepostComment::None),
        1 => Ok(RepostComment::OnCurrent),
        2 => Ok(RepostComment::OnOriginal),
        3 => Ok(RepostComment::OnBoth),
        _ => Err(invalid("is_comment", "must be between 0 and 3")),
    }
}

/// `count == 0` and `page == 0` fall back to the API defaults; cursors of
/// `0` leave the bound off.
fn paging(since_id: i64, max_id: i64, count: u32, page: u32) -> Paging {
    let defaults = Paging::default();
    Paging {
        since_id,
        max_id,
        count: if count == 0 { defaults.count } else { count },
        page: if page == 0 { defaults.page } else { page },
    }
}

/// Shared body of every builder: null check, panic guard, envelope.
fn build_request<F>(client: *const FfiWeiboClient, entry: &str, build: F) -> *mut FfiResult
where
    F: FnOnce(&WeiboClient) -> Built,
{
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Ok(request) => FfiResult::ok_request(request.into_http_request()),
            Err(result) => result,
        }
    }))
    .unwrap_or_else(|_| FfiResult::panic(&format!("panic in {entry}")))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a `WeiboClient`.
///
/// `api_host` routes every group to one host (e.g. a local mock); null
/// selects the production hosts. `token` may be null, in which case every
/// builder fails with `MissingCredential`. `expires_at_ms` is the token
/// expiry in Unix milliseconds, `0` for none. `header_auth` sends the token
/// in an `Authorization` header instead of the `access_token` parameter.
///
/// Returns null if `api_host` is not a valid URL, if either string is not
/// UTF-8, or on panic.
/// The caller must free the returned pointer with `weibo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_client_new(
    api_host: *const c_char,
    token: *const c_char,
    expires_at_ms: u64,
    header_auth: bool,
) -> *mut FfiWeiboClient {
    catch_unwind(|| {
        let config = if api_host.is_null() {
            ApiConfig::default()
        } else {
            let Ok(host) = unsafe { CStr::from_ptr(api_host) }.to_str() else {
                return std::ptr::null_mut();
            };
            ApiConfig::for_host(host)
        };
        let auth = if header_auth {
            AuthScheme::Header
        } else {
            AuthScheme::Param
        };
        let token = if token.is_null() {
            None
        } else {
            let Ok(token) = unsafe { CStr::from_ptr(token) }.to_str() else {
                return std::ptr::null_mut();
            };
            Some(AccessToken::from_epoch_millis(token, expires_at_ms))
        };
        match WeiboClient::from_config(config.with_auth(auth), token) {
            Ok(client) => Box::into_raw(Box::new(FfiWeiboClient { inner: client })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `weibo_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_client_free(client: *mut FfiWeiboClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

/// Build `comments/show` for status `id`. `count`/`page` of 0 use defaults;
/// `since_id`/`max_id` of 0 are unbounded.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_show(
    client: *const FfiWeiboClient,
    id: i64,
    since_id: i64,
    max_id: i64,
    count: u32,
    page: u32,
    filter_by_author: u8,
) -> *mut FfiResult {
    build_request(client, "weibo_comments_show", |c| {
        let author = author_filter(filter_by_author)?;
        c.comments()
            .show(id, &paging(since_id, max_id, count, page), author)
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_show_batch(
    client: *const FfiWeiboClient,
    cids: *const i64,
    cids_len: usize,
) -> *mut FfiResult {
    build_request(client, "weibo_comments_show_batch", |c| {
        let cids = unsafe { id_slice(cids, cids_len, "cids") }?;
        c.comments().show_batch(cids).map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_create(
    client: *const FfiWeiboClient,
    comment: *const c_char,
    id: i64,
    comment_ori: bool,
) -> *mut FfiResult {
    build_request(client, "weibo_comments_create", |c| {
        let comment = unsafe { required_str(comment, "comment") }?;
        c.comments()
            .create(comment, id, comment_ori)
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_reply(
    client: *const FfiWeiboClient,
    cid: i64,
    id: i64,
    comment: *const c_char,
    without_mention: bool,
    comment_ori: bool,
) -> *mut FfiResult {
    build_request(client, "weibo_comments_reply", |c| {
        let comment = unsafe { required_str(comment, "comment") }?;
        c.comments()
            .reply(cid, id, comment, without_mention, comment_ori)
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_destroy(client: *const FfiWeiboClient, cid: i64) -> *mut FfiResult {
    build_request(client, "weibo_comments_destroy", |c| {
        c.comments().destroy(cid).map_err(FfiResult::from_error)
    })
}

/// Build `comments/destroy_batch`. At most 20 ids.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_comments_destroy_batch(
    client: *const FfiWeiboClient,
    cids: *const i64,
    cids_len: usize,
) -> *mut FfiResult {
    build_request(client, "weibo_comments_destroy_batch", |c| {
        let cids = unsafe { id_slice(cids, cids_len, "cids") }?;
        c.comments().destroy_batch(cids).map_err(FfiResult::from_error)
    })
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Build `statuses/friends_timeline`. `base_app` limits results to the
/// calling app.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_statuses_friends_timeline(
    client: *const FfiWeiboClient,
    since_id: i64,
    max_id: i64,
    count: u32,
    page: u32,
    base_app: bool,
    feature_filter: u8,
    trim_user: bool,
) -> *mut FfiResult {
    build_request(client, "weibo_statuses_friends_timeline", |c| {
        let feature = feature(feature_filter)?;
        c.statuses()
            .friends_timeline(&paging(since_id, max_id, count, page), base_app, feature, trim_user)
            .map_err(FfiResult::from_error)
    })
}

/// Build `statuses/update`. `lat`/`long` are sent only when `has_location`.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_statuses_update(
    client: *const FfiWeiboClient,
    status: *const c_char,
    has_location: bool,
    lat: f64,
    long: f64,
) -> *mut FfiResult {
    build_request(client, "weibo_statuses_update", |c| {
        let status = unsafe { required_str(status, "status") }?;
        let (lat, long) = if has_location {
            (Some(lat), Some(long))
        } else {
            (None, None)
        };
        c.statuses()
            .update(status, lat, long)
            .map_err(FfiResult::from_error)
    })
}

/// Build `statuses/repost`. `status` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_statuses_repost(
    client: *const FfiWeiboClient,
    id: i64,
    status: *const c_char,
    is_comment: u8,
) -> *mut FfiResult {
    build_request(client, "weibo_statuses_repost", |c| {
        let status = unsafe { optional_str(status, "status") }?;
        let is_comment = repost_comment(is_comment)?;
        c.statuses()
            .repost(id, status, is_comment)
            .map_err(FfiResult::from_error)
    })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn weibo_users_show(client: *const FfiWeiboClient, uid: i64) -> *mut FfiResult {
    build_request(client, "weibo_users_show", |c| {
        c.users()
            .show(&UserRef::Uid(uid))
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_users_show_by_name(
    client: *const FfiWeiboClient,
    screen_name: *const c_char,
) -> *mut FfiResult {
    build_request(client, "weibo_users_show_by_name", |c| {
        let name = unsafe { required_str(screen_name, "screen_name") }?;
        c.users()
            .show(&UserRef::ScreenName(name.to_string()))
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_users_domain_show(
    client: *const FfiWeiboClient,
    domain: *const c_char,
) -> *mut FfiResult {
    build_request(client, "weibo_users_domain_show", |c| {
        let domain = unsafe { required_str(domain, "domain") }?;
        c.users().domain_show(domain).map_err(FfiResult::from_error)
    })
}

/// Build `users/counts`. At most 100 uids.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_users_counts(
    client: *const FfiWeiboClient,
    uids: *const i64,
    uids_len: usize,
) -> *mut FfiResult {
    build_request(client, "weibo_users_counts", |c| {
        let uids = unsafe { id_slice(uids, uids_len, "uids") }?;
        c.users().counts(uids).map_err(FfiResult::from_error)
    })
}

// ---------------------------------------------------------------------------
// Invite and logout
// ---------------------------------------------------------------------------

/// Build `messages/invite`. `url` and `invite_logo` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_invite_send(
    client: *const FfiWeiboClient,
    uid: *const c_char,
    text: *const c_char,
    url: *const c_char,
    invite_logo: *const c_char,
) -> *mut FfiResult {
    build_request(client, "weibo_invite_send", |c| {
        let uid = unsafe { required_str(uid, "uid") }?;
        let mut invitation = Invitation::new(unsafe { required_str(text, "text") }?);
        if let Some(url) = unsafe { optional_str(url, "url") }? {
            invitation = invitation.with_url(url);
        }
        if let Some(logo) = unsafe { optional_str(invite_logo, "invite_logo") }? {
            invitation = invitation.with_logo(logo);
        }
        c.invite()
            .send(uid, &invitation)
            .map_err(FfiResult::from_error)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn weibo_logout_revoke(client: *const FfiWeiboClient) -> *mut FfiResult {
    build_request(client, "weibo_logout_revoke", |c| {
        c.logout().revoke().map_err(FfiResult::from_error)
    })
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Fold a host-executed exchange into an outcome envelope.
///
/// Pass a non-null `transport_error` when the request never produced a
/// response; `status` and `body` are then ignored. Otherwise a 2xx `status`
/// yields `Ok` with the body, anything else `HttpStatus` with the body kept
/// in `data`. A null `body` is read as empty.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_complete(
    status: u16,
    body: *const c_char,
    transport_error: *const c_char,
    timed_out: bool,
) -> *mut FfiResult {
    catch_unwind(|| {
        let read = |ptr: *const c_char| {
            if ptr.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
            }
        };
        let result = if transport_error.is_null() {
            Ok(HttpResponse::new(status, read(body)))
        } else if timed_out {
            Err(TransportError::timeout(read(transport_error)))
        } else {
            Err(TransportError::new(read(transport_error)))
        };
        FfiResult::from_outcome(normalize(result))
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in weibo_complete"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResult` returned by any builder or by `weibo_complete`,
/// including the request or body it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiResult::free(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn weibo_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| unsafe { free_c_string(s) });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
