//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Every builder and `weibo_complete`
//! return the same `FfiResult` envelope, so C callers handle one shape.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use weibo_core::{ApiError, ErrorKind, HttpBody, HttpMethod, HttpRequest, Outcome, WeiboClient};

/// Opaque handle to a `WeiboClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiWeiboClient {
    pub(crate) inner: WeiboClient,
}

/// Copy `s` into a C string owned by the caller. Interior NULs are dropped.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An authenticated HTTP request described as C-compatible plain data.
///
/// `url` already carries the query string for GET requests. `body` is the
/// form-encoded POST body, or null for GET.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Heap-allocate the C form of `req`. Multipart bodies have no C form.
    pub(crate) fn from_core(req: HttpRequest) -> Result<*mut Self, String> {
        let body = match req.body {
            None => std::ptr::null_mut(),
            Some(HttpBody::Form(form)) => c_string(form),
            Some(HttpBody::Multipart { .. }) => {
                return Err("multipart requests are not available over the C ABI".to_string())
            }
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Ok(Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body,
        })))
    }

    /// Release a request allocated by `from_core`.
    ///
    /// # Safety
    /// `req` must come from `from_core` and not have been freed yet.
    pub(crate) unsafe fn free(req: *mut Self) {
        let req = Box::from_raw(req);
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ));
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

/// # Safety
/// `s` must be null or come from `c_string`.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ---------------------------------------------------------------------------
// Result envelope
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Validation = 1,
    MissingCredential = 2,
    Network = 3,
    HttpStatus = 4,
    EmptyBatch = 5,
    BatchSizeExceeded = 6,
    Serialization = 7,
    Unsupported = 8,
    Panic = 9,
    NullArg = 10,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Validation => FfiErrorCode::Validation,
            ErrorKind::MissingCredential => FfiErrorCode::MissingCredential,
            ErrorKind::Network => FfiErrorCode::Network,
            ErrorKind::HttpStatus => FfiErrorCode::HttpStatus,
            ErrorKind::EmptyBatch => FfiErrorCode::EmptyBatch,
            ErrorKind::BatchSizeExceeded => FfiErrorCode::BatchSizeExceeded,
            ErrorKind::Serialization => FfiErrorCode::Serialization,
        }
    }
}

/// Tag that tells `weibo_free_result` what `FfiResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is an `FfiHttpRequest*`.
    Request = 1,
    /// `data` is a NUL-terminated response body.
    Body = 2,
}

/// Result envelope for every builder and for `weibo_complete`.
///
/// On success `error_code` is `Ok` and `data` holds the request or body.
/// On failure `error_message` is set; for `HttpStatus` failures the server's
/// body is still handed over in `data` with tag `Body`.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub timed_out: bool,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiResult {
    fn boxed(self) -> *mut Self {
        Box::into_raw(Box::new(self))
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> Self {
        FfiResult {
            error_code,
            error_message: c_string(msg),
            http_status: 0,
            timed_out: false,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }
    }

    pub(crate) fn ok_request(req: HttpRequest) -> *mut Self {
        match FfiHttpRequest::from_core(req) {
            Ok(ffi_req) => FfiResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                http_status: 0,
                timed_out: false,
                data_tag: FfiDataTag::Request,
                data: ffi_req as *mut c_void,
            }
            .boxed(),
            Err(msg) => Self::failure(FfiErrorCode::Unsupported, &msg).boxed(),
        }
    }

    pub(crate) fn from_outcome(outcome: Outcome) -> *mut Self {
        match outcome {
            Ok(body) => FfiResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                http_status: 0,
                timed_out: false,
                data_tag: FfiDataTag::Body,
                data: c_string(body) as *mut c_void,
            }
            .boxed(),
            Err(err) => Self::from_error(err),
        }
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let mut result = Self::failure(err.kind().into(), &err.to_string());
        match err {
            ApiError::HttpStatus { status, body } => {
                result.http_status = status;
                result.data_tag = FfiDataTag::Body;
                result.data = c_string(body) as *mut c_void;
            }
            ApiError::Network(transport) => result.timed_out = transport.is_timeout(),
            _ => {}
        }
        result.boxed()
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}")).boxed()
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg).boxed()
    }

    /// Release a result and whatever `data` points to.
    ///
    /// # Safety
    /// `result` must come from one of the constructors above and not have
    /// been freed yet.
    pub(crate) unsafe fn free(result: *mut Self) {
        let result = Box::from_raw(result);
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Request => FfiHttpRequest::free(result.data as *mut FfiHttpRequest),
            FfiDataTag::Body => free_c_string(result.data as *mut c_char),
            FfiDataTag::None => {}
        }
    }
}
