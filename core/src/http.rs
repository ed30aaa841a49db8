//! HTTP transport types and the executor contract.
//!
//! # Design
//! Requests and responses are plain data. The core never opens a socket: an
//! `HttpExecutor` supplied by the caller performs the round trip, either
//! handing the result to a completion closure or returning it from a
//! blocking call. Hosts that do their own I/O (the C ABI) skip the executor
//! and feed responses straight into `dispatch::normalize`.
//!
//! Multipart bodies are described, not encoded: boundary generation and
//! image encoding belong to the transport.

use crate::error::TransportError;
use crate::params::Blob;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    /// `application/x-www-form-urlencoded` text.
    Form(String),
    /// `multipart/form-data` parts; the executor picks the boundary.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<(String, Blob)>,
    },
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL, including the query string for GET requests.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Completion closure handed to `HttpExecutor::execute`.
pub type Completion = Box<dyn FnOnce(Result<HttpResponse, TransportError>) + Send + 'static>;

/// Performs HTTP round trips on behalf of the client.
///
/// Implementations own threading and timeouts.
pub trait HttpExecutor: Send + Sync {
    /// Start the request and return without waiting. `on_complete` must be
    /// called exactly once, from whatever thread the executor chooses.
    fn execute(&self, request: HttpRequest, on_complete: Completion);

    /// Perform the request on the calling thread.
    fn execute_blocking(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<E: HttpExecutor + ?Sized> HttpExecutor for std::sync::Arc<E> {
    fn execute(&self, request: HttpRequest, on_complete: Completion) {
        (**self).execute(request, on_complete)
    }

    fn execute_blocking(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute_blocking(request)
    }
}
