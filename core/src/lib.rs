//! Client binding for the Weibo open API.
//!
//! # Overview
//! Typed API-group methods (comments, statuses, users, invite, logout) build
//! authenticated `RequestDescriptor`s; a `Dispatcher` sends them through a
//! caller-supplied `HttpExecutor`, blocking or callback-driven, and folds
//! every result into one `Outcome`.
//!
//! # Design
//! - `WeiboClient` is stateless apart from the shared, immutable
//!   `EndpointTable` and the caller's `AccessToken`.
//! - Validation and credential checks run before a request exists, so they
//!   fail the same way in both dispatch modes and never reach the network.
//! - The core performs no I/O. The caller owns transport and parses the
//!   response bodies it gets back.
//!
//! ```no_run
//! use weibo_core::{AccessToken, ApiConfig, AuthorFilter, Paging, WeiboClient};
//!
//! let client = WeiboClient::new(&ApiConfig::default(), Some(AccessToken::new("2.00...")));
//! let request = client
//!     .comments()
//!     .show(42, &Paging::default(), AuthorFilter::All)
//!     .expect("valid arguments");
//! let http = request.into_http_request();
//! assert!(http.url.starts_with("https://api.weibo.com/2/comments/show.json?"));
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod params;

pub use api::{
    AuthorFilter, Feature, Invitation, Paging, RepostComment, SourceFilter, TypeFilter, UserRef,
};
pub use auth::AccessToken;
pub use client::{RequestDescriptor, WeiboClient};
pub use config::{ApiConfig, AuthScheme};
pub use dispatch::{normalize, Dispatcher, Outcome};
pub use endpoint::{ApiGroup, Endpoint, EndpointTable, Operation};
pub use error::{ApiError, ConfigError, ErrorKind, TransportError};
pub use http::{Completion, HttpBody, HttpExecutor, HttpMethod, HttpRequest, HttpResponse};
pub use params::{batch_ids, encode_bool, join_ids, Blob, ParamValue, ParameterBag};
