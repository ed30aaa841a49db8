//! Authenticated request builder.
//!
//! # Design
//! `WeiboClient` holds the shared endpoint table, the auth placement and the
//! caller's token; it carries no mutable state between calls. `build` turns
//! an operation plus its parameters into a `RequestDescriptor`, refusing to
//! do so without a usable token. The descriptor is plain data: hand it to a
//! `Dispatcher`, or turn it into an `HttpRequest` and execute it yourself.

use std::sync::Arc;
use std::time::SystemTime;

use url::form_urlencoded;

use crate::api::{CommentsApi, InviteApi, LogoutApi, StatusesApi, UsersApi};
use crate::auth::AccessToken;
use crate::config::{ApiConfig, AuthScheme};
use crate::endpoint::{Endpoint, EndpointTable, Operation};
use crate::error::{ApiError, ConfigError};
use crate::http::{HttpBody, HttpMethod, HttpRequest, FORM_CONTENT_TYPE};
use crate::params::ParameterBag;

pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Builds authenticated requests for every API group.
#[derive(Debug, Clone)]
pub struct WeiboClient {
    endpoints: Arc<EndpointTable>,
    auth: AuthScheme,
    token: Option<AccessToken>,
}

impl WeiboClient {
    /// Build from a config taken as-is. Hosts are not checked; a config read
    /// from user input should go through [`WeiboClient::from_config`] or
    /// [`ApiConfig::normalized`] first.
    pub fn new(config: &ApiConfig, token: Option<AccessToken>) -> Self {
        Self {
            endpoints: Arc::new(EndpointTable::new(config)),
            auth: config.auth,
            token,
        }
    }

    /// Validate and normalize `config`, then build.
    pub fn from_config(config: ApiConfig, token: Option<AccessToken>) -> Result<Self, ConfigError> {
        Ok(Self::new(&config.normalized()?, token))
    }

    /// Share an already-built table, e.g. one per process for many users.
    pub fn with_endpoints(
        endpoints: Arc<EndpointTable>,
        auth: AuthScheme,
        token: Option<AccessToken>,
    ) -> Self {
        Self {
            endpoints,
            auth,
            token,
        }
    }

    pub fn endpoints(&self) -> &EndpointTable {
        &self.endpoints
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn comments(&self) -> CommentsApi<'_> {
        CommentsApi::new(self)
    }

    pub fn statuses(&self) -> StatusesApi<'_> {
        StatusesApi::new(self)
    }

    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    pub fn invite(&self) -> InviteApi<'_> {
        InviteApi::new(self)
    }

    pub fn logout(&self) -> LogoutApi<'_> {
        LogoutApi::new(self)
    }

    /// Attach the token to `params` for `operation`.
    pub fn build(
        &self,
        operation: Operation,
        params: ParameterBag,
    ) -> Result<RequestDescriptor, ApiError> {
        self.build_at(operation, params, SystemTime::now())
    }

    /// `build`, judging token expiry against `now`.
    pub fn build_at(
        &self,
        operation: Operation,
        params: ParameterBag,
        now: SystemTime,
    ) -> Result<RequestDescriptor, ApiError> {
        let token = match &self.token {
            Some(token) if token.is_valid_at(now) => token.clone(),
            _ => {
                tracing::debug!(%operation, "refusing to build request without a valid token");
                return Err(ApiError::MissingCredential);
            }
        };
        Ok(RequestDescriptor {
            endpoint: self.endpoints.get(operation).clone(),
            params,
            token,
            auth: self.auth,
        })
    }
}

/// A fully built, authenticated request that has not been sent yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    endpoint: Endpoint,
    params: ParameterBag,
    token: AccessToken,
    auth: AuthScheme,
}

impl RequestDescriptor {
    pub fn operation(&self) -> Operation {
        self.endpoint.operation
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn method(&self) -> HttpMethod {
        self.endpoint.method
    }

    pub fn url(&self) -> &str {
        &self.endpoint.url
    }

    pub fn params(&self) -> &ParameterBag {
        &self.params
    }

    /// Wire form: query string for GET, form or multipart body for POST.
    pub fn into_http_request(self) -> HttpRequest {
        let mut fields = self.params.text_pairs();
        let mut headers = Vec::new();
        match self.auth {
            AuthScheme::Param => {
                fields.push((ACCESS_TOKEN_PARAM.to_string(), self.token.secret().to_string()))
            }
            AuthScheme::Header => headers.push((
                "Authorization".to_string(),
                format!("OAuth2 {}", self.token.secret()),
            )),
        }

        match self.endpoint.method {
            HttpMethod::Get => {
                let url = if fields.is_empty() {
                    self.endpoint.url
                } else {
                    format!("{}?{}", self.endpoint.url, encode_form(&fields))
                };
                HttpRequest {
                    method: HttpMethod::Get,
                    url,
                    headers,
                    body: None,
                }
            }
            HttpMethod::Post if self.params.has_blob() => HttpRequest {
                method: HttpMethod::Post,
                url: self.endpoint.url,
                headers,
                body: Some(HttpBody::Multipart {
                    fields,
                    files: self.params.blobs(),
                }),
            },
            HttpMethod::Post => {
                headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
                HttpRequest {
                    method: HttpMethod::Post,
                    url: self.endpoint.url,
                    headers,
                    body: Some(HttpBody::Form(encode_form(&fields))),
                }
            }
        }
    }
}

fn encode_form(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Blob;
    use std::time::{Duration, UNIX_EPOCH};

    fn client() -> WeiboClient {
        WeiboClient::new(&ApiConfig::default(), Some(AccessToken::new("2.00tok")))
    }

    #[test]
    fn from_config_validates_hosts() {
        let config = ApiConfig {
            api_server: "http://localhost:3000/2/".to_string(),
            ..ApiConfig::default()
        };
        let client = WeiboClient::from_config(config, None).unwrap();
        assert_eq!(
            client.endpoints().get(Operation::UsersShow).url,
            "http://localhost:3000/2/users/show.json"
        );

        let bad = ApiConfig {
            oauth_server: "no scheme here".to_string(),
            ..ApiConfig::default()
        };
        let err = WeiboClient::from_config(bad, Some(AccessToken::new("2.00tok"))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { field: "oauth_server", .. }));
    }

    #[test]
    fn build_requires_token() {
        let client = WeiboClient::new(&ApiConfig::default(), None);
        let err = client
            .build(Operation::OAuthRevoke, ParameterBag::new())
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[test]
    fn build_rejects_expired_token() {
        let expiry = UNIX_EPOCH + Duration::from_secs(100);
        let client = WeiboClient::new(
            &ApiConfig::default(),
            Some(AccessToken::with_expiry("2.00tok", expiry)),
        );
        let err = client
            .build_at(
                Operation::UsersShow,
                ParameterBag::new(),
                expiry + Duration::from_secs(1),
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
        assert!(client
            .build_at(Operation::UsersShow, ParameterBag::new(), UNIX_EPOCH)
            .is_ok());
    }

    #[test]
    fn get_puts_params_and_token_in_query() {
        let mut params = ParameterBag::new();
        params.put("screen_name", "新浪 微博");
        let req = client()
            .build(Operation::UsersShow, params)
            .unwrap()
            .into_http_request();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(req
            .url
            .starts_with("https://api.weibo.com/2/users/show.json?screen_name="));
        assert!(req.url.ends_with("&access_token=2.00tok"));
        assert!(!req.url.contains(' '));
    }

    #[test]
    fn post_encodes_form_body() {
        let mut params = ParameterBag::new();
        params.put("status", "hello world").put_flag("trim_user", true);
        let req = client()
            .build(Operation::StatusesUpdate, params)
            .unwrap()
            .into_http_request();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://api.weibo.com/2/statuses/update.json");
        assert_eq!(req.header("content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(
            req.body,
            Some(HttpBody::Form(
                "status=hello+world&trim_user=1&access_token=2.00tok".to_string()
            ))
        );
    }

    #[test]
    fn post_with_blob_is_multipart() {
        let mut params = ParameterBag::new();
        params.put("status", "pic").put(
            "pic",
            Blob {
                filename: "a.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                bytes: vec![0xff, 0xd8],
            },
        );
        let req = client()
            .build(Operation::StatusesUpload, params)
            .unwrap()
            .into_http_request();
        assert_eq!(req.header("content-type"), None);
        match req.body {
            Some(HttpBody::Multipart { fields, files }) => {
                assert_eq!(
                    fields,
                    vec![
                        ("status".to_string(), "pic".to_string()),
                        ("access_token".to_string(), "2.00tok".to_string()),
                    ]
                );
                assert_eq!(files.len(), 1);
                assert_eq!(files[0].0, "pic");
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn header_auth_keeps_token_out_of_params() {
        let config = ApiConfig::default().with_auth(AuthScheme::Header);
        let client = WeiboClient::new(&config, Some(AccessToken::new("2.00tok")));
        let req = client
            .build(Operation::OAuthRevoke, ParameterBag::new())
            .unwrap()
            .into_http_request();
        assert_eq!(req.header("authorization"), Some("OAuth2 2.00tok"));
        assert_eq!(req.body, Some(HttpBody::Form(String::new())));
    }

    #[test]
    fn get_without_params_has_no_query() {
        let config = ApiConfig::default().with_auth(AuthScheme::Header);
        let client = WeiboClient::new(&config, Some(AccessToken::new("2.00tok")));
        let req = client
            .build(Operation::CommentsByMe, ParameterBag::new())
            .unwrap()
            .into_http_request();
        assert_eq!(req.url, "https://api.weibo.com/2/comments/by_me.json");
    }

    #[test]
    fn shared_table_is_not_copied() {
        let table = Arc::new(EndpointTable::default());
        let a = WeiboClient::with_endpoints(table.clone(), AuthScheme::Param, None);
        let b = WeiboClient::with_endpoints(table.clone(), AuthScheme::Param, None);
        assert!(std::ptr::eq(a.endpoints(), b.endpoints()));
    }
}
