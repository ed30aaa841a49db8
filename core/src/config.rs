//! Runtime configuration: which hosts the API groups talk to and how the
//! token is attached.
//!
//! # Design
//! Every field has a default, so an empty JSON object (or no file at all)
//! yields the production Weibo hosts. `for_host` routes every group to one
//! base URL, which is how tests point the client at the mock server.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_API_SERVER: &str = "https://api.weibo.com/2";
pub const DEFAULT_INVITE_SERVER: &str = "https://m.api.weibo.com/2";
pub const DEFAULT_OAUTH_SERVER: &str = "https://api.weibo.com/oauth2";

/// Where the access token goes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `access_token` request parameter.
    #[default]
    Param,
    /// `Authorization: OAuth2 <token>` header.
    Header,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_server")]
    pub api_server: String,

    /// Host of the invite endpoint, which lives on the mobile API domain.
    #[serde(default = "default_invite_server")]
    pub invite_server: String,

    #[serde(default = "default_oauth_server")]
    pub oauth_server: String,

    #[serde(default)]
    pub auth: AuthScheme,
}

fn default_api_server() -> String {
    DEFAULT_API_SERVER.to_string()
}

fn default_invite_server() -> String {
    DEFAULT_INVITE_SERVER.to_string()
}

fn default_oauth_server() -> String {
    DEFAULT_OAUTH_SERVER.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_server: default_api_server(),
            invite_server: default_invite_server(),
            oauth_server: default_oauth_server(),
            auth: AuthScheme::default(),
        }
    }
}

impl ApiConfig {
    /// Route every API group to `base`, using Weibo's path layout
    /// (`{base}/2/...` and `{base}/oauth2/...`).
    pub fn for_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_server: format!("{base}/2"),
            invite_server: format!("{base}/2"),
            oauth_server: format!("{base}/oauth2"),
            auth: AuthScheme::default(),
        }
    }

    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ApiConfig = serde_json::from_str(raw)?;
        config.normalized()
    }

    /// Load from a JSON file, falling back to defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Validate every host and strip trailing slashes.
    pub fn normalized(self) -> Result<Self, ConfigError> {
        Ok(Self {
            api_server: check_url("api_server", &self.api_server)?,
            invite_server: check_url("invite_server", &self.invite_server)?,
            oauth_server: check_url("oauth_server", &self.oauth_server)?,
            auth: self.auth,
        })
    }
}

fn check_url(field: &'static str, raw: &str) -> Result<String, ConfigError> {
    url::Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { field, source })?;
    Ok(raw.trim_end_matches('/').to_string())
}
