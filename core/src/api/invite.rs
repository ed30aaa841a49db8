//! Invite API: send an app invitation to a user by private message.

use serde::{Deserialize, Serialize};

use crate::api::weibo_len;
use crate::client::{RequestDescriptor, WeiboClient};
use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::params::ParameterBag;

/// Longest invitation text, in Weibo characters.
pub const MAX_INVITE_TEXT: usize = 300;

/// Invitation payload, sent JSON-encoded in the `data` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub text: String,
    /// Where the invitation link leads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_logo: Option<String>,
}

impl Invitation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: None,
            invite_logo: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.invite_logo = Some(logo.into());
        self
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.text.trim().is_empty() {
            return Err(ApiError::validation("text", "must not be empty"));
        }
        let len = weibo_len(&self.text);
        if len > MAX_INVITE_TEXT {
            return Err(ApiError::validation(
                "text",
                format!("is {len} characters long, limit is {MAX_INVITE_TEXT}"),
            ));
        }
        Ok(())
    }
}

pub struct InviteApi<'a> {
    client: &'a WeiboClient,
}

impl<'a> InviteApi<'a> {
    pub(crate) fn new(client: &'a WeiboClient) -> Self {
        Self { client }
    }

    pub fn send(&self, uid: &str, invitation: &Invitation) -> Result<RequestDescriptor, ApiError> {
        if uid.trim().is_empty() {
            return Err(ApiError::validation("uid", "must not be empty"));
        }
        invitation.validate()?;
        let mut params = ParameterBag::new();
        params
            .put("uid", uid)
            .put("data", serde_json::to_string(invitation)?);
        self.client.build(Operation::InviteSend, params)
    }
}
