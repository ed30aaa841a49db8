//! Logout API: revoke the current access token.

use crate::client::{RequestDescriptor, WeiboClient};
use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::params::ParameterBag;

pub struct LogoutApi<'a> {
    client: &'a WeiboClient,
}

impl<'a> LogoutApi<'a> {
    pub(crate) fn new(client: &'a WeiboClient) -> Self {
        Self { client }
    }

    /// Revoke the client's token. Requests made with it afterwards fail
    /// server-side.
    pub fn revoke(&self) -> Result<RequestDescriptor, ApiError> {
        self.client.build(Operation::OAuthRevoke, ParameterBag::new())
    }
}
