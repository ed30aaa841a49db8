//! Users API: profile lookup and follower counts.

use crate::api::{check_id, check_ids};
use crate::client::{RequestDescriptor, WeiboClient};
use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::params::{batch_ids, ParameterBag};

/// Most uids `counts` accepts.
pub const COUNTS_MAX: usize = 100;

/// How to identify a user for `show`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Uid(i64),
    ScreenName(String),
}

pub struct UsersApi<'a> {
    client: &'a WeiboClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a WeiboClient) -> Self {
        Self { client }
    }

    pub fn show(&self, user: &UserRef) -> Result<RequestDescriptor, ApiError> {
        let mut params = ParameterBag::new();
        match user {
            UserRef::Uid(uid) => {
                check_id("uid", *uid)?;
                params.put("uid", *uid);
            }
            UserRef::ScreenName(name) => {
                if name.trim().is_empty() {
                    return Err(ApiError::validation("screen_name", "must not be empty"));
                }
                params.put("screen_name", name.as_str());
            }
        }
        self.client.build(Operation::UsersShow, params)
    }

    /// Look a user up by personal domain, the `xxx` in `weibo.com/xxx`.
    pub fn domain_show(&self, domain: &str) -> Result<RequestDescriptor, ApiError> {
        if domain.trim().is_empty() {
            return Err(ApiError::validation("domain", "must not be empty"));
        }
        if domain.contains('/') {
            return Err(ApiError::validation(
                "domain",
                "pass the domain name only, not a URL",
            ));
        }
        let mut params = ParameterBag::new();
        params.put("domain", domain);
        self.client.build(Operation::UsersDomainShow, params)
    }

    /// Follower, following and status counts for up to 100 users.
    pub fn counts(&self, uids: &[i64]) -> Result<RequestDescriptor, ApiError> {
        let joined = batch_ids(uids, COUNTS_MAX)?;
        check_ids("uids", uids)?;
        let mut params = ParameterBag::new();
        params.put("uids", joined);
        self.client.build(Operation::UsersCounts, params)
    }
}
