//! Endpoint table: every operation the client knows, with its URL and verb.
//!
//! # Design
//! `Operation` is a closed enum, so asking for an endpoint that does not
//! exist is a compile error rather than a runtime lookup miss. The table is
//! built once from an `ApiConfig` and shared behind an `Arc`; nothing
//! mutates it afterwards.

use std::fmt;

use crate::config::ApiConfig;
use crate::http::HttpMethod;

/// The API group an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiGroup {
    Comments,
    Statuses,
    Users,
    Invite,
    OAuth,
}

/// One logical API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CommentsToMe,
    CommentsByMe,
    CommentsShow,
    CommentsTimeline,
    CommentsMentions,
    CommentsShowBatch,
    CommentsCreate,
    CommentsDestroy,
    CommentsDestroyBatch,
    CommentsReply,
    StatusesFriendsTimeline,
    StatusesMentions,
    StatusesUpdate,
    StatusesRepost,
    StatusesUpload,
    StatusesUploadUrlText,
    UsersShow,
    UsersDomainShow,
    UsersCounts,
    InviteSend,
    OAuthRevoke,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 21] = [
        Operation::CommentsToMe,
        Operation::CommentsByMe,
        Operation::CommentsShow,
        Operation::CommentsTimeline,
        Operation::CommentsMentions,
        Operation::CommentsShowBatch,
        Operation::CommentsCreate,
        Operation::CommentsDestroy,
        Operation::CommentsDestroyBatch,
        Operation::CommentsReply,
        Operation::StatusesFriendsTimeline,
        Operation::StatusesMentions,
        Operation::StatusesUpdate,
        Operation::StatusesRepost,
        Operation::StatusesUpload,
        Operation::StatusesUploadUrlText,
        Operation::UsersShow,
        Operation::UsersDomainShow,
        Operation::UsersCounts,
        Operation::InviteSend,
        Operation::OAuthRevoke,
    ];

    pub fn group(self) -> ApiGroup {
        use Operation::*;
        match self {
            CommentsToMe | CommentsByMe | CommentsShow | CommentsTimeline | CommentsMentions
            | CommentsShowBatch | CommentsCreate | CommentsDestroy | CommentsDestroyBatch
            | CommentsReply => ApiGroup::Comments,
            StatusesFriendsTimeline | StatusesMentions | StatusesUpdate | StatusesRepost
            | StatusesUpload | StatusesUploadUrlText => ApiGroup::Statuses,
            UsersShow | UsersDomainShow | UsersCounts => ApiGroup::Users,
            InviteSend => ApiGroup::Invite,
            OAuthRevoke => ApiGroup::OAuth,
        }
    }

    /// Path relative to the group's host.
    fn path(self) -> &'static str {
        use Operation::*;
        match self {
            CommentsToMe => "/comments/to_me.json",
            CommentsByMe => "/comments/by_me.json",
            CommentsShow => "/comments/show.json",
            CommentsTimeline => "/comments/timeline.json",
            CommentsMentions => "/comments/mentions.json",
            CommentsShowBatch => "/comments/show_batch.json",
            CommentsCreate => "/comments/create.json",
            CommentsDestroy => "/comments/destroy.json",
            CommentsDestroyBatch => "/comments/sdestroy_batch.json",
            CommentsReply => "/comments/reply.json",
            StatusesFriendsTimeline => "/statuses/friends_timeline.json",
            StatusesMentions => "/statuses/mentions.json",
            StatusesUpdate => "/statuses/update.json",
            StatusesRepost => "/statuses/repost.json",
            StatusesUpload => "/statuses/upload.json",
            StatusesUploadUrlText => "/statuses/upload_url_text.json",
            UsersShow => "/users/show.json",
            UsersDomainShow => "/users/domain_show.json",
            UsersCounts => "/users/counts.json",
            InviteSend => "/messages/invite.json",
            OAuthRevoke => "/revokeoauth2",
        }
    }

    /// Reads are GET, writes are POST.
    pub fn method(self) -> HttpMethod {
        use Operation::*;
        match self {
            CommentsToMe | CommentsByMe | CommentsShow | CommentsTimeline | CommentsMentions
            | CommentsShowBatch | StatusesFriendsTimeline | StatusesMentions | UsersShow
            | UsersDomainShow | UsersCounts => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A resolved endpoint: operation, absolute URL and verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub operation: Operation,
    pub url: String,
    pub method: HttpMethod,
}

/// Immutable operation → endpoint mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTable {
    entries: Vec<Endpoint>,
}

impl EndpointTable {
    pub fn new(config: &ApiConfig) -> Self {
        let entries = Operation::ALL
            .iter()
            .map(|&operation| {
                let host = match operation.group() {
                    ApiGroup::Comments | ApiGroup::Statuses | ApiGroup::Users => {
                        &config.api_server
                    }
                    ApiGroup::Invite => &config.invite_server,
                    ApiGroup::OAuth => &config.oauth_server,
                };
                Endpoint {
                    operation,
                    url: format!("{}{}", host.trim_end_matches('/'), operation.path()),
                    method: operation.method(),
                }
            })
            .collect();
        Self { entries }
    }

    /// Endpoint for `operation`.
    ///
    /// # Panics
    /// Only if the table was not built from `Operation::ALL`, which `new`
    /// guarantees.
    pub fn get(&self, operation: Operation) -> &Endpoint {
        let entry = &self.entries[operation as usize];
        debug_assert_eq!(entry.operation, operation);
        entry
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.entries.iter()
    }
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::new(&ApiConfig::default())
    }
}
