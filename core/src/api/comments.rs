//! Comments API: reading comment timelines, posting, replying, deleting.

use crate::api::{check_id, check_ids, check_text, Paging, MAX_STATUS_LEN};
use crate::client::{RequestDescriptor, WeiboClient};
use crate::endpoint::Operation;
use crate::error::ApiError;
use crate::params::{batch_ids, ParameterBag};

/// Most comment ids `show_batch` accepts.
pub const SHOW_BATCH_MAX: usize = 50;

/// Most comment ids `destroy_batch` accepts.
pub const DESTROY_BATCH_MAX: usize = 20;

/// Whose comments to return (`filter_by_author`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthorFilter {
    #[default]
    All = 0,
    Followings = 1,
    Strangers = 2,
}

/// Where comments were posted (`filter_by_source`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum SourceFilter {
    #[default]
    All = 0,
    Weibo = 1,
    WeiboGroup = 2,
}

pub struct CommentsApi<'a> {
    client: &'a WeiboClient,
}

impl<'a> CommentsApi<'a> {
    pub(crate) fn new(client: &'a WeiboClient) -> Self {
        Self { client }
    }

    /// Comments on the status `id`.
    pub fn show(
        &self,
        id: i64,
        paging: &Paging,
        author: AuthorFilter,
    ) -> Result<RequestDescriptor, ApiError> {
        check_id("id", id)?;
        let mut params = paging.to_params()?;
        params
            .put("id", id)
            .put("filter_by_author", author as u8);
        self.client.build(Operation::CommentsShow, params)
    }

    /// Comments written by the current user.
    pub fn by_me(
        &self,
        paging: &Paging,
        source: SourceFilter,
    ) -> Result<RequestDescriptor, ApiError> {
        let mut params = paging.to_params()?;
        params.put("filter_by_source", source as u8);
        self.client.build(Operation::CommentsByMe, params)
    }

    /// Comments received by the current user.
    pub fn to_me(
        &self,
        paging: &Paging,
        author: AuthorFilter,
        source: SourceFilter,
    ) -> Result<RequestDescriptor, ApiError> {
        let params = filtered_params(paging, author, source)?;
        self.client.build(Operation::CommentsToMe, params)
    }

    /// Comments written and received by the current user.
    pub fn timeline(&self, paging: &Paging, trim_user: bool) -> Result<RequestDescriptor, ApiError> {
        let mut params = paging.to_params()?;
        params.put_flag("trim_user", trim_user);
        self.client.build(Operation::CommentsTimeline, params)
    }

    /// Comments that @-mention the current user.
    pub fn mentions(
        &self,
        paging: &Paging,
        author: AuthorFilter,
        source: SourceFilter,
    ) -> Result<RequestDescriptor, ApiError> {
        let params = filtered_params(paging, author, source)?;
        self.client.build(Operation::CommentsMentions, params)
    }

    pub fn show_batch(&self, cids: &[i64]) -> Result<RequestDescriptor, ApiError> {
        let params = cids_params(cids, SHOW_BATCH_MAX)?;
        self.client.build(Operation::CommentsShowBatch, params)
    }

    /// Comment on status `id`. With `comment_ori`, a repost's original
    /// status is commented too.
    pub fn create(
        &self,
        comment: &str,
        id: i64,
        comment_ori: bool,
    ) -> Result<RequestDescriptor, ApiError> {
        check_text("comment", comment, MAX_STATUS_LEN)?;
        check_id("id", id)?;
        let mut params = ParameterBag::new();
        params
            .put("comment", comment)
            .put("id", id)
            .put_flag("comment_ori", comment_ori);
        self.client.build(Operation::CommentsCreate, params)
    }

    pub fn destroy(&self, cid: i64) -> Result<RequestDescriptor, ApiError> {
        check_id("cid", cid)?;
        let mut params = ParameterBag::new();
        params.put("cid", cid);
        self.client.build(Operation::CommentsDestroy, params)
    }

    pub fn destroy_batch(&self, cids: &[i64]) -> Result<RequestDescriptor, ApiError> {
        let params = cids_params(cids, DESTROY_BATCH_MAX)?;
        self.client.build(Operation::CommentsDestroyBatch, params)
    }

    /// Reply to comment `cid` on status `id`. Unless `without_mention` is
    /// set, the server prefixes the reply with `回复@author:`.
    pub fn reply(
        &self,
        cid: i64,
        id: i64,
        comment: &str,
        without_mention: bool,
        comment_ori: bool,
    ) -> Result<RequestDescriptor, ApiError> {
        check_id("cid", cid)?;
        check_id("id", id)?;
        check_text("comment", comment, MAX_STATUS_LEN)?;
        let mut params = ParameterBag::new();
        params
            .put("cid", cid)
            .put("id", id)
            .put("comment", comment)
            .put_flag("without_mention", without_mention)
            .put_flag("comment_ori", comment_ori);
        self.client.build(Operation::CommentsReply, params)
    }
}

fn filtered_params(
    paging: &Paging,
    author: AuthorFilter,
    source: SourceFilter,
) -> Result<ParameterBag, ApiError> {
    let mut params = paging.to_params()?;
    params
        .put("filter_by_author", author as u8)
        .put("filter_by_source", source as u8);
    Ok(params)
}

fn cids_params(cids: &[i64], max: usize) -> Result<ParameterBag, ApiError> {
    let joined = batch_ids(cids, max)?;
    check_ids("cids", cids)?;
    let mut params = ParameterBag::new();
    params.put("cids", joined);
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use crate::config::ApiConfig;
    use crate::http::{HttpBody, HttpMethod};

    fn client() -> WeiboClient {
        WeiboClient::new(&ApiConfig::default(), Some(AccessToken::new("2.00tok")))
    }

    #[test]
    fn show_builds_expected_params() {
        let req = client()
            .comments()
            .show(42, &Paging::default(), AuthorFilter::All)
            .unwrap();
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.url(), "https://api.weibo.com/2/comments/show.json");
        let p = req.params();
        assert_eq!(p.text("id").as_deref(), Some("42"));
        assert_eq!(p.text("since_id").as_deref(), Some("0"));
        assert_eq!(p.text("max_id").as_deref(), Some("0"));
        assert_eq!(p.text("count").as_deref(), Some("50"));
        assert_eq!(p.text("page").as_deref(), Some("1"));
        assert_eq!(p.text("filter_by_author").as_deref(), Some("0"));
        assert_eq!(p.len(), 6);
    }

    #[test]
    fn destroy_batch_joins_ids() {
        let req = client().comments().destroy_batch(&[12, 34, 56]).unwrap();
        assert_eq!(req.method(), HttpMethod::Post);
        assert_eq!(req.operation(), Operation::CommentsDestroyBatch);
        assert_eq!(req.params().text("cids").as_deref(), Some("12,34,56"));
        let http = req.into_http_request();
        assert_eq!(
            http.body,
            Some(HttpBody::Form(
                "cids=12%2C34%2C56&access_token=2.00tok".to_string()
            ))
        );
    }

    #[test]
    fn destroy_batch_rejects_empty_and_oversized() {
        let api_client = client();
        let api = api_client.comments();
        assert!(matches!(api.destroy_batch(&[]), Err(ApiError::EmptyBatch)));
        let ids: Vec<i64> = (1..=21).collect();
        assert!(matches!(
            api.destroy_batch(&ids),
            Err(ApiError::BatchSizeExceeded { max: 20, actual: 21 })
        ));
    }

    #[test]
    fn batch_ids_must_be_positive() {
        let api_client = client();
        let api = api_client.comments();
        for bad in [&[0_i64][..], &[12, -5, 7][..]] {
            assert!(matches!(
                api.show_batch(bad),
                Err(ApiError::Validation { field: "cids", .. })
            ));
            assert!(matches!(
                api.destroy_batch(bad),
                Err(ApiError::Validation { field: "cids", .. })
            ));
        }
    }

    #[test]
    fn show_batch_allows_fifty() {
        let ids: Vec<i64> = (1..=50).collect();
        let req = client().comments().show_batch(&ids).unwrap();
        assert_eq!(req.method(), HttpMethod::Get);
        let ids: Vec<i64> = (1..=51).collect();
        assert!(client().comments().show_batch(&ids).is_err());
    }

    #[test]
    fn to_me_and_mentions_carry_both_filters() {
        let api_client = client();
        let api = api_client.comments();
        for req in [
            api.to_me(&Paging::default(), AuthorFilter::Strangers, SourceFilter::WeiboGroup)
                .unwrap(),
            api.mentions(&Paging::default(), AuthorFilter::Strangers, SourceFilter::WeiboGroup)
                .unwrap(),
        ] {
            assert_eq!(req.params().text("filter_by_author").as_deref(), Some("2"));
            assert_eq!(req.params().text("filter_by_source").as_deref(), Some("2"));
        }
    }

    #[test]
    fn by_me_has_source_filter_only() {
        let req = client()
            .comments()
            .by_me(&Paging::page(3), SourceFilter::Weibo)
            .unwrap();
        assert_eq!(req.params().text("filter_by_source").as_deref(), Some("1"));
        assert!(!req.params().contains("filter_by_author"));
        assert_eq!(req.params().text("page").as_deref(), Some("3"));
    }

    #[test]
    fn timeline_encodes_trim_user() {
        let req = client()
            .comments()
            .timeline(&Paging::default(), true)
            .unwrap();
        assert_eq!(req.params().text("trim_user").as_deref(), Some("1"));
    }

    #[test]
    fn create_validates_comment() {
        let api_client = client();
        let api = api_client.comments();
        assert!(matches!(
            api.create("", 1, false),
            Err(ApiError::Validation { field: "comment", .. })
        ));
        assert!(matches!(
            api.create("hi", 0, false),
            Err(ApiError::Validation { field: "id", .. })
        ));
        let req = api.create("nice", 7, true).unwrap();
        assert_eq!(req.params().text("comment_ori").as_deref(), Some("1"));
    }

    #[test]
    fn reply_sets_every_field() {
        let req = client()
            .comments()
            .reply(5, 7, "thanks", true, false)
            .unwrap();
        let p = req.params();
        assert_eq!(
            p.keys().collect::<Vec<_>>(),
            vec!["cid", "id", "comment", "without_mention", "comment_ori"]
        );
        assert_eq!(p.text("without_mention").as_deref(), Some("1"));
        assert_eq!(p.text("comment_ori").as_deref(), Some("0"));
    }

    #[test]
    fn destroy_requires_positive_cid() {
        assert!(client().comments().destroy(-3).is_err());
        let req = client().comments().destroy(3).unwrap();
        assert_eq!(req.url(), "https://api.weibo.com/2/comments/destroy.json");
    }

    #[test]
    fn validation_precedes_credential_check() {
        let anonymous = WeiboClient::new(&ApiConfig::default(), None);
        assert!(matches!(
            anonymous.comments().destroy_batch(&[]),
            Err(ApiError::EmptyBatch)
        ));
        assert!(matches!(
            anonymous.comments().destroy_batch(&[1]),
            Err(ApiError::MissingCredential)
        ));
    }
}
