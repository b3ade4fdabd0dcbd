//! JSON-RPC 2.0 transport.
//!
//! Every call is a `POST {base}/rpc` carrying `{jsonrpc, method, params, id}`.
//! Method names are the store's own (`get_blogs`, `add_blog`, ...). Mutating
//! methods answer with a [`GatewayResult`]; a JSON-RPC `error` object means
//! the call never reached the store's logic and is a transport failure.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_types::{
    BlogConfig, Comment, CommentId, GatewayResult, NewPost, Post, PostId, TagRegistry, UpdatePost,
};

use super::{describe_error_body, ContentGateway, GatewayError};
use crate::identity::Credential;

/// JSON-RPC 2.0 protocol version.
pub const JSON_RPC_VERSION: &str = "2.0";

pub const METHOD_GET_BLOGS: &str = "get_blogs";
pub const METHOD_GET_CONFIG: &str = "get_config";
pub const METHOD_ADD_BLOG: &str = "add_blog";
pub const METHOD_EDIT_BLOG: &str = "edit_blog";
pub const METHOD_ADD_COMMENT: &str = "add_comment";
pub const METHOD_EDIT_COMMENT: &str = "edit_comment";
pub const METHOD_REMOVE_COMMENT: &str = "remove_comment";
pub const METHOD_ADD_TAG: &str = "add_tag_to_config";
pub const METHOD_REMOVE_TAG: &str = "remove_tag_from_config";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

pub struct RpcGateway {
    http: reqwest::Client,
    endpoint: String,
    credential: Option<Credential>,
    next_id: AtomicU64,
}

impl RpcGateway {
    pub fn new(http: reqwest::Client, base_url: impl AsRef<str>, credential: Option<Credential>) -> Self {
        Self {
            http,
            endpoint: format!("{}/rpc", base_url.as_ref().trim_end_matches('/')),
            credential,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, method: &str, params: serde_json::Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let request = self.build_request(method, params);
        tracing::debug!(method, id = request.id, "RPC call");

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(credential) = &self.credential {
            builder = builder.bearer_auth(&credential.token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Transport(format!(
                "HTTP {status}: {}",
                describe_error_body(status, &body)
            )));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to parse RPC response: {e}")))?;

        if let Some(error) = envelope.error {
            return Err(GatewayError::Transport(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        envelope.result.ok_or_else(|| {
            GatewayError::Transport(format!("RPC response to {method} carried no result"))
        })
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, GatewayError> {
        let outcome: GatewayResult<T> = self.call(method, params).await?;
        outcome.into_result().map_err(GatewayError::Rejected)
    }
}

#[async_trait(?Send)]
impl ContentGateway for RpcGateway {
    async fn list_posts(&self) -> Result<Vec<Post>, GatewayError> {
        self.call(METHOD_GET_BLOGS, json!({})).await
    }

    async fn tag_registry(&self) -> Result<TagRegistry, GatewayError> {
        let config: BlogConfig = self.call(METHOD_GET_CONFIG, json!({})).await?;
        Ok(config.tags.into_iter().collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        self.mutate(
            METHOD_ADD_BLOG,
            json!({ "title": post.title, "content": post.content, "tags": post.tags }),
        )
        .await
    }

    async fn edit_post(&self, id: PostId, update: &UpdatePost) -> Result<Post, GatewayError> {
        self.mutate(
            METHOD_EDIT_BLOG,
            json!({
                "blog_id": id,
                "new_title": update.title,
                "new_content": update.content,
                "new_tags": update.tags,
            }),
        )
        .await
    }

    async fn add_comment(&self, post_id: PostId, content: &str) -> Result<Comment, GatewayError> {
        self.mutate(
            METHOD_ADD_COMMENT,
            json!({ "blog_id": post_id, "content": content }),
        )
        .await
    }

    async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        self.mutate(
            METHOD_EDIT_COMMENT,
            json!({ "blog_id": post_id, "comment_id": comment_id, "new_content": content }),
        )
        .await
    }

    async fn remove_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<(), GatewayError> {
        self.mutate(
            METHOD_REMOVE_COMMENT,
            json!({ "blog_id": post_id, "comment_id": comment_id }),
        )
        .await
    }

    async fn add_tag(&self, name: &str) -> Result<(), GatewayError> {
        self.mutate(METHOD_ADD_TAG, json!({ "tag": name })).await
    }

    async fn remove_tag(&self, name: &str) -> Result<(), GatewayError> {
        self.mutate(METHOD_REMOVE_TAG, json!({ "tag": name })).await
    }
}
