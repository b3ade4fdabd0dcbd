//! Remote content gateway.
//!
//! [`ContentGateway`] is the operation set the remote store exposes. Two
//! transports implement it: [`RestGateway`] (resource URLs under `/api`)
//! and [`RpcGateway`] (JSON-RPC calls named after the store's methods).
//! A gateway instance is bound to at most one identity; a new identity gets
//! a new instance from a [`GatewayFactory`].

pub mod rest;
pub mod rpc;

use std::rc::Rc;

use async_trait::async_trait;
use shared_types::{Comment, CommentId, NewPost, Post, PostId, TagRegistry, UpdatePost};

use crate::config::{SyncConfig, Transport};
use crate::identity::Credential;

pub use rest::RestGateway;
pub use rpc::RpcGateway;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The store answered with `Err(reason)`.
    #[error("{0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Transport(e.to_string())
    }
}

#[async_trait(?Send)]
pub trait ContentGateway {
    async fn list_posts(&self) -> Result<Vec<Post>, GatewayError>;

    async fn tag_registry(&self) -> Result<TagRegistry, GatewayError>;

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError>;

    async fn edit_post(&self, id: PostId, update: &UpdatePost) -> Result<Post, GatewayError>;

    async fn add_comment(&self, post_id: PostId, content: &str) -> Result<Comment, GatewayError>;

    async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, GatewayError>;

    async fn remove_comment(&self, post_id: PostId, comment_id: CommentId)
        -> Result<(), GatewayError>;

    async fn add_tag(&self, name: &str) -> Result<(), GatewayError>;

    async fn remove_tag(&self, name: &str) -> Result<(), GatewayError>;
}

/// Builds a gateway client bound to a credential (or anonymous).
pub trait GatewayFactory {
    fn connect(&self, credential: Option<&Credential>) -> Rc<dyn ContentGateway>;
}

/// Factory for the HTTP transports, chosen by [`SyncConfig::transport`].
#[derive(Debug, Clone)]
pub struct HttpGatewayFactory {
    base_url: String,
    transport: Transport,
    page_size: usize,
    http: reqwest::Client,
}

impl HttpGatewayFactory {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            transport: config.transport,
            page_size: config.page_size.max(1),
            http: reqwest::Client::new(),
        }
    }
}

impl GatewayFactory for HttpGatewayFactory {
    fn connect(&self, credential: Option<&Credential>) -> Rc<dyn ContentGateway> {
        tracing::debug!(
            transport = ?self.transport,
            principal = credential.map(|c| c.principal.as_str()).unwrap_or("anonymous"),
            "Binding gateway client"
        );
        match self.transport {
            Transport::Rest => Rc::new(RestGateway::new(
                self.http.clone(),
                self.base_url.clone(),
                credential.cloned(),
                self.page_size,
            )),
            Transport::Rpc => Rc::new(RpcGateway::new(
                self.http.clone(),
                self.base_url.clone(),
                credential.cloned(),
            )),
        }
    }
}

/// Turn an error response body into a readable reason.
///
/// Prefers the `error` (then `message`) field of a JSON body, falling back
/// to the raw text and finally the status line.
pub(crate) fn describe_error_body(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return format!("HTTP error: {status}");
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
            return error.to_string();
        }
        if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }

    body.trim().to_string()
}
