//! REST transport.
//!
//! Routes:
//! - `GET    /api/posts?offset=&limit=`
//! - `POST   /api/posts`
//! - `PUT    /api/posts/{id}`
//! - `POST   /api/posts/{id}/comments`
//! - `PUT    /api/posts/{id}/comments/{comment_id}`
//! - `DELETE /api/posts/{id}/comments/{comment_id}`
//! - `GET    /api/tags`, `POST /api/tags`, `DELETE /api/tags/{name}`
//!
//! 4xx responses are store rejections (`{"error": ".."}`), everything else
//! that is not 2xx is a transport failure.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use shared_types::{
    Comment, CommentId, NewComment, NewPost, NewTag, Post, PostId, TagRegistry, UpdateComment,
    UpdatePost,
};

use super::{describe_error_body, ContentGateway, GatewayError};
use crate::identity::Credential;

pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    credential: Option<Credential>,
    page_size: usize,
}

impl RestGateway {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        credential: Option<Credential>,
        page_size: usize,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            credential,
            page_size: page_size.max(1),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            GatewayError::Transport(format!("invalid base url {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport(format!("invalid base url {}", self.base_url)))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credential {
            Some(credential) => request.bearer_auth(&credential.token),
            None => request,
        }
    }

    async fn check(&self, request: RequestBuilder) -> Result<reqwest::Response, GatewayError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = describe_error_body(status, &body);
        if status.is_client_error() {
            Err(GatewayError::Rejected(reason))
        } else {
            Err(GatewayError::Transport(format!("HTTP {status}: {reason}")))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        self.check(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Transport(format!("Failed to parse JSON: {e}")))
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        self.check(request).await.map(|_| ())
    }
}

#[async_trait(?Send)]
impl ContentGateway for RestGateway {
    async fn list_posts(&self) -> Result<Vec<Post>, GatewayError> {
        let mut posts: Vec<Post> = Vec::new();
        let mut seen = HashSet::new();
        let mut offset = 0usize;

        loop {
            let mut url = self.url(&["posts"])?;
            url.query_pairs_mut()
                .append_pair("offset", &offset.to_string())
                .append_pair("limit", &self.page_size.to_string());

            let page: Vec<Post> = self.send_json(self.http.get(url)).await?;
            let fetched = page.len();
            let mut fresh = 0usize;
            for post in page {
                if seen.insert(post.id) {
                    posts.push(post);
                    fresh += 1;
                }
            }

            // A short page ends the listing; so does a server that ignores
            // `offset` and keeps returning the same posts.
            if fetched < self.page_size || fresh == 0 {
                break;
            }
            offset += fetched;
        }

        tracing::debug!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }

    async fn tag_registry(&self) -> Result<TagRegistry, GatewayError> {
        let url = self.url(&["tags"])?;
        let tags: Vec<String> = self.send_json(self.http.get(url)).await?;
        Ok(tags.into_iter().collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        let url = self.url(&["posts"])?;
        self.send_json(self.http.post(url).json(post)).await
    }

    async fn edit_post(&self, id: PostId, update: &UpdatePost) -> Result<Post, GatewayError> {
        let url = self.url(&["posts", &id.to_string()])?;
        self.send_json(self.http.put(url).json(update)).await
    }

    async fn add_comment(&self, post_id: PostId, content: &str) -> Result<Comment, GatewayError> {
        let url = self.url(&["posts", &post_id.to_string(), "comments"])?;
        let body = NewComment {
            content: content.to_string(),
        };
        self.send_json(self.http.post(url).json(&body)).await
    }

    async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let url = self.url(&[
            "posts",
            &post_id.to_string(),
            "comments",
            &comment_id.to_string(),
        ])?;
        let body = UpdateComment {
            content: content.to_string(),
        };
        self.send_json(self.http.put(url).json(&body)).await
    }

    async fn remove_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<(), GatewayError> {
        let url = self.url(&[
            "posts",
            &post_id.to_string(),
            "comments",
            &comment_id.to_string(),
        ])?;
        self.send_unit(self.http.delete(url)).await
    }

    async fn add_tag(&self, name: &str) -> Result<(), GatewayError> {
        let url = self.url(&["tags"])?;
        let body = NewTag {
            name: name.to_string(),
        };
        self.send_unit(self.http.post(url).json(&body)).await
    }

    async fn remove_tag(&self, name: &str) -> Result<(), GatewayError> {
        let url = self.url(&["tags", name])?;
        self.send_unit(self.http.delete(url)).await
    }
}
