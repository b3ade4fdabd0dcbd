//! Shared types between the blog front end and its content gateway
//!
//! These types are used by both:
//! - the synchronization layer (native Rust and WASM)
//! - Dioxus components (WASM)
//!
//! Serializable with serde for JSON over HTTP. Field names follow the
//! remote content store's encoding (`date`, `Ok`/`Err`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Core Types
// ============================================================================

/// Post identifier assigned by the remote store.
pub type PostId = u64;

/// Comment identifier, unique within its post.
pub type CommentId = u64;

/// Opaque caller identity as reported by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct Principal(pub String);

impl Principal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert a nanosecond timestamp from the store into wall-clock time.
pub fn nanos_to_datetime(nanos: u64) -> DateTime<Utc> {
    let secs = (nanos / 1_000_000_000) as i64;
    let subsec = (nanos % 1_000_000_000) as u32;
    DateTime::from_timestamp(secs, subsec).unwrap_or_default()
}

// ============================================================================
// Content
// ============================================================================

/// A single comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct Comment {
    pub id: CommentId,
    pub owner: Principal,
    pub content: String,
    /// Creation (or last edit) time, nanoseconds since the Unix epoch
    #[serde(rename = "date")]
    pub created_ns: u64,
}

impl Comment {
    pub fn created_at(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.created_ns)
    }
}

/// A blog post with its comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct Post {
    pub id: PostId,
    pub owner: Principal,
    pub title: String,
    #[serde(rename = "date")]
    pub created_ns: u64,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn created_at(&self) -> DateTime<Utc> {
        nanos_to_datetime(self.created_ns)
    }

    pub fn comment(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

// ============================================================================
// Tag Registry
// ============================================================================

/// Global set of selectable tag names. Case-sensitive, no duplicates,
/// insertion order preserved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagRegistry {
    tags: Vec<String>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }
}

impl FromIterator<String> for TagRegistry {
    /// Later duplicates are dropped; the first occurrence keeps its position.
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for tag in iter {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Self { tags }
    }
}

impl From<Vec<String>> for TagRegistry {
    fn from(tags: Vec<String>) -> Self {
        tags.into_iter().collect()
    }
}

impl From<TagRegistry> for Vec<String> {
    fn from(registry: TagRegistry) -> Self {
        registry.tags
    }
}

/// Store-side configuration snapshot returned by the RPC `get_config` call.
/// Its `tags` field is the tag registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct BlogConfig {
    pub max_tags_count: u8,
    pub max_content_len: u16,
    pub max_title_len: u8,
    pub tags: Vec<String>,
}

// ============================================================================
// Gateway Results
// ============================================================================

/// Outcome of a mutating gateway call, encoded as `{"Ok": ..}` or `{"Err": ".."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum GatewayResult<T> {
    Ok(T),
    Err(String),
}

impl<T> GatewayResult<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            GatewayResult::Ok(value) => Ok(value),
            GatewayResult::Err(reason) => Err(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, GatewayResult::Ok(_))
    }
}

impl<T> From<Result<T, String>> for GatewayResult<T> {
    fn from(result: Result<T, String>) -> Self {
        match result {
            Ok(value) => GatewayResult::Ok(value),
            Err(reason) => GatewayResult::Err(reason),
        }
    }
}

/// Error body returned by the REST variant on 4xx/5xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct ApiError {
    pub error: String,
}

// ============================================================================
// Request Payloads
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Partial post update. `None` leaves the field untouched; `Some(vec![])`
/// clears all tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl UpdatePost {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct NewComment {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct UpdateComment {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../../blog-ui/src/types/generated.ts")]
pub struct NewTag {
    pub name: String,
}

// ============================================================================
// Tests
// ============================================================================
