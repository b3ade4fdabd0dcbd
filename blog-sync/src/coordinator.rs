//! Mutate-then-refetch coordinator.
//!
//! Every write validates locally, calls the gateway once, and on success
//! reports which collections it invalidated. The caller re-fetches those
//! with [`MutationCoordinator::refresh`] and installs the result with
//! [`ContentStore::apply`](crate::store::ContentStore::apply). Nothing is
//! applied locally from a mutation's own response.
//!
//! Callers that own their state behind separate cells (the web views) and
//! [`AppController`](crate::controller::AppController) drive the same steps:
//! [`MutationCoordinator::for_writes`], the mutation, [`MutationCoordinator::settle`],
//! then [`Settled::install`].

use std::ops::BitOr;
use std::rc::Rc;

use shared_types::{Comment, CommentId, NewPost, Post, PostId, TagRegistry, UpdatePost};

use crate::config::{ContentLimits, SyncConfig};
use crate::error::SyncError;
use crate::gateway::ContentGateway;
use crate::session::SessionManager;
use crate::store::ContentStore;
use crate::validate;

/// Collections a successful mutation may have changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidation {
    pub posts: bool,
    pub tags: bool,
}

impl Invalidation {
    pub const NONE: Self = Self {
        posts: false,
        tags: false,
    };
    pub const POSTS: Self = Self {
        posts: true,
        tags: false,
    };
    pub const TAGS: Self = Self {
        posts: false,
        tags: true,
    };
    pub const ALL: Self = Self {
        posts: true,
        tags: true,
    };

    pub fn union(self, other: Self) -> Self {
        Self {
            posts: self.posts || other.posts,
            tags: self.tags || other.tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.posts && !self.tags
    }
}

impl BitOr for Invalidation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// A gateway success together with what it invalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutated<T> {
    pub value: T,
    pub invalidated: Invalidation,
}

/// Fresh snapshots of the collections named by an [`Invalidation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Refreshed {
    pub posts: Option<Vec<Post>>,
    pub tags: Option<TagRegistry>,
}

/// A mutation the gateway accepted, together with its follow-up refresh.
#[derive(Debug)]
pub struct Settled<T> {
    pub value: T,
    pub refresh: Result<Refreshed, SyncError>,
}

impl<T> Settled<T> {
    /// Install the refreshed collections into `store`.
    ///
    /// The value comes back whether or not the refresh worked, since the
    /// remote change stands either way. A failed refresh leaves `store` at
    /// its last-good snapshot and its error is returned for reporting.
    pub fn install(self, store: &mut ContentStore) -> (T, Option<SyncError>) {
        let Settled { value, refresh } = self;
        match refresh {
            Ok(refreshed) => {
                store.apply(refreshed);
                (value, None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh after accepted mutation failed");
                (value, Some(e))
            }
        }
    }
}

pub struct MutationCoordinator {
    gateway: Rc<dyn ContentGateway>,
    limits: ContentLimits,
    tag_changes_touch_posts: bool,
}

impl MutationCoordinator {
    pub fn new(gateway: Rc<dyn ContentGateway>, config: &SyncConfig) -> Self {
        Self {
            gateway,
            limits: config.limits,
            tag_changes_touch_posts: config.tag_changes_touch_posts,
        }
    }

    /// Coordinator on the client `session` uses for reads.
    pub fn for_reads(session: &SessionManager, config: &SyncConfig) -> Result<Self, SyncError> {
        Ok(Self::new(session.read_client()?, config))
    }

    /// Coordinator on the client `session` uses for writes. Fails locally
    /// with [`SyncError::Unauthenticated`] when writes need a login.
    pub fn for_writes(session: &SessionManager, config: &SyncConfig) -> Result<Self, SyncError> {
        Ok(Self::new(session.write_client()?, config))
    }

    pub fn limits(&self) -> &ContentLimits {
        &self.limits
    }

    pub async fn load_posts(&self) -> Result<Vec<Post>, SyncError> {
        self.gateway.list_posts().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load posts");
            SyncError::from(e)
        })
    }

    pub async fn load_tags(&self) -> Result<TagRegistry, SyncError> {
        self.gateway.tag_registry().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to load tags");
            SyncError::from(e)
        })
    }

    /// Fetch each invalidated collection exactly once. Fails as a whole if
    /// any fetch fails, so a partial snapshot is never installed.
    pub async fn refresh(&self, invalidated: Invalidation) -> Result<Refreshed, SyncError> {
        let posts = if invalidated.posts {
            Some(self.load_posts().await?)
        } else {
            None
        };
        let tags = if invalidated.tags {
            Some(self.load_tags().await?)
        } else {
            None
        };
        Ok(Refreshed { posts, tags })
    }

    /// Re-fetch what an accepted mutation invalidated.
    pub async fn settle<T>(&self, mutated: Mutated<T>) -> Settled<T> {
        let refresh = self.refresh(mutated.invalidated).await;
        Settled {
            value: mutated.value,
            refresh,
        }
    }

    pub async fn create_post(&self, draft: &NewPost) -> Result<Mutated<Post>, SyncError> {
        validate::new_post(draft, &self.limits)?;
        tracing::debug!(title = %draft.title, tags = draft.tags.len(), "Creating post");
        let post = self.gateway.create_post(draft).await.map_err(rejected)?;
        Ok(self.posts_changed(post))
    }

    pub async fn edit_post(
        &self,
        id: PostId,
        update: &UpdatePost,
    ) -> Result<Mutated<Post>, SyncError> {
        validate::post_update(update, &self.limits)?;
        tracing::debug!(post_id = id, "Editing post");
        let post = self.gateway.edit_post(id, update).await.map_err(rejected)?;
        Ok(self.posts_changed(post))
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        content: &str,
    ) -> Result<Mutated<Comment>, SyncError> {
        validate::comment(content, &self.limits)?;
        tracing::debug!(post_id, "Adding comment");
        let comment = self
            .gateway
            .add_comment(post_id, content)
            .await
            .map_err(rejected)?;
        Ok(self.posts_changed(comment))
    }

    pub async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Mutated<Comment>, SyncError> {
        validate::comment(content, &self.limits)?;
        tracing::debug!(post_id, comment_id, "Editing comment");
        let comment = self
            .gateway
            .edit_comment(post_id, comment_id, content)
            .await
            .map_err(rejected)?;
        Ok(self.posts_changed(comment))
    }

    pub async fn remove_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<Mutated<()>, SyncError> {
        tracing::debug!(post_id, comment_id, "Removing comment");
        self.gateway
            .remove_comment(post_id, comment_id)
            .await
            .map_err(rejected)?;
        Ok(self.posts_changed(()))
    }

    /// Returns the trimmed name that was registered.
    pub async fn add_tag(&self, raw_name: &str) -> Result<Mutated<String>, SyncError> {
        let name = validate::tag_name(raw_name)?;
        tracing::debug!(tag = %name, "Adding tag");
        self.gateway
            .add_tag(&name)
            .await
            .map_err(|e| rejected(e).scoped(&name))?;
        Ok(self.tags_changed(name))
    }

    pub async fn remove_tag(&self, raw_name: &str) -> Result<Mutated<String>, SyncError> {
        let name = validate::tag_name(raw_name)?;
        tracing::debug!(tag = %name, "Removing tag");
        self.gateway
            .remove_tag(&name)
            .await
            .map_err(|e| rejected(e).scoped(&name))?;
        Ok(self.tags_changed(name))
    }

    fn posts_changed<T>(&self, value: T) -> Mutated<T> {
        Mutated {
            value,
            invalidated: Invalidation::POSTS,
        }
    }

    fn tags_changed<T>(&self, value: T) -> Mutated<T> {
        let invalidated = if self.tag_changes_touch_posts {
            Invalidation::TAGS | Invalidation::POSTS
        } else {
            Invalidation::TAGS
        };
        Mutated { value, invalidated }
    }
}

fn rejected(e: crate::gateway::GatewayError) -> SyncError {
    tracing::warn!(error = %e, "Gateway mutation failed");
    SyncError::from(e)
}
