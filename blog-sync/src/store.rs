//! Client-side cache of posts and the tag registry.

use shared_types::{Post, PostId, TagRegistry};

use crate::coordinator::Refreshed;
use crate::session::SessionManager;

/// The snapshot views render from. Collections are only ever replaced
/// wholesale with what the gateway last returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentStore {
    posts: Vec<Post>,
    tags: TagRegistry,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_posts(&mut self, posts: Vec<Post>) {
        self.posts = posts;
    }

    pub fn replace_tags(&mut self, tags: TagRegistry) {
        self.tags = tags;
    }

    /// Install the collections a refresh fetched; the others stay as they are.
    pub fn apply(&mut self, refreshed: Refreshed) {
        let Refreshed { posts, tags } = refreshed;
        if let Some(posts) = posts {
            tracing::debug!(count = posts.len(), "Replacing cached posts");
            self.replace_posts(posts);
        }
        if let Some(tags) = tags {
            tracing::debug!(count = tags.len(), "Replacing cached tags");
            self.replace_tags(tags);
        }
    }

    /// Empty the store if `session` may not read. Content gated behind a
    /// login must not outlive it. Returns whether anything was dropped.
    pub fn drop_if_unreadable(&mut self, session: &SessionManager) -> bool {
        if session.can_read() {
            return false;
        }
        let had_content = !self.posts.is_empty() || !self.tags.is_empty();
        if had_content {
            tracing::debug!("Dropping cached content, reads require a session");
        }
        *self = Self::new();
        had_content
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    pub fn posts_tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Post> + 'a {
        self.posts.iter().filter(move |post| post.has_tag(tag))
    }
}
