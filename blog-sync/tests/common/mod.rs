//! In-memory gateway and identity provider for integration tests.
//!
//! [`FakeBackend`] plays the remote store: every client it hands out shares
//! one state, counts calls per operation, and can be told to fail the next
//! call of a given operation.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

use async_trait::async_trait;
use blog_sync::{
    AppController, ContentGateway, Credential, GatewayError, GatewayFactory, IdentityError,
    IdentityProvider, SyncConfig,
};
use shared_types::{Comment, CommentId, NewPost, Post, PostId, Principal, TagRegistry, UpdatePost};

pub const LIST_POSTS: &str = "list_posts";
pub const TAG_REGISTRY: &str = "tag_registry";
pub const CREATE_POST: &str = "create_post";
pub const EDIT_POST: &str = "edit_post";
pub const ADD_COMMENT: &str = "add_comment";
pub const EDIT_COMMENT: &str = "edit_comment";
pub const REMOVE_COMMENT: &str = "remove_comment";
pub const ADD_TAG: &str = "add_tag";
pub const REMOVE_TAG: &str = "remove_tag";

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "blog_sync=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Default)]
struct BackendState {
    posts: Vec<Post>,
    tags: Vec<String>,
    next_post_id: PostId,
    next_comment_id: CommentId,
    clock_ns: u64,
    calls: HashMap<&'static str, usize>,
    failures: HashMap<&'static str, GatewayError>,
    connections: Vec<Option<String>>,
}

impl BackendState {
    fn tick(&mut self) -> u64 {
        self.clock_ns += 1_000_000_000;
        self.clock_ns
    }

    fn post_mut(&mut self, id: PostId) -> Result<&mut Post, GatewayError> {
        self.posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GatewayError::Rejected("Blog not found".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<RefCell<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(self, tags: &[&str]) -> Self {
        self.state.borrow_mut().tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Insert a post directly, bypassing call counters.
    pub fn seed_post(&self, owner: &str, title: &str, content: &str, tags: &[&str]) -> PostId {
        let mut state = self.state.borrow_mut();
        state.next_post_id += 1;
        let id = state.next_post_id;
        let date = state.tick();
        state.posts.push(Post {
            id,
            owner: Principal::new(owner),
            title: title.to_string(),
            created_ns: date,
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            comments: Vec::new(),
        });
        id
    }

    pub fn seed_comment(&self, post_id: PostId, owner: &str, content: &str) -> CommentId {
        let mut state = self.state.borrow_mut();
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let date = state.tick();
        if let Some(post) = state.posts.iter_mut().find(|p| p.id == post_id) {
            post.comments.push(Comment {
                id,
                owner: Principal::new(owner),
                content: content.to_string(),
                created_ns: date,
            });
        }
        id
    }

    /// Make the next call of `op` fail with `error`.
    pub fn fail_next(&self, op: &'static str, error: GatewayError) {
        self.state.borrow_mut().failures.insert(op, error);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.borrow().calls.get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.borrow().calls.values().sum()
    }

    pub fn reset_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Principals clients were built for, in order (`None` = anonymous).
    pub fn connections(&self) -> Vec<Option<String>> {
        self.state.borrow().connections.clone()
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.borrow().posts.clone()
    }

    pub fn tags(&self) -> Vec<String> {
        self.state.borrow().tags.clone()
    }
}

impl GatewayFactory for FakeBackend {
    fn connect(&self, credential: Option<&Credential>) -> Rc<dyn ContentGateway> {
        self.state
            .borrow_mut()
            .connections
            .push(credential.map(|c| c.principal.to_string()));
        Rc::new(FakeGateway {
            state: Rc::clone(&self.state),
            caller: credential.map(|c| c.principal.clone()),
        })
    }
}

pub struct FakeGateway {
    state: Rc<RefCell<BackendState>>,
    caller: Option<Principal>,
}

impl FakeGateway {
    fn enter(&self, op: &'static str) -> Result<std::cell::RefMut<'_, BackendState>, GatewayError> {
        let mut state = self.state.borrow_mut();
        *state.calls.entry(op).or_insert(0) += 1;
        let failure = state.failures.remove(op);
        match failure {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }

    fn caller(&self) -> Result<Principal, GatewayError> {
        self.caller
            .clone()
            .ok_or_else(|| GatewayError::Rejected("Anonymous caller".to_string()))
    }
}

#[async_trait(?Send)]
impl ContentGateway for FakeGateway {
    async fn list_posts(&self) -> Result<Vec<Post>, GatewayError> {
        let state = self.enter(LIST_POSTS)?;
        Ok(state.posts.clone())
    }

    async fn tag_registry(&self) -> Result<TagRegistry, GatewayError> {
        let state = self.enter(TAG_REGISTRY)?;
        Ok(state.tags.iter().cloned().collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, GatewayError> {
        let mut state = self.enter(CREATE_POST)?;
        let owner = self.caller()?;
        state.next_post_id += 1;
        let created = Post {
            id: state.next_post_id,
            owner,
            title: post.title.clone(),
            created_ns: state.tick(),
            content: post.content.clone(),
            tags: post.tags.clone(),
            comments: Vec::new(),
        };
        state.posts.push(created.clone());
        Ok(created)
    }

    async fn edit_post(&self, id: PostId, update: &UpdatePost) -> Result<Post, GatewayError> {
        let mut state = self.enter(EDIT_POST)?;
        let caller = self.caller()?;
        let post = state.post_mut(id)?;
        if post.owner != caller {
            return Err(GatewayError::Rejected("Only the owner can edit".to_string()));
        }
        if let Some(title) = &update.title {
            post.title = title.clone();
        }
        if let Some(content) = &update.content {
            post.content = content.clone();
        }
        if let Some(tags) = &update.tags {
            post.tags = tags.clone();
        }
        Ok(post.clone())
    }

    async fn add_comment(&self, post_id: PostId, content: &str) -> Result<Comment, GatewayError> {
        let mut state = self.enter(ADD_COMMENT)?;
        let owner = self.caller()?;
        state.next_comment_id += 1;
        let comment = Comment {
            id: state.next_comment_id,
            owner,
            content: content.to_string(),
            created_ns: state.tick(),
        };
        state.post_mut(post_id)?.comments.push(comment.clone());
        Ok(comment)
    }

    async fn edit_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
        content: &str,
    ) -> Result<Comment, GatewayError> {
        let mut state = self.enter(EDIT_COMMENT)?;
        let caller = self.caller()?;
        let now = state.tick();
        let comment = state
            .post_mut(post_id)?
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| GatewayError::Rejected("Comment not found".to_string()))?;
        if comment.owner != caller {
            return Err(GatewayError::Rejected("Only the owner can edit".to_string()));
        }
        comment.content = content.to_string();
        comment.created_ns = now;
        Ok(comment.clone())
    }

    async fn remove_comment(&self, post_id: PostId, comment_id: CommentId) -> Result<(), GatewayError> {
        let mut state = self.enter(REMOVE_COMMENT)?;
        self.caller()?;
        let post = state.post_mut(post_id)?;
        let before = post.comments.len();
        post.comments.retain(|c| c.id != comment_id);
        if post.comments.len() == before {
            return Err(GatewayError::Rejected("Comment not found".to_string()));
        }
        Ok(())
    }

    async fn add_tag(&self, name: &str) -> Result<(), GatewayError> {
        let mut state = self.enter(ADD_TAG)?;
        self.caller()?;
        if state.tags.iter().any(|t| t == name) {
            return Err(GatewayError::Rejected("duplicate".to_string()));
        }
        state.tags.push(name.to_string());
        Ok(())
    }

    async fn remove_tag(&self, name: &str) -> Result<(), GatewayError> {
        let mut state = self.enter(REMOVE_TAG)?;
        self.caller()?;
        let before = state.tags.len();
        state.tags.retain(|t| t != name);
        if state.tags.len() == before {
            return Err(GatewayError::Rejected("not found".to_string()));
        }
        for post in state.posts.iter_mut() {
            post.tags.retain(|t| t != name);
        }
        Ok(())
    }
}

/// Identity provider with a scripted login outcome.
pub struct FakeIdentity {
    session: RefCell<Option<Credential>>,
    next_login: RefCell<Result<Credential, IdentityError>>,
    pub logins: Cell<u32>,
    pub logouts: Cell<u32>,
}

impl FakeIdentity {
    pub fn logged_out() -> Self {
        Self {
            session: RefCell::new(None),
            next_login: RefCell::new(Ok(alice())),
            logins: Cell::new(0),
            logouts: Cell::new(0),
        }
    }

    pub fn logged_in(credential: Credential) -> Self {
        let identity = Self::logged_out();
        *identity.session.borrow_mut() = Some(credential);
        identity
    }

    pub fn script_login(&self, result: Result<Credential, IdentityError>) {
        *self.next_login.borrow_mut() = result;
    }

    pub fn has_session(&self) -> bool {
        self.session.borrow().is_some()
    }
}

#[async_trait(?Send)]
impl IdentityProvider for FakeIdentity {
    async fn existing(&self) -> Result<Option<Credential>, IdentityError> {
        Ok(self.session.borrow().clone())
    }

    async fn login(&self) -> Result<Credential, IdentityError> {
        self.logins.set(self.logins.get() + 1);
        let result = self.next_login.borrow().clone();
        if let Ok(credential) = &result {
            *self.session.borrow_mut() = Some(credential.clone());
        }
        result
    }

    async fn logout(&self) -> Result<(), IdentityError> {
        self.logouts.set(self.logouts.get() + 1);
        *self.session.borrow_mut() = None;
        Ok(())
    }
}

pub fn alice() -> Credential {
    Credential::new("alice", "token-alice")
}

pub fn bob() -> Credential {
    Credential::new("bob", "token-bob")
}

pub struct Harness {
    pub backend: FakeBackend,
    pub identity: Rc<FakeIdentity>,
    pub app: AppController,
}

pub fn harness(backend: FakeBackend, identity: FakeIdentity, config: SyncConfig) -> Harness {
    init_tracing();
    let identity = Rc::new(identity);
    let app = AppController::new(config, Rc::new(backend.clone()), identity.clone());
    Harness {
        backend,
        identity,
        app,
    }
}

/// Controller already logged in as alice with the store loaded.
pub async fn logged_in_harness(backend: FakeBackend) -> Harness {
    let mut h = harness(backend, FakeIdentity::logged_in(alice()), SyncConfig::default());
    h.app.initialize().await.expect("initialize");
    h.backend.reset_calls();
    h
}
