//! Application controller.
//!
//! [`AppController`] owns all client state in one [`AppState`] and drives
//! every user action through validate, gateway call, refresh, then either
//! clearing the inputs involved or raising an error notice. The steps
//! themselves live on [`MutationCoordinator`] and [`Settled`], shared with
//! the web views.

use std::collections::HashMap;
use std::rc::Rc;

use shared_types::{Comment, CommentId, Post, PostId};

use crate::comment_edit::{CommentEdit, CommentEditTracker};
use crate::config::SyncConfig;
use crate::coordinator::{Invalidation, Mutated, MutationCoordinator, Settled};
use crate::error::SyncError;
use crate::forms::PostForm;
use crate::gateway::GatewayFactory;
use crate::identity::IdentityProvider;
use crate::notice::{NoticeBoard, POST_ADDED, TAG_ADDED};
use crate::session::SessionManager;
use crate::store::ContentStore;

pub const POST_NOT_FOUND: &str = "Post not found";
pub const COMMENT_NOT_FOUND: &str = "Comment not found";

pub struct AppState {
    pub session: SessionManager,
    pub store: ContentStore,
    pub notices: NoticeBoard,
    /// The "new post" editor.
    pub post_form: PostForm,
    /// Open edit forms, keyed by post.
    pub post_edits: HashMap<PostId, PostForm>,
    /// Unsent new-comment text, keyed by post.
    pub comment_drafts: HashMap<PostId, String>,
    pub comment_edits: HashMap<PostId, CommentEditTracker>,
    pub tag_input: String,
}

pub struct AppController {
    config: SyncConfig,
    identity: Rc<dyn IdentityProvider>,
    state: AppState,
}

impl AppController {
    pub fn new(
        config: SyncConfig,
        factory: Rc<dyn GatewayFactory>,
        identity: Rc<dyn IdentityProvider>,
    ) -> Self {
        let state = AppState {
            session: SessionManager::new(factory, config.access),
            store: ContentStore::new(),
            notices: NoticeBoard::new(config.notice_ttl()),
            post_form: PostForm::for_new(),
            post_edits: HashMap::new(),
            comment_drafts: HashMap::new(),
            comment_edits: HashMap::new(),
            tag_input: String::new(),
        };
        Self {
            config,
            identity,
            state,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    // ── Session ──────────────────────────────────────────────────────────────

    /// Probe for an existing session, then load whatever the caller may read.
    pub async fn initialize(&mut self) -> Result<(), SyncError> {
        let identity = Rc::clone(&self.identity);
        self.state.session.initialize(identity.as_ref()).await;
        self.reload().await
    }

    pub async fn login(&mut self) -> Result<(), SyncError> {
        let identity = Rc::clone(&self.identity);
        if let Err(e) = self.state.session.login(identity.as_ref()).await {
            return Err(self.report(e));
        }
        self.reload().await
    }

    /// Never fails. Drops cached content the anonymous caller may not read,
    /// discards every unsent input, then reloads what is still readable.
    pub async fn logout(&mut self) {
        let identity = Rc::clone(&self.identity);
        self.state.session.logout(identity.as_ref()).await;
        self.state.store.drop_if_unreadable(&self.state.session);
        self.state.post_form.clear();
        self.state.post_edits.clear();
        self.state.comment_drafts.clear();
        self.state.comment_edits.clear();
        self.state.tag_input.clear();
        if let Err(e) = self.reload().await {
            tracing::debug!(error = %e, "Reload after logout failed");
        }
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    pub async fn load_posts(&mut self) -> Result<(), SyncError> {
        self.refresh_with_reader(Invalidation::POSTS).await
    }

    pub async fn load_tags(&mut self) -> Result<(), SyncError> {
        self.refresh_with_reader(Invalidation::TAGS).await
    }

    /// Re-fetch both collections. Skipped silently when reads need a session
    /// and there is none.
    pub async fn reload(&mut self) -> Result<(), SyncError> {
        if !self.state.session.can_read() {
            tracing::debug!("Skipping reload, reads require a session");
            return Ok(());
        }
        self.refresh_with_reader(Invalidation::ALL).await
    }

    async fn refresh_with_reader(&mut self, invalidated: Invalidation) -> Result<(), SyncError> {
        let coordinator = match MutationCoordinator::for_reads(&self.state.session, &self.config)
        {
            Ok(coordinator) => coordinator,
            Err(e) => return Err(self.report(e)),
        };
        match coordinator.refresh(invalidated).await {
            Ok(refreshed) => {
                self.state.store.apply(refreshed);
                Ok(())
            }
            Err(e) => Err(self.report(e)),
        }
    }

    // ── Posts ────────────────────────────────────────────────────────────────

    pub fn toggle_new_post_tag(&mut self, tag: &str) -> bool {
        self.state.post_form.toggle_tag(tag)
    }

    pub async fn submit_new_post(&mut self) -> Result<Post, SyncError> {
        let coordinator = self.writer()?;
        let draft = self.state.post_form.draft();
        let mutated = match coordinator.create_post(&draft).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        self.state.post_form.clear();
        self.state.notices.raise_info(POST_ADDED);
        self.settle(&coordinator, mutated).await
    }

    /// Open an edit form seeded from the cached post. Re-opening keeps
    /// whatever was already typed.
    pub fn begin_post_edit(&mut self, post_id: PostId) -> Result<&mut PostForm, SyncError> {
        let post = self
            .state
            .store
            .post(post_id)
            .ok_or_else(|| SyncError::validation(POST_NOT_FOUND))?;
        let form = PostForm::for_edit(post);
        Ok(self.state.post_edits.entry(post_id).or_insert(form))
    }

    pub fn toggle_post_edit_tag(&mut self, post_id: PostId, tag: &str) -> Option<bool> {
        self.state
            .post_edits
            .get_mut(&post_id)
            .map(|form| form.toggle_tag(tag))
    }

    pub fn cancel_post_edit(&mut self, post_id: PostId) {
        self.state.post_edits.remove(&post_id);
    }

    pub async fn submit_post_edit(&mut self, post_id: PostId) -> Result<Post, SyncError> {
        let coordinator = self.writer()?;
        let update = match (
            self.state.store.post(post_id),
            self.state.post_edits.get(&post_id),
        ) {
            (Some(original), Some(form)) => Some(form.edit_for(original)),
            _ => None,
        };
        let Some(update) = update else {
            return Err(self.report(SyncError::validation(POST_NOT_FOUND)));
        };
        let mutated = match coordinator.edit_post(post_id, &update).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        self.state.post_edits.remove(&post_id);
        self.settle(&coordinator, mutated).await
    }

    // ── Comments ─────────────────────────────────────────────────────────────

    pub fn set_comment_draft(&mut self, post_id: PostId, text: impl Into<String>) {
        self.state.comment_drafts.insert(post_id, text.into());
    }

    pub async fn submit_comment(&mut self, post_id: PostId) -> Result<Comment, SyncError> {
        let coordinator = self.writer()?;
        let content = self
            .state
            .comment_drafts
            .get(&post_id)
            .cloned()
            .unwrap_or_default();
        let mutated = match coordinator.add_comment(post_id, &content).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        self.state.comment_drafts.remove(&post_id);
        self.settle(&coordinator, mutated).await
    }

    /// Start editing a cached comment. Returns the edit it displaced, if any.
    pub fn start_comment_edit(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<Option<CommentEdit>, SyncError> {
        let comment = self
            .state
            .store
            .post(post_id)
            .and_then(|post| post.comment(comment_id))
            .ok_or_else(|| SyncError::validation(COMMENT_NOT_FOUND))?;
        Ok(self
            .state
            .comment_edits
            .entry(post_id)
            .or_default()
            .start_edit(comment))
    }

    pub fn set_comment_buffer(
        &mut self,
        post_id: PostId,
        text: impl Into<String>,
    ) -> Result<(), SyncError> {
        self.state
            .comment_edits
            .get_mut(&post_id)
            .ok_or(SyncError::NoEditInProgress)?
            .set_buffer(text)
    }

    pub fn cancel_comment_edit(&mut self, post_id: PostId) -> Option<CommentEdit> {
        self.state
            .comment_edits
            .get_mut(&post_id)
            .and_then(CommentEditTracker::cancel)
    }

    /// Save the buffer of the comment being edited. The edit stays open on
    /// any failure so it can be retried.
    pub async fn save_comment_edit(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<Comment, SyncError> {
        let coordinator = self.writer()?;
        let pending = self
            .state
            .comment_edits
            .get(&post_id)
            .ok_or(SyncError::NoEditInProgress)
            .and_then(|tracker| tracker.pending_save(comment_id))
            .map(str::to_string);
        let buffer = match pending {
            Ok(buffer) => buffer,
            Err(e) => return Err(self.report(e)),
        };
        let mutated = match coordinator.edit_comment(post_id, comment_id, &buffer).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        if let Some(tracker) = self.state.comment_edits.get_mut(&post_id) {
            tracker.finish(comment_id);
        }
        self.settle(&coordinator, mutated).await
    }

    pub async fn remove_comment(
        &mut self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<(), SyncError> {
        let coordinator = self.writer()?;
        let mutated = match coordinator.remove_comment(post_id, comment_id).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        if let Some(tracker) = self.state.comment_edits.get_mut(&post_id) {
            tracker.finish(comment_id);
        }
        self.settle(&coordinator, mutated).await
    }

    // ── Tags ─────────────────────────────────────────────────────────────────

    pub fn set_tag_input(&mut self, text: impl Into<String>) {
        self.state.tag_input = text.into();
    }

    pub async fn submit_tag(&mut self) -> Result<String, SyncError> {
        let coordinator = self.writer()?;
        let raw = self.state.tag_input.clone();
        let mutated = match coordinator.add_tag(&raw).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        self.state.tag_input.clear();
        self.state.notices.raise_info(TAG_ADDED);
        self.settle(&coordinator, mutated).await
    }

    pub async fn remove_tag(&mut self, name: &str) -> Result<String, SyncError> {
        let coordinator = self.writer()?;
        let mutated = match coordinator.remove_tag(name).await {
            Ok(mutated) => mutated,
            Err(e) => return Err(self.report(e)),
        };
        self.settle(&coordinator, mutated).await
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    fn writer(&mut self) -> Result<MutationCoordinator, SyncError> {
        MutationCoordinator::for_writes(&self.state.session, &self.config)
            .map_err(|e| self.report(e))
    }

    /// Refresh what an accepted mutation invalidated and hand back its value.
    /// A failed refresh is reported but does not fail the operation.
    async fn settle<T>(
        &mut self,
        coordinator: &MutationCoordinator,
        mutated: Mutated<T>,
    ) -> Result<T, SyncError> {
        let settled: Settled<T> = coordinator.settle(mutated).await;
        let (value, stale) = settled.install(&mut self.state.store);
        if let Some(e) = stale {
            self.report(e);
        }
        Ok(value)
    }

    fn report(&mut self, error: SyncError) -> SyncError {
        self.state.notices.report(error)
    }
}
