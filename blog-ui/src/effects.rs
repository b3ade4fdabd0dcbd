//! Async actions behind the views.
//!
//! Each action takes the `Copy` context, grabs what it needs from the signals
//! up front and releases the borrow before awaiting, so a re-render can
//! always read the state while a request is in flight. The mutation steps
//! are the ones `AppController` runs: `MutationCoordinator::for_writes`, the
//! gateway call, `MutationCoordinator::settle`, `Settled::install`, and
//! `NoticeBoard::report` for failures.

use blog_sync::notice::{POST_ADDED, TAG_ADDED};
use blog_sync::{IdentityProvider, Invalidation, Mutated, MutationCoordinator, SyncError};
use chrono::Utc;
use dioxus::prelude::{spawn, ReadableExt, WritableExt};
use dioxus_logger::tracing;
use gloo_timers::future::TimeoutFuture;
use shared_types::{Comment, CommentId, NewPost, Post, PostId, UpdatePost};

use crate::state::BlogContext;

/// Probe for an existing session once, then load what the caller may read.
pub async fn initialize_session(mut ctx: BlogContext) {
    let probe = ctx.session.write().begin_initialize();
    if let Some(probe) = probe {
        let identity = ctx.identity.read().clone();
        let result = identity.existing().await;
        ctx.session.write().finish_initialize(probe, result);
    }
    reload(ctx).await;
}

pub async fn login(mut ctx: BlogContext) {
    let attempt = ctx.session.write().begin_login();
    let Some(attempt) = attempt else {
        return;
    };
    let identity = ctx.identity.read().clone();
    let result = identity.login().await;
    let finished = ctx.session.write().finish_login(attempt, result);
    match finished {
        Ok(()) => reload(ctx).await,
        Err(e) => {
            report(ctx, e);
        }
    }
}

/// Never fails. Content the anonymous caller may not read is dropped
/// before anything is awaited.
pub async fn logout(mut ctx: BlogContext) {
    ctx.session.write().end_session();
    {
        let session = ctx.session.read();
        ctx.store.write().drop_if_unreadable(&session);
    }
    let identity = ctx.identity.read().clone();
    if let Err(e) = identity.logout().await {
        tracing::warn!("Identity provider logout failed: {}", e);
    }
    reload(ctx).await;
}

/// Re-fetch posts and tags if the caller may read.
pub async fn reload(mut ctx: BlogContext) {
    if !ctx.session.read().can_read() {
        tracing::debug!("Skipping reload, reads require a session");
        return;
    }
    let coordinator = MutationCoordinator::for_reads(&ctx.session.read(), &ctx.config.read());
    let coordinator = match coordinator {
        Ok(coordinator) => coordinator,
        Err(e) => {
            report(ctx, e);
            return;
        }
    };
    match coordinator.refresh(Invalidation::ALL).await {
        Ok(refreshed) => ctx.store.write().apply(refreshed),
        Err(e) => {
            report(ctx, e);
        }
    }
}

pub async fn create_post(ctx: BlogContext, draft: NewPost) -> Result<Post, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.create_post(&draft).await;
    settle(ctx, &coordinator, outcome, Some(POST_ADDED)).await
}

pub async fn edit_post(ctx: BlogContext, id: PostId, update: UpdatePost) -> Result<Post, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.edit_post(id, &update).await;
    settle(ctx, &coordinator, outcome, None).await
}

pub async fn add_comment(ctx: BlogContext, post_id: PostId, content: String) -> Result<Comment, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.add_comment(post_id, &content).await;
    settle(ctx, &coordinator, outcome, None).await
}

pub async fn edit_comment(
    ctx: BlogContext,
    post_id: PostId,
    comment_id: CommentId,
    content: String,
) -> Result<Comment, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.edit_comment(post_id, comment_id, &content).await;
    settle(ctx, &coordinator, outcome, None).await
}

pub async fn remove_comment(
    ctx: BlogContext,
    post_id: PostId,
    comment_id: CommentId,
) -> Result<(), SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.remove_comment(post_id, comment_id).await;
    settle(ctx, &coordinator, outcome, None).await
}

pub async fn add_tag(ctx: BlogContext, name: String) -> Result<String, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.add_tag(&name).await;
    settle(ctx, &coordinator, outcome, Some(TAG_ADDED)).await
}

pub async fn remove_tag(ctx: BlogContext, name: String) -> Result<String, SyncError> {
    let coordinator = writer(ctx)?;
    let outcome = coordinator.remove_tag(&name).await;
    settle(ctx, &coordinator, outcome, None).await
}

fn writer(ctx: BlogContext) -> Result<MutationCoordinator, SyncError> {
    let coordinator = MutationCoordinator::for_writes(&ctx.session.read(), &ctx.config.read());
    coordinator.map_err(|e| report(ctx, e))
}

/// Refresh what a successful mutation invalidated.
///
/// `Ok` means the gateway accepted the mutation, so the caller clears its
/// inputs. A failed refresh after that is raised as a notice and leaves the
/// store at its previous snapshot.
async fn settle<T>(
    mut ctx: BlogContext,
    coordinator: &MutationCoordinator,
    outcome: Result<Mutated<T>, SyncError>,
    success: Option<&str>,
) -> Result<T, SyncError> {
    let mutated = outcome.map_err(|e| report(ctx, e))?;
    if let Some(message) = success {
        inform(ctx, message);
    }
    let settled = coordinator.settle(mutated).await;
    let (value, stale) = settled.install(&mut ctx.store.write());
    if let Some(e) = stale {
        report(ctx, e);
    }
    Ok(value)
}

pub fn report(mut ctx: BlogContext, error: SyncError) -> SyncError {
    let error = ctx.notices.write().report(error);
    spawn(expire_notice_later(ctx));
    error
}

fn inform(mut ctx: BlogContext, message: &str) {
    ctx.notices.write().raise_info(message);
    spawn(expire_notice_later(ctx));
}

/// Wait out the notice TTL, then drop the notice if nothing newer replaced it.
async fn expire_notice_later(mut ctx: BlogContext) {
    let ttl_ms = ctx.notices.read().ttl().num_milliseconds().max(0) as u32;
    TimeoutFuture::new(ttl_ms).await;
    ctx.notices.write().expire(Utc::now());
}
