use blog_sync::CommentEditTracker;
use dioxus::prelude::*;
use dioxus_logger::tracing;
use shared_types::{Comment, PostId};

use crate::components::{format_timestamp, is_owner};
use crate::effects;
use crate::state::use_blog;

/// Comments of one post, with a new-comment box and at most one comment
/// being edited at a time.
#[component]
pub fn CommentSection(post_id: PostId, comments: Vec<Comment>) -> Element {
    let ctx = use_blog();
    let mut draft = use_signal(String::new);
    let edits = use_signal(CommentEditTracker::new);
    let signed_in = ctx.session.read().is_authenticated();

    let submit = move |_: MouseEvent| {
        let content = draft.read().clone();
        spawn(async move {
            if effects::add_comment(ctx, post_id, content).await.is_ok() {
                draft.set(String::new());
            }
        });
    };

    rsx! {
        section {
            h3 { "Comments ({comments.len()})" }
            for comment in comments {
                CommentRow { key: "{comment.id}", post_id, comment: comment.clone(), edits }
            }
            if signed_in {
                div {
                    style: "display: flex; gap: 0.5rem; margin-top: 0.5rem;",
                    textarea {
                        placeholder: "Add a comment",
                        value: "{draft}",
                        oninput: move |evt| draft.set(evt.value()),
                    }
                    button { onclick: submit, "Comment" }
                }
            }
        }
    }
}

#[component]
fn CommentRow(post_id: PostId, comment: Comment, edits: Signal<CommentEditTracker>) -> Element {
    let ctx = use_blog();
    let comment_id = comment.id;
    let mine = is_owner(&ctx.session.read(), &comment.owner);
    let editing = edits.read().is_editing(comment_id);
    let buffer = edits.read().buffer().unwrap_or_default().to_string();
    let date = format_timestamp(comment.created_ns);

    let start_edit = {
        let comment = comment.clone();
        move |_: MouseEvent| {
            if let Some(discarded) = edits.write().start_edit(&comment) {
                if discarded.comment_id != comment.id {
                    tracing::info!(
                        "Discarded unsaved edit of comment {}",
                        discarded.comment_id
                    );
                }
            }
        }
    };

    let save = move |_: MouseEvent| {
        let pending = edits.read().pending_save(comment_id).map(str::to_string);
        let content = match pending {
            Ok(content) => content,
            Err(e) => {
                effects::report(ctx, e);
                return;
            }
        };
        spawn(async move {
            if effects::edit_comment(ctx, post_id, comment_id, content)
                .await
                .is_ok()
            {
                edits.write().finish(comment_id);
            }
        });
    };

    let remove = move |_: MouseEvent| {
        spawn(async move {
            if effects::remove_comment(ctx, post_id, comment_id).await.is_ok() {
                edits.write().finish(comment_id);
            }
        });
    };

    rsx! {
        div {
            style: "padding: 0.5rem 0; border-bottom: 1px solid #374151;",
            div {
                style: "font-size: 0.75rem; opacity: 0.7;",
                "{comment.owner} · {date}"
            }
            if editing {
                textarea {
                    value: "{buffer}",
                    oninput: move |evt| {
                        if let Err(e) = edits.write().set_buffer(evt.value()) {
                            tracing::debug!("Ignoring input for closed comment edit: {}", e);
                        }
                    },
                }
                div {
                    style: "display: flex; gap: 0.5rem;",
                    button { onclick: save, "Save" }
                    button {
                        onclick: move |_| {
                            edits.write().cancel();
                        },
                        "Cancel"
                    }
                }
            } else {
                p { style: "white-space: pre-wrap;", "{comment.content}" }
                if mine {
                    div {
                        style: "display: flex; gap: 0.5rem;",
                        button { onclick: start_edit, "Edit" }
                        button { onclick: remove, "Remove" }
                    }
                }
            }
        }
    }
}
