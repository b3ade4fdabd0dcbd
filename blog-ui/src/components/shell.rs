use blog_sync::{NoticeKind, SessionState};
use chrono::Utc;
use dioxus::prelude::*;

use crate::components::{PostDetail, PostEditor, PostList, TagManager};
use crate::effects;
use crate::state::{use_blog, BlogContext, View};

// ============================================================================
// Shell - provides context, picks the active view
// ============================================================================

#[component]
pub fn BlogShell() -> Element {
    let ctx = use_context_provider(BlogContext::new);

    // Probe the session without blocking the first render.
    use_effect(move || {
        spawn(effects::initialize_session(ctx));
    });

    let view = *ctx.view.read();

    rsx! {
        div {
            style: "max-width: 56rem; margin: 0 auto; display: flex; flex-direction: column; gap: 1rem;",
            header {
                style: "display: flex; justify-content: space-between; align-items: center;",
                Nav {}
                AuthBar {}
            }
            NoticeBanner {}
            match view {
                View::Posts => rsx! { PostList {} },
                View::Post(id) => rsx! { PostDetail { post_id: id } },
                View::NewPost => rsx! { PostEditor {} },
                View::EditPost(id) => rsx! { PostEditor { post_id: id } },
                View::Tags => rsx! { TagManager {} },
            }
        }
    }
}

#[component]
fn Nav() -> Element {
    let ctx = use_blog();
    let can_write = {
        let session = ctx.session.read();
        session.is_authenticated() || !session.policy().require_auth_for_writes
    };

    rsx! {
        nav {
            style: "display: flex; gap: 0.5rem;",
            button { onclick: move |_| ctx.navigate(View::Posts), "Posts" }
            if can_write {
                button { onclick: move |_| ctx.navigate(View::NewPost), "New post" }
            }
            button { onclick: move |_| ctx.navigate(View::Tags), "Tags" }
        }
    }
}

// ============================================================================
// Auth bar
// ============================================================================

#[component]
pub fn AuthBar() -> Element {
    let ctx = use_blog();
    let state = ctx.session.read().state().clone();

    rsx! {
        div {
            style: "display: flex; gap: 0.5rem; align-items: center;",
            match state {
                SessionState::Authenticated(credential) => rsx! {
                    span { "Signed in as {credential.principal}" }
                    button {
                        onclick: move |_| {
                            spawn(effects::logout(ctx));
                        },
                        "Log out"
                    }
                },
                SessionState::Authenticating => rsx! {
                    span { "Signing in..." }
                },
                SessionState::Unauthenticated => rsx! {
                    button {
                        onclick: move |_| {
                            spawn(effects::login(ctx));
                        },
                        "Log in"
                    }
                },
            }
        }
    }
}

// ============================================================================
// Notice banner
// ============================================================================

#[component]
pub fn NoticeBanner() -> Element {
    let ctx = use_blog();
    let notice = ctx.notices.read().visible(Utc::now()).cloned();

    let Some(notice) = notice else {
        return rsx! {};
    };
    let color = match notice.kind {
        NoticeKind::Error => "#b91c1c",
        NoticeKind::Info => "#047857",
    };

    rsx! {
        div {
            role: "status",
            style: "padding: 0.5rem 0.75rem; border-radius: 0.25rem; color: white; background-color: {color};",
            "{notice.message}"
        }
    }
}
