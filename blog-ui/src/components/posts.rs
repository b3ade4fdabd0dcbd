use blog_sync::ContentStore;
use dioxus::prelude::*;
use shared_types::{Post, PostId};

use crate::components::{format_timestamp, is_owner, CommentSection};
use crate::state::{use_blog, View};

/// Posts to list, newest first, optionally restricted to one tag.
pub fn visible_posts(store: &ContentStore, tag: Option<&str>) -> Vec<Post> {
    let mut posts: Vec<Post> = match tag {
        Some(tag) => store.posts_tagged(tag).cloned().collect(),
        None => store.posts().to_vec(),
    };
    posts.sort_by(|a, b| b.created_ns.cmp(&a.created_ns));
    posts
}

#[component]
pub fn PostList() -> Element {
    let ctx = use_blog();
    let mut filter = use_signal(|| None::<String>);

    let tags: Vec<String> = ctx.store.read().tags().iter().map(str::to_string).collect();
    let active = filter.read().clone();
    let posts = visible_posts(&ctx.store.read(), active.as_deref());

    rsx! {
        section {
            div {
                style: "display: flex; flex-wrap: wrap; gap: 0.25rem; margin-bottom: 0.75rem;",
                button {
                    disabled: active.is_none(),
                    onclick: move |_| filter.set(None),
                    "All"
                }
                for tag in tags {
                    button {
                        key: "{tag}",
                        disabled: active.as_deref() == Some(tag.as_str()),
                        onclick: {
                            let tag = tag.clone();
                            move |_| filter.set(Some(tag.clone()))
                        },
                        "#{tag}"
                    }
                }
            }
            if posts.is_empty() {
                p { style: "opacity: 0.7;", "No posts yet." }
            }
            for post in posts {
                PostCard { key: "{post.id}", post: post.clone() }
            }
        }
    }
}

#[component]
fn PostCard(post: Post) -> Element {
    let ctx = use_blog();
    let id = post.id;
    let date = format_timestamp(post.created_ns);
    let comment_count = post.comments.len();

    rsx! {
        article {
            style: "padding: 0.75rem; border: 1px solid #374151; border-radius: 0.25rem; margin-bottom: 0.5rem; cursor: pointer;",
            onclick: move |_| ctx.navigate(View::Post(id)),
            h3 { "{post.title}" }
            div {
                style: "font-size: 0.8rem; opacity: 0.7;",
                "{post.owner} · {date} · {comment_count} comments"
            }
            TagChips { tags: post.tags.clone() }
        }
    }
}

#[component]
fn TagChips(tags: Vec<String>) -> Element {
    rsx! {
        div {
            style: "display: flex; gap: 0.25rem;",
            for tag in tags {
                span {
                    key: "{tag}",
                    style: "font-size: 0.75rem; padding: 0 0.4rem; border-radius: 0.75rem; background-color: #1f2937;",
                    "#{tag}"
                }
            }
        }
    }
}

#[component]
pub fn PostDetail(post_id: PostId) -> Element {
    let ctx = use_blog();
    let post = ctx.store.read().post(post_id).cloned();

    let Some(post) = post else {
        return rsx! {
            p { "This post is no longer available." }
            button { onclick: move |_| ctx.navigate(View::Posts), "Back to posts" }
        };
    };
    let mine = is_owner(&ctx.session.read(), &post.owner);
    let date = format_timestamp(post.created_ns);

    rsx! {
        article {
            button { onclick: move |_| ctx.navigate(View::Posts), "← Back" }
            h2 { "{post.title}" }
            div {
                style: "font-size: 0.8rem; opacity: 0.7;",
                "{post.owner} · {date}"
            }
            TagChips { tags: post.tags.clone() }
            p { style: "white-space: pre-wrap;", "{post.content}" }
            if mine {
                button {
                    onclick: move |_| ctx.navigate(View::EditPost(post_id)),
                    "Edit post"
                }
            }
            CommentSection { post_id, comments: post.comments.clone() }
        }
    }
}
