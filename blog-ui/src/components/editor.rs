use blog_sync::controller::POST_NOT_FOUND;
use blog_sync::{PostForm, SyncError};
use dioxus::prelude::*;
use shared_types::PostId;

use crate::effects;
use crate::state::{use_blog, View};

/// Create a post, or edit `post_id` when given. Tags are toggled from the
/// registry; an empty selection clears the post's tags on edit.
#[component]
pub fn PostEditor(post_id: Option<PostId>) -> Element {
    let ctx = use_blog();
    let mut form = use_signal(move || match post_id {
        Some(id) => ctx
            .store
            .peek()
            .post(id)
            .map(PostForm::for_edit)
            .unwrap_or_default(),
        None => PostForm::for_new(),
    });
    let mut saving = use_signal(|| false);

    let registry: Vec<String> = ctx.store.read().tags().iter().map(str::to_string).collect();
    let (title, content) = {
        let form = form.read();
        (form.title.clone(), form.content.clone())
    };

    let submit = move |_: MouseEvent| {
        if saving() {
            return;
        }
        let snapshot = form.read().clone();
        saving.set(true);
        spawn(async move {
            let result = match post_id {
                Some(id) => {
                    let original = ctx.store.peek().post(id).cloned();
                    match original {
                        Some(original) => {
                            effects::edit_post(ctx, id, snapshot.edit_for(&original)).await
                        }
                        None => Err(effects::report(ctx, SyncError::validation(POST_NOT_FOUND))),
                    }
                }
                None => effects::create_post(ctx, snapshot.draft()).await,
            };
            saving.set(false);
            if let Ok(post) = result {
                form.write().clear();
                ctx.navigate(View::Post(post.id));
            }
        });
    };

    rsx! {
        section {
            style: "display: flex; flex-direction: column; gap: 0.5rem;",
            h2 { if post_id.is_some() { "Edit post" } else { "New post" } }
            input {
                placeholder: "Title",
                value: "{title}",
                oninput: move |evt| form.write().title = evt.value(),
            }
            textarea {
                placeholder: "Write something...",
                rows: "8",
                value: "{content}",
                oninput: move |evt| form.write().content = evt.value(),
            }
            fieldset {
                legend { "Tags" }
                if registry.is_empty() {
                    span { style: "opacity: 0.7;", "No tags defined yet." }
                }
                for tag in registry {
                    label {
                        key: "{tag}",
                        style: "margin-right: 0.75rem;",
                        input {
                            r#type: "checkbox",
                            checked: form.read().tags.contains(&tag),
                            onchange: {
                                let tag = tag.clone();
                                move |_| {
                                    form.write().toggle_tag(&tag);
                                }
                            },
                        }
                        " {tag}"
                    }
                }
            }
            div {
                style: "display: flex; gap: 0.5rem;",
                button { disabled: saving(), onclick: submit, "Save" }
                button {
                    onclick: move |_| match post_id {
                        Some(id) => ctx.navigate(View::Post(id)),
                        None => ctx.navigate(View::Posts),
                    },
                    "Cancel"
                }
            }
        }
    }
}
