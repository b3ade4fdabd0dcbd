use dioxus::prelude::*;
use dioxus_logger::tracing;

use crate::effects;
use crate::state::use_blog;

/// The tag registry: every tag posts may carry, plus add and remove
/// controls for signed-in users.
#[component]
pub fn TagManager() -> Element {
    let ctx = use_blog();
    let mut input = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let tags: Vec<String> = ctx.store.read().tags().iter().map(str::to_string).collect();
    let can_write = {
        let session = ctx.session.read();
        session.is_authenticated() || !session.policy().require_auth_for_writes
    };

    let submit = move |_: MouseEvent| {
        if busy() {
            return;
        }
        let name = input.read().clone();
        busy.set(true);
        spawn(async move {
            let added = effects::add_tag(ctx, name).await;
            busy.set(false);
            if added.is_ok() {
                input.set(String::new());
            }
        });
    };

    rsx! {
        section {
            h2 { "Tags" }
            if can_write {
                div {
                    style: "display: flex; gap: 0.5rem; margin-bottom: 0.75rem;",
                    input {
                        placeholder: "New tag",
                        value: "{input}",
                        oninput: move |evt| input.set(evt.value()),
                    }
                    button { disabled: busy(), onclick: submit, "Add tag" }
                }
            }
            if tags.is_empty() {
                p { style: "opacity: 0.7;", "No tags defined yet." }
            }
            ul {
                for tag in tags {
                    li {
                        key: "{tag}",
                        style: "display: flex; gap: 0.5rem; align-items: center;",
                        span { "#{tag}" }
                        if can_write {
                            button {
                                onclick: {
                                    let tag = tag.clone();
                                    move |_| {
                                        let tag = tag.clone();
                                        spawn(async move {
                                            if let Err(e) = effects::remove_tag(ctx, tag).await {
                                                tracing::debug!("Tag removal failed: {}", e);
                                            }
                                        });
                                    }
                                },
                                "Remove"
                            }
                        }
                    }
                }
            }
        }
    }
}
