use shared_types::{NewPost, Post, UpdatePost};

use crate::selection::TagSelection;

/// Input fields of the post editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub tags: TagSelection,
}

impl PostForm {
    pub fn for_new() -> Self {
        Self::default()
    }

    pub fn for_edit(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            tags: TagSelection::from_post(post),
        }
    }

    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        self.tags.toggle(tag)
    }

    pub fn draft(&self) -> NewPost {
        NewPost {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.to_vec(),
        }
    }

    /// Update against `original`: title and content only when they changed,
    /// tags always (an empty selection clears them).
    pub fn edit_for(&self, original: &Post) -> UpdatePost {
        UpdatePost {
            title: (self.title != original.title).then(|| self.title.clone()),
            content: (self.content != original.content).then(|| self.content.clone()),
            tags: Some(self.tags.to_vec()),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Principal;

    fn post() -> Post {
        Post {
            id: 1,
            owner: Principal::new("alice"),
            title: "Hello".to_string(),
            created_ns: 0,
            content: "World".to_string(),
            tags: vec!["intro".to_string()],
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_edit_sends_only_changed_fields_and_tags() {
        let original = post();
        let mut form = PostForm::for_edit(&original);
        assert_eq!(
            form.edit_for(&original),
            UpdatePost {
                title: None,
                content: None,
                tags: Some(vec!["intro".to_string()]),
            }
        );

        form.content = "Everyone".to_string();
        form.toggle_tag("intro");
        let update = form.edit_for(&original);
        assert_eq!(update.title, None);
        assert_eq!(update.content.as_deref(), Some("Everyone"));
        assert_eq!(update.tags, Some(Vec::new()));
    }

    #[test]
    fn test_draft_and_clear() {
        let mut form = PostForm::for_new();
        form.title = "Hello".to_string();
        form.content = "World".to_string();
        form.toggle_tag("intro");
        assert_eq!(
            form.draft(),
            NewPost {
                title: "Hello".to_string(),
                content: "World".to_string(),
                tags: vec!["intro".to_string()],
            }
        );

        form.clear();
        assert_eq!(form, PostForm::for_new());
    }
}
