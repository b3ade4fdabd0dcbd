//! Tag selection for the post editor.

use shared_types::Post;

/// Ordered set of tag names chosen for a post being created or edited.
///
/// Selection order is preserved and is the order sent to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    tags: Vec<String>,
}

impl TagSelection {
    /// Empty selection, used when creating a post.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection seeded from a post's current tags, used when editing.
    pub fn from_post(post: &Post) -> Self {
        post.tags.iter().cloned().collect()
    }

    /// Add `tag` if absent, remove it if present. Returns whether the tag is
    /// selected afterwards.
    pub fn toggle(&mut self, tag: &str) -> bool {
        if let Some(index) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(index);
            false
        } else {
            self.tags.push(tag.to_string());
            true
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    /// The tag list sent on submit, possibly empty.
    pub fn to_vec(&self) -> Vec<String> {
        self.tags.clone()
    }
}

impl FromIterator<String> for TagSelection {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut selection = Self::new();
        for tag in iter {
            if !selection.contains(&tag) {
                selection.tags.push(tag);
            }
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::Principal;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = TagSelection::new();
        assert!(selection.toggle("rust"));
        assert!(selection.toggle("news"));
        assert_eq!(selection.as_slice(), ["rust", "news"]);

        assert!(!selection.toggle("rust"));
        assert_eq!(selection.as_slice(), ["news"]);
        assert!(!selection.contains("rust"));
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let mut selection = TagSelection::new();
        selection.toggle("Rust");
        assert!(!selection.contains("rust"));
        assert!(selection.toggle("rust"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_from_post_seeds_and_dedupes() {
        let post = Post {
            id: 1,
            owner: Principal::new("owner"),
            title: "t".to_string(),
            created_ns: 0,
            content: String::new(),
            tags: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            comments: Vec::new(),
        };
        let mut selection = TagSelection::from_post(&post);
        assert_eq!(selection.to_vec(), vec!["a".to_string(), "b".to_string()]);

        selection.toggle("a");
        selection.toggle("b");
        assert!(selection.is_empty());
        assert!(selection.to_vec().is_empty());
    }

    proptest! {
        #[test]
        fn prop_even_toggles_restore_membership(
            initial in proptest::collection::vec("[a-c]{1,2}", 0..6),
            tag in "[a-c]{1,2}",
            pairs in 0usize..5,
        ) {
            let mut selection: TagSelection = initial.into_iter().collect();
            let before = selection.contains(&tag);
            let others: Vec<String> = selection
                .iter()
                .filter(|t| *t != tag)
                .map(str::to_string)
                .collect();

            for _ in 0..pairs * 2 {
                selection.toggle(&tag);
            }

            prop_assert_eq!(selection.contains(&tag), before);
            for other in &others {
                prop_assert!(selection.contains(other));
            }
        }

        #[test]
        fn prop_odd_toggles_flip_membership(
            initial in proptest::collection::vec("[a-c]", 0..4),
            tag in "[a-c]",
            pairs in 0usize..4,
        ) {
            let mut selection: TagSelection = initial.into_iter().collect();
            let before = selection.contains(&tag);
            for _ in 0..pairs * 2 + 1 {
                selection.toggle(&tag);
            }
            prop_assert_eq!(selection.contains(&tag), !before);
        }
    }
}
