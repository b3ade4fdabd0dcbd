//! Single in-progress comment edit per post view.

use shared_types::{Comment, CommentId};

use crate::error::SyncError;

/// The comment being edited and its unsaved text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentEdit {
    pub comment_id: CommentId,
    pub buffer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentEditTracker {
    editing: Option<CommentEdit>,
}

impl CommentEditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin editing `comment`, seeding the buffer from its current content.
    ///
    /// Any edit already in progress is replaced and handed back so the
    /// caller can decide what to do with its unsaved text.
    pub fn start_edit(&mut self, comment: &Comment) -> Option<CommentEdit> {
        let previous = self.editing.replace(CommentEdit {
            comment_id: comment.id,
            buffer: comment.content.clone(),
        });
        if let Some(prev) = &previous {
            if prev.comment_id != comment.id {
                tracing::debug!(
                    discarded = prev.comment_id,
                    started = comment.id,
                    "Switched comment edit target"
                );
            }
        }
        previous
    }

    pub fn editing(&self) -> Option<&CommentEdit> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self, comment_id: CommentId) -> bool {
        self.editing
            .as_ref()
            .is_some_and(|edit| edit.comment_id == comment_id)
    }

    pub fn buffer(&self) -> Option<&str> {
        self.editing.as_ref().map(|edit| edit.buffer.as_str())
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) -> Result<(), SyncError> {
        let edit = self.editing.as_mut().ok_or(SyncError::NoEditInProgress)?;
        edit.buffer = text.into();
        Ok(())
    }

    /// Drop the edit without saving.
    pub fn cancel(&mut self) -> Option<CommentEdit> {
        self.editing.take()
    }

    /// Buffer to save for `comment_id`. Fails if that comment is not the
    /// one being edited.
    pub fn pending_save(&self, comment_id: CommentId) -> Result<&str, SyncError> {
        match &self.editing {
            Some(edit) if edit.comment_id == comment_id => Ok(&edit.buffer),
            _ => Err(SyncError::NoEditInProgress),
        }
    }

    /// Clear the edit after a successful save of `comment_id`.
    pub fn finish(&mut self, comment_id: CommentId) {
        if self.is_editing(comment_id) {
            self.editing = None;
        }
    }
}
