//! Local checks run before any gateway call.

use shared_types::{NewPost, UpdatePost};

use crate::config::ContentLimits;
use crate::error::SyncError;

pub const EMPTY_POST: &str = "Title and content cannot be empty!";
pub const EMPTY_TITLE: &str = "Title cannot be empty!";
pub const EMPTY_COMMENT: &str = "Comment cannot be empty!";
pub const EMPTY_TAG: &str = "Tag name cannot be empty!";
pub const TITLE_TOO_LONG: &str = "Title is too long!";
pub const CONTENT_TOO_LONG: &str = "Content is too long!";
pub const TOO_MANY_TAGS: &str = "Too many tags!";

pub fn new_post(post: &NewPost, limits: &ContentLimits) -> Result<(), SyncError> {
    if post.title.trim().is_empty() || post.content.trim().is_empty() {
        return Err(SyncError::validation(EMPTY_POST));
    }
    title(&post.title, limits)?;
    content(&post.content, limits)?;
    tags(&post.tags, limits)
}

/// Title may not be cleared; content may be set to an empty string.
pub fn post_update(update: &UpdatePost, limits: &ContentLimits) -> Result<(), SyncError> {
    if let Some(new_title) = &update.title {
        if new_title.trim().is_empty() {
            return Err(SyncError::validation(EMPTY_TITLE));
        }
        title(new_title, limits)?;
    }
    if let Some(new_content) = &update.content {
        content(new_content, limits)?;
    }
    if let Some(new_tags) = &update.tags {
        tags(new_tags, limits)?;
    }
    Ok(())
}

pub fn comment(text: &str, limits: &ContentLimits) -> Result<(), SyncError> {
    if text.trim().is_empty() {
        return Err(SyncError::validation(EMPTY_COMMENT));
    }
    content(text, limits)
}

/// Trimmed tag name, or an error if nothing is left.
pub fn tag_name(raw: &str) -> Result<String, SyncError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SyncError::validation(EMPTY_TAG));
    }
    Ok(name.to_string())
}

fn title(text: &str, limits: &ContentLimits) -> Result<(), SyncError> {
    if text.len() > limits.max_title_len {
        return Err(SyncError::validation(TITLE_TOO_LONG));
    }
    Ok(())
}

fn content(text: &str, limits: &ContentLimits) -> Result<(), SyncError> {
    if text.len() > limits.max_content_len {
        return Err(SyncError::validation(CONTENT_TOO_LONG));
    }
    Ok(())
}

fn tags(list: &[String], limits: &ContentLimits) -> Result<(), SyncError> {
    if list.len() > limits.max_tags {
        return Err(SyncError::validation(TOO_MANY_TAGS));
    }
    Ok(())
}
