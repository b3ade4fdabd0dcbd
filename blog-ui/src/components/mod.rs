pub mod comments;
pub mod editor;
pub mod posts;
pub mod shell;
pub mod tags;

pub use comments::CommentSection;
pub use editor::PostEditor;
pub use posts::{PostDetail, PostList};
pub use shell::{AuthBar, BlogShell, NoticeBanner};
pub use tags::TagManager;

use blog_sync::SessionManager;
use shared_types::{nanos_to_datetime, Principal};

pub fn format_timestamp(nanos: u64) -> String {
    nanos_to_datetime(nanos).format("%Y-%m-%d %H:%M").to_string()
}

/// Whether the signed-in caller owns content created by `owner`.
pub fn is_owner(session: &SessionManager, owner: &Principal) -> bool {
    session
        .credential()
        .is_some_and(|credential| &credential.principal == owner)
}
