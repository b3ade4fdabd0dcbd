use std::rc::Rc;

use blog_sync::{ContentStore, HttpGatewayFactory, NoticeBoard, SessionManager, SyncConfig};
use dioxus::prelude::*;
use shared_types::PostId;

use crate::api::browser_config;
use crate::auth::BrowserIdentity;

/// Which view the shell is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Posts,
    Post(PostId),
    NewPost,
    EditPost(PostId),
    Tags,
}

/// Shared application state, provided once by the shell as context.
///
/// Everything is a `Signal`, so the struct is `Copy` and can be moved into
/// event handlers and spawned tasks freely.
#[derive(Clone, Copy)]
pub struct BlogContext {
    pub config: Signal<SyncConfig>,
    pub identity: Signal<BrowserIdentity>,
    pub session: Signal<SessionManager>,
    pub store: Signal<ContentStore>,
    pub notices: Signal<NoticeBoard>,
    pub view: Signal<View>,
}

impl BlogContext {
    pub fn new() -> Self {
        let config = browser_config();
        let factory = Rc::new(HttpGatewayFactory::new(&config));
        let session = SessionManager::new(factory, config.access);
        let notices = NoticeBoard::new(config.notice_ttl());
        let identity = BrowserIdentity::new(config.api_base_url.clone());

        Self {
            config: Signal::new(config),
            identity: Signal::new(identity),
            session: Signal::new(session),
            store: Signal::new(ContentStore::new()),
            notices: Signal::new(notices),
            view: Signal::new(View::default()),
        }
    }

    pub fn navigate(mut self, view: View) {
        self.view.set(view);
    }
}

pub fn use_blog() -> BlogContext {
    use_context::<BlogContext>()
}
