//! Session-bound content synchronization for the blog front end.
//!
//! - [`session`] establishes the calling identity and its gateway client
//! - [`coordinator`] runs writes against the gateway and names what to re-fetch
//! - [`store`] holds the last snapshot of posts and tags
//! - [`controller`] ties them together for a single UI
//!
//! Everything here is single-threaded (`Rc`, `?Send` futures) so the same
//! code runs natively under tokio and in the browser.

pub mod comment_edit;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod identity;
pub mod notice;
pub mod selection;
pub mod session;
pub mod store;
pub mod validate;

pub use comment_edit::{CommentEdit, CommentEditTracker};
pub use config::{AccessPolicy, ContentLimits, SyncConfig, Transport};
pub use controller::{AppController, AppState};
pub use coordinator::{Invalidation, Mutated, MutationCoordinator, Refreshed, Settled};
pub use error::SyncError;
pub use forms::PostForm;
pub use gateway::{ContentGateway, GatewayError, GatewayFactory, HttpGatewayFactory};
pub use identity::{Credential, IdentityError, IdentityProvider};
pub use notice::{Notice, NoticeBoard, NoticeKind};
pub use selection::TagSelection;
pub use session::{SessionManager, SessionState};
pub use store::ContentStore;
