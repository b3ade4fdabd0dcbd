pub mod api;
pub mod auth;
pub mod components;
pub mod effects;
pub mod state;

pub use api::*;
pub use auth::BrowserIdentity;
pub use components::*;
pub use state::{use_blog, BlogContext, View};
