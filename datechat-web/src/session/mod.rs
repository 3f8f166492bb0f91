//! Cookie-identified session state.

mod context;
mod cookie;
mod store;

pub use context::SessionContext;
pub use cookie::CookieSettings;
pub use store::{
    spawn_purge_task, Attribute, AttributeValue, InMemorySessionStore, SessionStore,
};
