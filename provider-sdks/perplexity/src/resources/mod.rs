//! API resources, one per endpoint group.

mod async_chat;
mod chat;
mod search;

pub use async_chat::AsyncChat;
pub use chat::Chat;
pub use search::Search;
