//! Chat session handling
//!
//! The session is an ordered list of messages persisted as a single JSON
//! file, plus the request lifecycle state machine driving it.

pub mod chat;
pub mod manager;
pub mod store;

pub use chat::{ChatPhase, ChatSession};
pub use manager::SessionStore;
pub use store::{Message, MessageId, ReviewStats, Role};
