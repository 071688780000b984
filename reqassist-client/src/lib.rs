//! HTTP client for the reqassist assistant service
//!
//! One endpoint, one attempt: `POST {base_url}/api/chat` with the raw user
//! text, expecting a reply and optional review stats back. Retries,
//! timeouts, and cancellation are deliberately absent; a failed request is
//! reported once and rolled back by the caller.

mod client;

pub use client::{ApiClient, ChatReply, ClientError, ClientResult};
