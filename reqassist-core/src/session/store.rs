//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a message within a session.
///
/// Assigned at creation and used to key rollback of optimistic messages,
/// so two messages with identical content never collide.
pub type MessageId = Uuid;

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// Review counters attached to a bot reply for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub approved: u64,
    #[serde(rename = "inReview")]
    pub in_review: u64,
    pub disapproved: u64,
}

/// One chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identity, assigned at creation
    pub id: MessageId,
    /// Message author; immutable once created
    pub role: Role,
    /// Message text
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Review stats; only bot replies carry them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReviewStats>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            stats: None,
        }
    }

    /// Create a bot reply, optionally carrying review stats
    pub fn bot(content: impl Into<String>, stats: Option<ReviewStats>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Bot,
            content: content.into(),
            timestamp: Utc::now(),
            stats,
        }
    }
}
