//! Request lifecycle for the chat session
//!
//! `ChatSession` owns the in-memory message sequence and its store, and
//! walks the idle -> sending -> idle/error lifecycle. The HTTP call itself
//! happens outside; its outcome is fed back through `resolve_ok` /
//! `resolve_err`, which keeps the state machine testable without a network.

use super::manager::SessionStore;
use super::store::{Message, MessageId, ReviewStats};
use tracing::debug;

/// Where the session is in the request lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatPhase {
    /// No request in flight
    Idle,
    /// A request is in flight; submits are ignored until it resolves
    Sending,
    /// The last request failed; holds the most recent error only.
    /// Equivalent to `Idle` for input purposes.
    Error(String),
}

/// A chat session bound to its persistent store
#[derive(Debug)]
pub struct ChatSession {
    store: SessionStore,
    messages: Vec<Message>,
    phase: ChatPhase,
}

impl ChatSession {
    /// Open the session, loading whatever the store holds
    pub fn open(store: SessionStore) -> Self {
        let messages = store.load();
        Self {
            store,
            messages,
            phase: ChatPhase::Idle,
        }
    }

    /// Messages in creation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> &ChatPhase {
        &self.phase
    }

    /// Last error message, if the last request failed
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            ChatPhase::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a request is in flight
    pub fn is_sending(&self) -> bool {
        self.phase == ChatPhase::Sending
    }

    /// Submit user input.
    ///
    /// Whitespace-only input is ignored, as is any submit while a request
    /// is already in flight. Otherwise the user message is appended
    /// optimistically, persisted, any prior error is cleared, and the id of
    /// the pending message is returned so a failure can roll it back.
    pub fn submit(&mut self, input: &str) -> crate::Result<Option<MessageId>> {
        let content = input.trim();
        if content.is_empty() {
            return Ok(None);
        }
        if self.is_sending() {
            debug!("Submit ignored, request already in flight");
            return Ok(None);
        }

        let message = Message::user(content);
        let pending = message.id;
        self.messages.push(message);
        self.store.replace(&self.messages)?;
        self.phase = ChatPhase::Sending;
        Ok(Some(pending))
    }

    /// Record a successful reply for the pending request
    pub fn resolve_ok(
        &mut self,
        content: impl Into<String>,
        stats: Option<ReviewStats>,
    ) -> crate::Result<()> {
        self.messages.push(Message::bot(content, stats));
        self.store.replace(&self.messages)?;
        self.phase = ChatPhase::Idle;
        Ok(())
    }

    /// Record a failed request: the optimistic message is rolled back by
    /// its id, so an identical earlier message in the history is untouched.
    pub fn resolve_err(&mut self, pending: MessageId, error: impl Into<String>) -> crate::Result<()> {
        self.messages.retain(|m| m.id != pending);
        self.store.replace(&self.messages)?;
        self.phase = ChatPhase::Error(error.into());
        Ok(())
    }

    /// Clear the session and its persisted storage
    pub fn clear(&mut self) -> crate::Result<()> {
        self.messages.clear();
        self.store.clear()?;
        self.phase = ChatPhase::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::Role;
    use tempfile::TempDir;

    fn open_session(temp_dir: &TempDir) -> ChatSession {
        ChatSession::open(SessionStore::new(temp_dir.path()))
    }

    #[test]
    fn test_open_reloads_persisted_messages() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        store
            .replace(&[Message::user("earlier"), Message::bot("reply", None)])
            .unwrap();

        let session = open_session(&temp_dir);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content, "earlier");
        assert_eq!(*session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_empty_submit_is_a_no_op() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        assert!(session.submit("").unwrap().is_none());
        assert!(session.submit("   \n\t").unwrap().is_none());
        assert!(session.messages().is_empty());
        assert_eq!(*session.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_submit_appends_user_message_and_enters_sending() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        let pending = session.submit("hello").unwrap().unwrap();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id, pending);
        assert_eq!(session.messages()[0].role, Role::User);
        assert_eq!(session.messages()[0].content, "hello");
        assert_eq!(*session.phase(), ChatPhase::Sending);

        // the optimistic message is already persisted
        let store = SessionStore::new(temp_dir.path());
        assert_eq!(store.load().len(), 1);
    }

    #[test]
    fn test_submit_while_sending_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        session.submit("first").unwrap().unwrap();
        assert!(session.submit("second").unwrap().is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_success_appends_bot_reply_and_returns_to_idle() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        session.submit("hello").unwrap().unwrap();
        session.resolve_ok("hi there", None).unwrap();

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1].role, Role::Bot);
        assert_eq!(session.messages()[1].content, "hi there");
        assert_eq!(*session.phase(), ChatPhase::Idle);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_failure_rolls_back_and_sets_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        let pending = session.submit("hello").unwrap().unwrap();
        session.resolve_err(pending, "HTTP 500: boom").unwrap();

        assert!(session.messages().is_empty());
        assert_eq!(session.error(), Some("HTTP 500: boom"));

        // rollback is reflected in storage too
        let store = SessionStore::new(temp_dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_rollback_spares_identical_earlier_message() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        // an earlier "hello" exchange already in history
        session.submit("hello").unwrap().unwrap();
        session.resolve_ok("hi there", None).unwrap();

        // resend the same text, then fail
        let pending = session.submit("hello").unwrap().unwrap();
        session.resolve_err(pending, "network down").unwrap();

        // only the pending copy was removed
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].content, "hello");
        assert_eq!(session.messages()[1].content, "hi there");
    }

    #[test]
    fn test_submit_from_error_clears_the_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        let pending = session.submit("hello").unwrap().unwrap();
        session.resolve_err(pending, "boom").unwrap();
        assert!(session.error().is_some());

        session.submit("hello again").unwrap().unwrap();
        assert_eq!(*session.phase(), ChatPhase::Sending);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_clear_empties_session_and_storage() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        session.submit("hello").unwrap().unwrap();
        session.resolve_ok("hi", None).unwrap();
        session.clear().unwrap();

        assert!(session.messages().is_empty());
        assert_eq!(*session.phase(), ChatPhase::Idle);
        assert!(!SessionStore::new(temp_dir.path()).path().exists());
    }

    #[test]
    fn test_reply_stats_survive_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = open_session(&temp_dir);

        session.submit("status?").unwrap().unwrap();
        session
            .resolve_ok(
                "summary",
                Some(ReviewStats {
                    approved: 5,
                    in_review: 2,
                    disapproved: 1,
                }),
            )
            .unwrap();
        drop(session);

        let reloaded = open_session(&temp_dir);
        let stats = reloaded.messages()[1].stats.as_ref().unwrap();
        assert_eq!(stats.approved, 5);
        assert_eq!(stats.in_review, 2);
        assert_eq!(stats.disapproved, 1);
    }
}
