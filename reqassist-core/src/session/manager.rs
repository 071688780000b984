//! Persistence for the chat session
//!
//! The whole session lives under one JSON file holding the encoded message
//! sequence. Every mutation rewrites the file in full; there is no
//! incremental diffing. A single reader/writer is assumed, last write wins.

use super::store::Message;
use std::path::{Path, PathBuf};
use tracing::warn;

const HISTORY_FILE: &str = "chat_history.json";

/// Stores the chat session on disk
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at the given session directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            path: dir.as_ref().join(HISTORY_FILE),
        }
    }

    /// Path of the persisted history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session.
    ///
    /// Returns an empty sequence when the file is absent. Unreadable or
    /// unparsable content (including non-array JSON) is discarded: the file
    /// is deleted and an empty session is returned, so corruption never
    /// escalates past a warning.
    pub fn load(&self) -> Vec<Message> {
        if !self.path.exists() {
            return Vec::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read chat history {}: {}", self.path.display(), e);
                self.discard_corrupt();
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Message>>(&content) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    "Discarding corrupt chat history {}: {}",
                    self.path.display(),
                    e
                );
                self.discard_corrupt();
                Vec::new()
            }
        }
    }

    /// Replace the persisted session with the given sequence
    pub fn replace(&self, messages: &[Message]) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(messages)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    /// Remove the persisted session entirely
    pub fn clear(&self) -> crate::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn discard_corrupt(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(
                "Failed to remove corrupt chat history {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
