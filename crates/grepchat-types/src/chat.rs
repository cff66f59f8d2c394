//! Conversation types for a chat session against indexed repositories.
//!
//! A `ConversationLog` is append-only and lives for one chat session;
//! it is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::index::Source;

/// Who wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Bot => write!(f, "bot"),
        }
    }
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Code references backing a bot answer (empty for user entries).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            author: Author::User,
            text: text.into(),
            created_at: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn bot(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id: Uuid::now_v7(),
            author: Author::Bot,
            text: text.into(),
            created_at: Utc::now(),
            sources,
        }
    }
}

/// Ordered, append-only list of chat entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationLog {
    entries: Vec<ChatEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ChatEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recent `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[ChatEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_append_order() {
        let mut log = ConversationLog::new();
        log.append(ChatEntry::user("what does foo() do?"));
        log.append(ChatEntry::bot("It frobs.", Vec::new()));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].author, Author::User);
        assert_eq!(log.entries()[1].author, Author::Bot);
        assert_eq!(log.last().unwrap().text, "It frobs.");
    }

    #[test]
    fn test_tail_clamps_to_length() {
        let mut log = ConversationLog::new();
        for i in 0..5 {
            log.append(ChatEntry::user(format!("msg {i}")));
        }
        assert_eq!(log.tail(2).len(), 2);
        assert_eq!(log.tail(2)[0].text, "msg 3");
        assert_eq!(log.tail(50).len(), 5);
    }

    #[test]
    fn test_user_entry_has_no_sources() {
        let entry = ChatEntry::user("a");
        assert!(entry.sources.is_empty());
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("sources").is_none());
    }

    #[test]
    fn test_author_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Author::Bot).unwrap(), "\"bot\"");
        assert_eq!(Author::User.to_string(), "user");
    }
}
