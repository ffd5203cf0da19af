//! In-memory chat sessions. Nothing here outlives the process, and at most
//! `MAX_SESSIONS` are kept.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::chat::ChatMessage;

/// Live sessions kept before the least recently active one is evicted.
pub const MAX_SESSIONS: usize = 1000;

struct Session {
    messages: Vec<ChatMessage>,
    last_active: u64,
}

#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, Session>,
    clock: u64,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn append(&self, session_id: Uuid, message: ChatMessage) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.clock += 1;

        if !inner.by_id.contains_key(&session_id) && inner.by_id.len() >= self.max_sessions {
            let oldest = inner
                .by_id
                .iter()
                .min_by_key(|(_, session)| session.last_active)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                debug!("Evicting idle chat session {oldest}");
                inner.by_id.remove(&oldest);
            }
        }

        let session = inner.by_id.entry(session_id).or_insert_with(|| Session {
            messages: Vec::new(),
            last_active: 0,
        });
        session.messages.push(message);
        session.last_active = inner.clock;
    }

    /// History of a session; empty for unknown ids.
    pub async fn history(&self, session_id: Uuid) -> Vec<ChatMessage> {
        self.inner
            .read()
            .await
            .by_id
            .get(&session_id)
            .map(|session| session.messages.clone())
            .unwrap_or_default()
    }

    /// Returns whether the session existed.
    pub async fn clear(&self, session_id: Uuid) -> bool {
        self.inner.write().await.by_id.remove(&session_id).is_some()
    }
}

/// Plain-text transcript: `[time] You|AI: text`, entries separated by a blank line.
pub fn export_transcript(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|m| format!("[{}] {}: {}", m.time, m.role.speaker(), m.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    fn message(role: Role, text: &str) -> ChatMessage {
        ChatMessage {
            role,
            text: text.to_string(),
            time: "2026-10-19 09:30:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append(a, message(Role::User, "hi")).await;
        store.append(a, message(Role::Assistant, "hello")).await;
        store.append(b, message(Role::User, "other")).await;

        assert_eq!(store.history(a).await.len(), 2);
        assert_eq!(store.history(b).await.len(), 1);
        assert!(store.history(Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn test_clear_removes_history() {
        let store = SessionStore::new();
        let id = Uuid::new_v4();
        store.append(id, message(Role::User, "hi")).await;

        assert!(store.clear(id).await);
        assert!(store.history(id).await.is_empty());
        assert!(!store.clear(id).await);
    }

    #[tokio::test]
    async fn test_least_recently_active_session_is_evicted_at_capacity() {
        let store = SessionStore::with_capacity(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        store.append(a, message(Role::User, "first")).await;
        store.append(b, message(Role::User, "second")).await;
        store.append(a, message(Role::User, "a again")).await;
        store.append(c, message(Role::User, "third")).await;

        assert_eq!(store.history(a).await.len(), 2);
        assert!(store.history(b).await.is_empty());
        assert_eq!(store.history(c).await.len(), 1);
    }

    #[test]
    fn test_export_transcript_format() {
        let history = vec![
            message(Role::User, "What should I learn?"),
            message(Role::Assistant, "Start with SQL."),
        ];
        assert_eq!(
            export_transcript(&history),
            "[2026-10-19 09:30:00] You: What should I learn?\n\n\
             [2026-10-19 09:30:00] AI: Start with SQL."
        );
    }

    #[test]
    fn test_new_message_timestamp_format() {
        let m = ChatMessage::new(Role::User, "hi");
        assert!(chrono::NaiveDateTime::parse_from_str(&m.time, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
