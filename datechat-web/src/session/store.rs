//! Keyed session attribute store.

use crate::goal::ChatGoal;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Named attributes a session can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    ApiKey,
    ChatGoal,
    ChatHistory,
}

impl Attribute {
    pub const fn name(self) -> &'static str {
        match self {
            Attribute::ApiKey => "apiKey",
            Attribute::ChatGoal => "chatGoal",
            Attribute::ChatHistory => "chatHistory",
        }
    }
}

/// Stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    Goal(ChatGoal),
    History(Vec<String>),
}

/// Session-scoped key-value storage.
///
/// A miss (unknown session or unset attribute) is a normal outcome and is
/// reported as `None`, never as an error.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up one attribute of a session.
    async fn get(&self, session_id: &str, name: Attribute) -> Option<AttributeValue>;

    /// Store one attribute, creating the session if needed.
    async fn set(&self, session_id: &str, name: Attribute, value: AttributeValue);

    /// Append one message to the chat history, creating the session if
    /// needed. Returns the history including the new entry.
    async fn append_history(&self, session_id: &str, message: String) -> Vec<String>;

    /// Start the chat history with `opening` unless one is already stored.
    /// Returns the stored history.
    async fn seed_history(&self, session_id: &str, opening: String) -> Vec<String>;

    /// Remove the history entry that was appended at `index`.
    ///
    /// Other requests may have appended after it, and removals may have
    /// shifted it towards the front, so only an entry equal to `message` at
    /// or before `index` is removed. Returns whether one was.
    async fn remove_history_entry(&self, session_id: &str, index: usize, message: &str) -> bool;

    /// Whether a live (unexpired) session exists under this id.
    async fn contains(&self, session_id: &str) -> bool;

    /// Drop a whole session. Returns whether it existed.
    async fn remove(&self, session_id: &str) -> bool;

    /// Drop sessions idle past the TTL. Returns how many were removed.
    async fn purge_expired(&self) -> usize;

    /// Number of sessions currently held.
    async fn len(&self) -> usize;
}

#[derive(Debug)]
struct SessionEntry {
    attributes: HashMap<Attribute, AttributeValue>,
    last_access: DateTime<Utc>,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            attributes: HashMap::new(),
            last_access: Utc::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.last_access > ttl
    }

    fn touch(&mut self) {
        self.last_access = Utc::now();
    }

    fn update_history<R>(&mut self, f: impl FnOnce(&mut Vec<String>) -> R) -> R {
        let mut history = match self.attributes.remove(&Attribute::ChatHistory) {
            Some(AttributeValue::History(history)) => history,
            _ => Vec::new(),
        };
        let result = f(&mut history);
        self.attributes
            .insert(Attribute::ChatHistory, AttributeValue::History(history));
        result
    }
}

/// Process-local store.
///
/// The outer lock only guards the session map; each session has its own
/// mutex so writes to different sessions never wait on each other.
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Mutex<SessionEntry>>>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        }
    }

    async fn entry(&self, session_id: &str) -> Option<Arc<Mutex<SessionEntry>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn entry_or_insert(&self, session_id: &str) -> Arc<Mutex<SessionEntry>> {
        if let Some(entry) = self.entry(session_id).await {
            return entry;
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(
                    session = datechat_common::logging::short_id(session_id),
                    "Session created"
                );
                Arc::new(Mutex::new(SessionEntry::new()))
            })
            .clone()
    }

    /// Lock a session for writing. An expired session is cleared first.
    async fn lock_for_write(&self, session_id: &str) -> OwnedMutexGuard<SessionEntry> {
        let mut entry = self.entry_or_insert(session_id).await.lock_owned().await;
        if entry.is_expired(self.ttl) {
            entry.attributes.clear();
        }
        entry.touch();
        entry
    }

    #[cfg(test)]
    async fn backdate(&self, session_id: &str, secs: i64) {
        if let Some(entry) = self.entry(session_id).await {
            let mut entry = entry.lock().await;
            entry.last_access = entry.last_access - Duration::seconds(secs);
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, name: Attribute) -> Option<AttributeValue> {
        let entry = self.entry(session_id).await?;
        let mut entry = entry.lock().await;
        if entry.is_expired(self.ttl) {
            return None;
        }
        entry.touch();
        entry.attributes.get(&name).cloned()
    }

    async fn set(&self, session_id: &str, name: Attribute, value: AttributeValue) {
        let mut entry = self.lock_for_write(session_id).await;
        entry.attributes.insert(name, value);
    }

    async fn append_history(&self, session_id: &str, message: String) -> Vec<String> {
        let mut entry = self.lock_for_write(session_id).await;
        entry.update_history(|history| {
            history.push(message);
            history.clone()
        })
    }

    async fn seed_history(&self, session_id: &str, opening: String) -> Vec<String> {
        let mut entry = self.lock_for_write(session_id).await;
        let seeded = entry.attributes.contains_key(&Attribute::ChatHistory);
        entry.update_history(|history| {
            if !seeded {
                history.push(opening);
            }
            history.clone()
        })
    }

    async fn remove_history_entry(&self, session_id: &str, index: usize, message: &str) -> bool {
        let Some(entry) = self.entry(session_id).await else {
            return false;
        };
        let mut entry = entry.lock().await;
        if entry.is_expired(self.ttl) || !entry.attributes.contains_key(&Attribute::ChatHistory) {
            return false;
        }
        entry.touch();
        entry.update_history(|history| {
            let end = index.saturating_add(1).min(history.len());
            match history[..end].iter().rposition(|m| m == message) {
                Some(position) => {
                    history.remove(position);
                    true
                }
                None => false,
            }
        })
    }

    async fn contains(&self, session_id: &str) -> bool {
        match self.entry(session_id).await {
            Some(entry) => !entry.lock().await.is_expired(self.ttl),
            None => false,
        }
    }

    async fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let mut expired = Vec::new();
        for (id, entry) in sessions.iter() {
            // A locked entry is in use by a request, so it is not idle.
            if let Ok(entry) = entry.try_lock() {
                if entry.is_expired(self.ttl) {
                    expired.push(id.clone());
                }
            }
        }
        for id in &expired {
            sessions.remove(id);
        }
        expired.len()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Run [`SessionStore::purge_expired`] every `interval_secs` until the task is dropped.
pub fn spawn_purge_task(
    store: Arc<dyn SessionStore>,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                tracing::info!(removed, "Purged idle sessions");
            }
        }
    })
}
