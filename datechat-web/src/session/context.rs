//! Request-scoped view of one user's session.

use super::store::{Attribute, AttributeValue, SessionStore};
use crate::goal::ChatGoal;
use std::sync::Arc;

/// Binds the cookie-derived session id of one request to the store.
///
/// The id is created lazily on the first write; [`issued_id`](Self::issued_id)
/// then reports it so the response can carry a new cookie. A cookie naming a
/// session the store does not hold is never adopted as a new session id.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    session_id: Option<String>,
    issued: bool,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>, cookie_value: Option<String>) -> Self {
        Self {
            store,
            session_id: cookie_value,
            issued: false,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Id created during this request, if any.
    pub fn issued_id(&self) -> Option<&str> {
        if self.issued {
            self.session_id.as_deref()
        } else {
            None
        }
    }

    pub async fn get(&self, name: Attribute) -> Option<AttributeValue> {
        let id = self.session_id.as_deref()?;
        self.store.get(id, name).await
    }

    pub async fn set(&mut self, name: Attribute, value: AttributeValue) {
        let id = self.writable_id().await;
        self.store.set(&id, name, value).await;
    }

    async fn writable_id(&mut self) -> String {
        match self.session_id.clone() {
            Some(id) if self.issued || self.store.contains(&id).await => id,
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                self.session_id = Some(id.clone());
                self.issued = true;
                id
            }
        }
    }

    /// Forget the whole session. Returns whether anything was stored.
    pub async fn clear(&mut self) -> bool {
        match self.session_id.take() {
            Some(id) => self.store.remove(&id).await,
            None => false,
        }
    }

    pub async fn api_key(&self) -> Option<String> {
        match self.get(Attribute::ApiKey).await {
            Some(AttributeValue::Text(key)) => Some(key),
            _ => None,
        }
    }

    pub async fn set_api_key(&mut self, key: String) {
        self.set(Attribute::ApiKey, AttributeValue::Text(key)).await;
    }

    pub async fn chat_goal(&self) -> Option<ChatGoal> {
        match self.get(Attribute::ChatGoal).await {
            Some(AttributeValue::Goal(goal)) => Some(goal),
            _ => None,
        }
    }

    pub async fn set_chat_goal(&mut self, goal: ChatGoal) {
        self.set(Attribute::ChatGoal, AttributeValue::Goal(goal)).await;
    }

    pub async fn chat_history(&self) -> Option<Vec<String>> {
        match self.get(Attribute::ChatHistory).await {
            Some(AttributeValue::History(history)) => Some(history),
            _ => None,
        }
    }

    /// Append one message and return the updated history.
    pub async fn push_message(&mut self, message: String) -> Vec<String> {
        let id = self.writable_id().await;
        self.store.append_history(&id, message).await
    }

    /// History, started with `opening` if none exists yet.
    pub async fn seed_history(&mut self, opening: String) -> Vec<String> {
        let id = self.writable_id().await;
        self.store.seed_history(&id, opening).await
    }

    /// Take back a message this request pushed at `index`.
    pub async fn remove_message(&self, index: usize, message: &str) -> bool {
        match self.session_id.as_deref() {
            Some(id) => self.store.remove_history_entry(id, index, message).await,
            None => false,
        }
    }
}
