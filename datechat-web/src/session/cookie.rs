//! Session cookie parsing and formatting.

use axum::http::header::{HeaderMap, HeaderValue, COOKIE};

/// Cookie settings used when issuing a session id.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub max_age_secs: u64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: "SESSION".to_string(),
            max_age_secs: 86_400,
        }
    }
}

impl CookieSettings {
    /// Find this cookie's value among all `Cookie` headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    }

    /// `Set-Cookie` value that stores `session_id` for the configured lifetime.
    pub fn issue(&self, session_id: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.name, session_id, self.max_age_secs
        ))
        .ok()
    }

    /// `Set-Cookie` value that makes the browser drop the cookie.
    pub fn expire(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{}=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax",
            self.name
        ))
        .ok()
    }
}
