//! Request-scoped wrapper for a submitted API key.

/// A user-submitted credential awaiting validation.
#[derive(Debug, Clone)]
pub struct ApiKey {
    value: String,
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl ApiKey {
    pub fn new(raw: &str) -> Self {
        Self {
            value: raw.trim().to_string(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn into_value(self) -> String {
        self.value
    }

    /// Returns `field: message` violations; empty when the key is acceptable.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.value.is_empty() {
            violations.push("key: must not be blank".to_string());
        } else if !self.value.chars().all(is_key_char) {
            violations.push("key: must only contain letters, digits, '-' or '_'".to_string());
        }

        violations
    }
}
