use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::identity::IdentityClaims;

/// Session key holding the signed-in user's ID token claims
pub const USER_KEY: &str = "user";

/// Authentication state derived from a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

/// Per-browser key/value session carried in the encrypted session cookie.
///
/// The presence of [`USER_KEY`] is the only authentication signal; other
/// keys never affect [`Session::state`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    entries: BTreeMap<String, Value>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claims stored by a successful sign-in
    #[must_use]
    pub fn user(&self) -> Option<&Value> {
        self.get(USER_KEY)
    }

    pub fn set_user(&mut self, claims: IdentityClaims) {
        self.insert(USER_KEY, Value::Object(claims));
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.contains_key(USER_KEY) {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }
}
