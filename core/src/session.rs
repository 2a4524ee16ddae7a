//! Access to the signed-in user's identity.
//!
//! The host owns persistence; the core only needs a string key-value store
//! it can read the current user id from and write login results into.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ApiError;
use crate::types::LoginData;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USER_ID_KEY: &str = "user_id";
pub const USERNAME_KEY: &str = "username";
pub const EMAIL_KEY: &str = "email";

const SESSION_KEYS: [&str; 4] = [ACCESS_TOKEN_KEY, USER_ID_KEY, USERNAME_KEY, EMAIL_KEY];

pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<T: SessionStore + ?Sized> SessionStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// Process-local store, for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        // A poisoned lock still holds consistent string pairs.
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }
}

/// Typed view over a [`SessionStore`].
#[derive(Debug)]
pub struct Session<S> {
    store: S,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The signed-in user's id. Missing or non-numeric ids are an
    /// `InvalidRequest`, since no user-scoped call can be built without one.
    pub fn user_id(&self) -> Result<u64, ApiError> {
        let raw = self
            .store
            .get(USER_ID_KEY)
            .ok_or_else(|| ApiError::InvalidRequest("no user is signed in".to_string()))?;
        raw.parse()
            .map_err(|_| ApiError::InvalidRequest(format!("stored user id {raw:?} is not numeric")))
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY)
    }

    pub fn username(&self) -> Option<String> {
        self.store.get(USERNAME_KEY)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id().is_ok() && self.access_token().is_some()
    }

    pub fn remember(&self, login: &LoginData) {
        self.store.set(ACCESS_TOKEN_KEY, &login.access_token);
        self.store.set(USER_ID_KEY, &login.user_id.to_string());
        self.store.set(USERNAME_KEY, &login.username);
        self.store.set(EMAIL_KEY, &login.email);
    }

    pub fn clear(&self) {
        for key in SESSION_KEYS {
            self.store.remove(key);
        }
    }
}
