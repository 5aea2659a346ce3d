//! Session store - persists the logged-in user across runs.

use tracing::{debug, warn};

use super::storage::{LocalStorage, StorageError};
use crate::models::Session;

/// Storage key of the JSON-encoded session.
pub const USER_KEY: &str = "user";
/// Storage key of the bare bearer token.
pub const TOKEN_KEY: &str = "token";

/// Service owning the current [`Session`].
///
/// Reads go straight to storage so every view sees the last write. Entries
/// that fail validation are purged and read as absent.
pub struct SessionStore {
    storage: LocalStorage,
}

impl SessionStore {
    /// Create a session store over the given storage.
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }

    /// Session store backed by throwaway in-memory storage.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(LocalStorage::in_memory()?))
    }

    /// The current session, if a valid one is stored.
    pub fn get_session(&self) -> Option<Session> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to read session: {}", e);
                None
            }
        }
    }

    /// Whether a session is stored.
    pub fn is_authenticated(&self) -> bool {
        self.get_session().is_some()
    }

    /// Persist `session`, replacing any previous one.
    pub fn set_session(&self, session: &Session) -> Result<(), StorageError> {
        let user = serde_json::to_string(session)?;
        self.storage
            .set_items(&[(USER_KEY, user.as_str()), (TOKEN_KEY, session.token.as_str())])?;
        debug!("Stored session for {}", session.email);
        Ok(())
    }

    /// Remove the stored session.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove_items(&[USER_KEY, TOKEN_KEY])?;
        debug!("Cleared session");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(raw) = self.storage.get_item(USER_KEY)? else {
            return Ok(None);
        };
        let token = self.storage.get_item(TOKEN_KEY)?;

        let session = match serde_json::from_str::<Session>(&raw) {
            Ok(s) if s.is_complete() && token.as_deref().map_or(true, |t| t == s.token) => s,
            Ok(_) => return self.purge("stored session is incomplete or inconsistent"),
            Err(e) => return self.purge(&e.to_string()),
        };

        Ok(Some(session))
    }

    fn purge(&self, reason: &str) -> Result<Option<Session>, StorageError> {
        warn!("Discarding malformed stored session: {}", reason);
        self.clear_session()?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str, token: &str) -> Session {
        Session::new(name, format!("{}@example.com", name.to_lowercase()), token).unwrap()
    }

    #[test]
    fn test_empty_store_has_no_session() {
        let store = SessionStore::in_memory().unwrap();
        assert!(store.get_session().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_get_reflects_last_write() {
        let store = SessionStore::in_memory().unwrap();
        let ada = session("Ada", "t1");
        let bob = session("Bob", "t2");

        let steps: Vec<Option<&Session>> =
            vec![Some(&ada), None, Some(&bob), Some(&ada), None, None, Some(&bob)];

        for step in steps {
            match step {
                Some(s) => store.set_session(s).unwrap(),
                None => store.clear_session().unwrap(),
            }
            assert_eq!(store.get_session().as_ref(), step);
        }
    }

    #[test]
    fn test_set_writes_both_entries() {
        let store = SessionStore::in_memory().unwrap();
        store.set_session(&session("Ada", "tok")).unwrap();

        assert_eq!(
            store.storage.get_item(TOKEN_KEY).unwrap().as_deref(),
            Some("tok")
        );
        let user = store.storage.get_item(USER_KEY).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_str(&user).unwrap();
        assert_eq!(stored["name"], "Ada");
        assert_eq!(stored["email"], "ada@example.com");
        assert_eq!(stored["token"], "tok");
    }

    #[test]
    fn test_malformed_json_is_purged() {
        let store = SessionStore::in_memory().unwrap();
        store
            .storage
            .set_items(&[(USER_KEY, "{not json"), (TOKEN_KEY, "tok")])
            .unwrap();

        assert!(store.get_session().is_none());
        assert_eq!(store.storage.get_item(USER_KEY).unwrap(), None);
        assert_eq!(store.storage.get_item(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_partial_session_is_purged() {
        let store = SessionStore::in_memory().unwrap();
        store
            .storage
            .set_items(&[(USER_KEY, r#"{"name":"Ada","email":"ada@example.com","token":""}"#)])
            .unwrap();

        assert!(store.get_session().is_none());
        assert_eq!(store.storage.get_item(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_mismatched_token_is_purged() {
        let store = SessionStore::in_memory().unwrap();
        store.set_session(&session("Ada", "tok")).unwrap();
        store.storage.set_items(&[(TOKEN_KEY, "other")]).unwrap();

        assert!(store.get_session().is_none());
    }

    #[test]
    fn test_missing_token_entry_is_tolerated() {
        let store = SessionStore::in_memory().unwrap();
        store.set_session(&session("Ada", "tok")).unwrap();
        store.storage.remove_items(&[TOKEN_KEY]).unwrap();

        assert_eq!(store.get_session().map(|s| s.token), Some("tok".to_string()));
    }
}
