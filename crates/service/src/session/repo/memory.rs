use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::StoredSession;
use crate::session::domain::{decode_payload, encode_payload, stored_expiration, SessionRecord};
use crate::session::errors::SessionStoreError;
use crate::session::store::SessionStore;

/// Process-local session store backed by a map.
///
/// Payloads are kept encoded, so a record handed to `set` is never aliased by
/// the store and decode failures surface exactly as they would from a database.
///
/// # Examples
/// ```
/// use service::session::{InMemorySessionStore, SessionRecord, SessionStore};
/// let store = InMemorySessionStore::<String>::new();
/// let rec = SessionRecord::with_ttl("a", std::time::Duration::from_secs(60), "benny".to_string());
/// tokio_test::block_on(store.set(&rec)).unwrap();
/// let got = tokio_test::block_on(store.try_get("a")).unwrap();
/// assert_eq!(got.map(|r| r.payload), Some("benny".to_string()));
/// ```
pub struct InMemorySessionStore<P> {
    entries: RwLock<HashMap<String, StoredSession>>,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Default for InMemorySessionStore<P> {
    fn default() -> Self {
        Self { entries: RwLock::new(HashMap::new()), _payload: PhantomData }
    }
}

impl<P> InMemorySessionStore<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl<P> SessionStore<P> for InMemorySessionStore<P>
where
    P: Serialize + DeserializeOwned + Send + Sync,
{
    async fn try_get(&self, id: &str) -> Result<Option<SessionRecord<P>>, SessionStoreError> {
        let stored = self.entries.read().await.get(id).cloned();
        match stored {
            Some(s) => Ok(Some(SessionRecord::new(id, s.expiration, decode_payload(s.payload)?))),
            None => Ok(None),
        }
    }

    async fn try_remove(&self, id: &str) -> Result<bool, SessionStoreError> {
        let existed = self.entries.write().await.remove(id).is_some();
        debug!(session_id = %id, existed, "session_removed");
        Ok(existed)
    }

    async fn set(&self, record: &SessionRecord<P>) -> Result<(), SessionStoreError> {
        let stored = StoredSession { expiration: stored_expiration(record.expiration), payload: encode_payload(&record.payload)? };
        self.entries.write().await.insert(record.id.clone(), stored);
        debug!(session_id = %record.id, "session_set");
        Ok(())
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut map = self.entries.write().await;
        let before = map.len();
        map.retain(|_, s| s.expiration > now);
        Ok((before - map.len()) as u64)
    }
}
