use std::{collections::HashMap, io::ErrorKind, marker::PhantomData, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, warn};

use super::StoredSession;
use crate::session::domain::{decode_payload, encode_payload, stored_expiration, SessionRecord};
use crate::session::errors::SessionStoreError;
use crate::session::store::SessionStore;

/// JSON file-backed session store for single-process deployments.
///
/// The whole map lives in memory and is written back on every mutation while
/// the write lock is still held, so replace-and-persist is one observable step.
/// If the write-back fails the in-memory map is restored and the error returned.
pub struct JsonFileSessionStore<P> {
    inner: RwLock<HashMap<String, StoredSession>>,
    file_path: PathBuf,
    _payload: PhantomData<fn() -> P>,
}

fn io_err(e: std::io::Error) -> SessionStoreError {
    SessionStoreError::StorageUnavailable(e.to_string())
}

impl<P> JsonFileSessionStore<P> {
    /// Initialize the store from a path. Creates the file with an empty map if missing.
    /// A file that exists but cannot be parsed is an error, never silently emptied.
    pub async fn new<T: Into<PathBuf>>(path: T) -> Result<Arc<Self>, SessionStoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let map: HashMap<String, StoredSession> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let empty = HashMap::new();
                write_map(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(io_err(e)),
        };
        debug!(path = %file_path.display(), sessions = map.len(), "json session store loaded");

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path, _payload: PhantomData }))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Write to a sibling temp file and rename over the target so readers never
/// see a half-written map.
async fn write_map(path: &PathBuf, map: &HashMap<String, StoredSession>) -> Result<(), SessionStoreError> {
    let data = serde_json::to_vec(map)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).await.map_err(io_err)?;
    fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

#[async_trait]
impl<P> SessionStore<P> for JsonFileSessionStore<P>
where
    P: Serialize + DeserializeOwned + Send + Sync,
{
    async fn try_get(&self, id: &str) -> Result<Option<SessionRecord<P>>, SessionStoreError> {
        let stored = self.inner.read().await.get(id).cloned();
        match stored {
            Some(s) => Ok(Some(SessionRecord::new(id, s.expiration, decode_payload(s.payload)?))),
            None => Ok(None),
        }
    }

    async fn try_remove(&self, id: &str) -> Result<bool, SessionStoreError> {
        let mut map = self.inner.write().await;
        let Some(prev) = map.remove(id) else {
            return Ok(false);
        };
        if let Err(e) = write_map(&self.file_path, &map).await {
            map.insert(id.to_string(), prev);
            warn!(session_id = %id, error = %e, "session remove not persisted");
            return Err(e);
        }
        debug!(session_id = %id, "session_removed");
        Ok(true)
    }

    async fn set(&self, record: &SessionRecord<P>) -> Result<(), SessionStoreError> {
        let stored = StoredSession { expiration: stored_expiration(record.expiration), payload: encode_payload(&record.payload)? };
        let mut map = self.inner.write().await;
        let prev = map.insert(record.id.clone(), stored);
        if let Err(e) = write_map(&self.file_path, &map).await {
            match prev {
                Some(p) => map.insert(record.id.clone(), p),
                None => map.remove(&record.id),
            };
            warn!(session_id = %record.id, error = %e, "session set not persisted");
            return Err(e);
        }
        debug!(session_id = %record.id, "session_set");
        Ok(())
    }

    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut map = self.inner.write().await;
        let expired: Vec<String> = map
            .iter()
            .filter(|(_, s)| s.expiration <= now)
            .map(|(id, _)| id.clone())
            .collect();
        if expired.is_empty() {
            return Ok(0);
        }
        let removed: Vec<(String, StoredSession)> = expired
            .into_iter()
            .filter_map(|id| map.remove(&id).map(|s| (id, s)))
            .collect();
        if let Err(e) = write_map(&self.file_path, &map).await {
            map.extend(removed);
            return Err(e);
        }
        Ok(removed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound};
    use serde_json::json;

    fn tmp_path() -> PathBuf {
        std::env::temp_dir().join(format!("json_session_store_{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn json_file_store_persists_across_reload() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        let store = JsonFileSessionStore::<serde_json::Value>::new(&tmp).await?;
        let exp = Utc::now() + Duration::days(5);

        store.set(&SessionRecord::new("a", exp, json!({"user": "benny"}))).await?;
        store.set(&SessionRecord::new("b", exp, json!({"user": "other"}))).await?;
        assert!(store.try_remove("b").await?);

        // reload store from disk to ensure persistence
        let reloaded = JsonFileSessionStore::<serde_json::Value>::new(&tmp).await?;
        assert_eq!(reloaded.len().await, 1);
        let got = reloaded.try_get("a").await?.expect("persisted");
        assert_eq!(got.payload, json!({"user": "benny"}));
        assert_eq!(got.expiration, exp.trunc_subsecs(6));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected() -> Result<(), anyhow::Error> {
        let tmp = tmp_path();
        tokio::fs::write(&tmp, b"{not json").await?;

        let res = JsonFileSessionStore::<serde_json::Value>::new(&tmp).await;
        assert!(matches!(res, Err(SessionStoreError::Serialization(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_back_restores_previous_record() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_session_dir_{}", uuid::Uuid::new_v4()));
        let path = dir.join("sessions.json");
        let store = JsonFileSessionStore::<u32>::new(&path).await?;
        let exp = Utc::now() + Duration::hours(1);
        store.set(&SessionRecord::new("a", exp, 1)).await?;

        // make the write-back fail
        tokio::fs::remove_dir_all(&dir).await?;
        let err = store.set(&SessionRecord::new("a", exp, 2)).await.unwrap_err();
        assert!(matches!(err, SessionStoreError::StorageUnavailable(_)));
        assert_eq!(store.try_get("a").await?.expect("kept").payload, 1);
        Ok(())
    }
}
