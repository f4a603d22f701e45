use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::SessionRecord;
use super::errors::SessionStoreError;

/// Storage contract every session backend implements.
///
/// Each call is self-contained: a backend acquires whatever connection or lock
/// it needs for the duration of the call and releases it before returning, on
/// success and on failure. Calls on different ids may run concurrently. Calls
/// racing on the same id resolve at the backend's isolation level (last write
/// observed wins) without ever leaving two records for one id.
///
/// Expired records are still returned by [`try_get`](Self::try_get) until a
/// sweep removes them; callers that care compare against
/// [`SessionRecord::is_expired_at`].
#[async_trait]
pub trait SessionStore<P: Send + Sync>: Send + Sync {
    /// Exact-id lookup. A missing id is `Ok(None)`.
    async fn try_get(&self, id: &str) -> Result<Option<SessionRecord<P>>, SessionStoreError>;

    /// Remove the record for `id`; returns whether one existed.
    async fn try_remove(&self, id: &str) -> Result<bool, SessionStoreError>;

    /// Insert `record`, atomically replacing any record with the same id.
    async fn set(&self, record: &SessionRecord<P>) -> Result<(), SessionStoreError>;

    /// Bulk delete every record with `expiration <= now`; returns how many were removed.
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;
}
