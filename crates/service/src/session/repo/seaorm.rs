use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::session::domain::{decode_payload, encode_payload, stored_expiration, SessionRecord};
use crate::session::errors::SessionStoreError;
use crate::session::store::SessionStore;

/// How [`SeaOrmSessionStore::set`] replaces an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    /// `INSERT .. ON CONFLICT (id) DO UPDATE`
    #[default]
    Upsert,
    /// Lookup, delete, insert inside one transaction.
    DeleteInsert,
}

/// Session store over a SeaORM connection pool (PostgreSQL or SQLite).
///
/// Every operation checks a connection out of the pool for the duration of
/// the call. Mutations run in their own transaction, committed before
/// returning; on any error the transaction is dropped and rolled back.
pub struct SeaOrmSessionStore<P> {
    db: DatabaseConnection,
    strategy: ReplaceStrategy,
    _payload: PhantomData<fn() -> P>,
}

impl<P> SeaOrmSessionStore<P> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, strategy: ReplaceStrategy::default(), _payload: PhantomData }
    }

    pub fn with_strategy(mut self, strategy: ReplaceStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> ReplaceStrategy {
        self.strategy
    }
}

#[async_trait]
impl<P> SessionStore<P> for SeaOrmSessionStore<P>
where
    P: Serialize + DeserializeOwned + Send + Sync,
{
    #[instrument(level = "debug", skip(self))]
    async fn try_get(&self, id: &str) -> Result<Option<SessionRecord<P>>, SessionStoreError> {
        let Some(row) = models::session::find(&self.db, id).await? else {
            return Ok(None);
        };
        let payload = decode_payload(row.payload)?;
        Ok(Some(SessionRecord::new(row.id, row.expiration, payload)))
    }

    #[instrument(level = "debug", skip(self))]
    async fn try_remove(&self, id: &str) -> Result<bool, SessionStoreError> {
        let txn = self.db.begin().await?;
        let existed = models::session::delete(&txn, id).await?;
        txn.commit().await?;
        debug!(existed, "session_removed");
        Ok(existed)
    }

    #[instrument(level = "debug", skip(self, record), fields(session_id = %record.id))]
    async fn set(&self, record: &SessionRecord<P>) -> Result<(), SessionStoreError> {
        // encode before touching the pool so a bad payload costs no connection
        let payload = encode_payload(&record.payload)?;
        let expiration = stored_expiration(record.expiration);
        let txn = self.db.begin().await?;
        match self.strategy {
            ReplaceStrategy::Upsert => {
                models::session::upsert(&txn, &record.id, expiration, payload).await?
            }
            ReplaceStrategy::DeleteInsert => {
                models::session::replace(&txn, &record.id, expiration, payload).await?
            }
        }
        txn.commit().await?;
        debug!(strategy = ?self.strategy, "session_set");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn remove_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let txn = self.db.begin().await?;
        let removed = models::session::delete_expired(&txn, now).await?;
        txn.commit().await?;
        Ok(removed)
    }
}
