use thiserror::Error;

/// Failures a session store reports to its caller.
///
/// A missing session is not an error: lookups return `Ok(None)` and removals
/// `Ok(false)`. Nothing here is retried by the store.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("session payload serialization failed: {0}")]
    Serialization(String),
}

impl SessionStoreError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SessionStoreError::StorageUnavailable(_) => 1300,
            SessionStoreError::Serialization(_) => 1301,
        }
    }
}

impl From<models::errors::ModelError> for SessionStoreError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Db(msg) => Self::StorageUnavailable(msg),
        }
    }
}

impl From<sea_orm::DbErr> for SessionStoreError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::StorageUnavailable(e.to_string())
    }
}

impl From<serde_json::Error> for SessionStoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
