pub mod json_file;
pub mod memory;
pub mod seaorm;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Encoded form kept by the map-based backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoredSession {
    pub expiration: DateTime<Utc>,
    pub payload: serde_json::Value,
}
