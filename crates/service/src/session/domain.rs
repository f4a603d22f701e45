use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::errors::SessionStoreError;

/// A persisted session: caller-assigned id, absolute expiration, opaque payload.
///
/// The store never looks inside `payload`; it is encoded with serde on the way
/// in and decoded on the way out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord<P> {
    pub id: String,
    pub expiration: DateTime<Utc>,
    pub payload: P,
}

impl<P> SessionRecord<P> {
    pub fn new(id: impl Into<String>, expiration: DateTime<Utc>, payload: P) -> Self {
        Self { id: id.into(), expiration: stored_expiration(expiration), payload }
    }

    /// Record expiring `ttl` from now. Saturates at the latest representable instant.
    pub fn with_ttl(id: impl Into<String>, ttl: Duration, payload: P) -> Self {
        let now = Utc::now();
        let expiration = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(id, expiration, payload)
    }

    /// Expired once `now` reaches `expiration`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }
}

/// Truncate to the precision every backend stores.
pub(crate) fn stored_expiration(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(6)
}

pub(crate) fn encode_payload<P: Serialize>(payload: &P) -> Result<serde_json::Value, SessionStoreError> {
    Ok(serde_json::to_value(payload)?)
}

pub(crate) fn decode_payload<P: DeserializeOwned>(value: serde_json::Value) -> Result<P, SessionStoreError> {
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let rec = SessionRecord::new("a", now, ());
        assert!(rec.is_expired_at(now));
        assert!(!rec.is_expired_at(now - chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn with_ttl_sets_future_expiration() {
        let before = Utc::now().trunc_subsecs(6);
        let rec = SessionRecord::with_ttl("a", Duration::from_secs(5 * 24 * 3600), "benny");
        assert!(rec.expiration >= before + chrono::Duration::days(5));
        assert!(!rec.is_expired_at(Utc::now()));
    }

    #[test]
    fn with_ttl_saturates_on_overflow() {
        let rec = SessionRecord::with_ttl("a", Duration::MAX, ());
        assert_eq!(rec.expiration, DateTime::<Utc>::MAX_UTC.trunc_subsecs(6));
    }

    #[test]
    fn expiration_is_held_at_microseconds() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let rec = SessionRecord::new("a", at, ());
        assert_eq!(rec.expiration.timestamp_subsec_nanos(), 123_456_000);

        let ttl = SessionRecord::with_ttl("b", Duration::from_secs(60), ());
        assert_eq!(ttl.expiration.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(stored_expiration(ttl.expiration), ttl.expiration);
    }

    #[test]
    fn encode_rejects_non_string_map_keys() {
        let mut odd = std::collections::HashMap::new();
        odd.insert((1u8, 2u8), 3u8);
        let err = encode_payload(&odd).unwrap_err();
        assert!(matches!(err, SessionStoreError::Serialization(_)));
    }
}
