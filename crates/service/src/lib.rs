//! Session store service layer.
//! - Defines the backend-independent [`session::SessionStore`] contract.
//! - Provides in-memory, JSON file and SeaORM backends selected at construction time.
//! - Ships the expiry sweeper that an owning process runs on a fixed cadence.

pub mod session;
#[cfg(test)]
pub mod test_support;

pub use session::{
    ExpirySweeper, InMemorySessionStore, JsonFileSessionStore, ReplaceStrategy, SeaOrmSessionStore,
    SessionRecord, SessionStore, SessionStoreError, SweepConfig,
};
