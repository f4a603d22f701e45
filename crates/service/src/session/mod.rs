//! Session module: record type, store contract, backends and the expiry sweeper.
//!
//! The middleware that owns sessions talks only to [`SessionStore`]; which
//! backend sits behind it is decided when the store is constructed.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod store;
pub mod sweeper;

pub use domain::SessionRecord;
pub use errors::SessionStoreError;
pub use repo::json_file::JsonFileSessionStore;
pub use repo::memory::InMemorySessionStore;
pub use repo::seaorm::{ReplaceStrategy, SeaOrmSessionStore};
pub use store::SessionStore;
pub use sweeper::{sweep_once, ExpirySweeper, SweepConfig, MIN_SWEEP_INTERVAL};
