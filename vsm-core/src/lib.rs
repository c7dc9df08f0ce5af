//! VSM Progression Engine
//!
//! Platform-agnostic core logic for the VSM Link self-tracking widget.
//! Six life domains gain experience and level up through protocol actions,
//! while a shared load meter tracks accumulated strain. This crate provides
//! the rule catalog, the progression state machine and the persistence
//! contract, without any rendering or platform-specific dependencies.

pub mod catalog;
pub mod constants;
pub mod duress;
pub mod error;
pub mod load;
pub mod log_ring;
pub mod persistence;
pub mod progression;
pub mod stats;
pub mod storage;

// Re-export commonly used types
pub use catalog::{Catalog, EmergenceEntry, LoadImpact, Perk, ProtocolAction};
pub use duress::DuressMode;
pub use error::{CatalogError, EngineError, PersistError, StateUnreadable, UnknownCategory};
pub use load::{LoadStatus, SystemLoad};
pub use log_ring::LogRing;
pub use persistence::{PersistenceAdapter, Snapshot, SnapshotOrigin, decode_load, decode_stats};
pub use progression::{LevelUpEvent, ProgressionStore, ProtocolOutcome, StorePhase};
pub use stats::{CategoryId, StatRecord, StatSheet};
pub use storage::{FileStore, MemoryStore};

/// Trait for abstracting the local key-value byte store.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the bytes stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A missing key is `Ok(None)`.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn write(&self, key: &str, value: &[u8]) -> Result<(), Self::Error>;

    /// Delete `key`; deleting a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}
