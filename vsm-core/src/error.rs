//! Error taxonomy for the progression engine.
use thiserror::Error;

use crate::stats::CategoryId;

/// Boxed backend error, so storage implementations keep their own error types.
pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A category name outside the closed set of six.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

/// Persisted bytes that could not be turned into a usable snapshot.
///
/// Always recovered by [`crate::ProgressionStore::initialize`], which falls back
/// to the default snapshot.
#[derive(Debug, Error)]
pub enum StateUnreadable {
    #[error("backing store read failed for {key}: {source}")]
    Backend {
        key: &'static str,
        #[source]
        source: BackendError,
    },
    #[error("stats entry is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stats entry is not a JSON object")]
    NotAnObject,
    #[error("stats entry mixes legacy and current encodings")]
    MixedEncoding,
    #[error("stats entry for {category} is neither a record nor an integer")]
    UnsupportedValue { category: CategoryId },
    #[error("stats entry for {category} is out of range: {detail}")]
    OutOfRange {
        category: CategoryId,
        detail: String,
    },
}

/// Failure writing the durable fields.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("backing store rejected write to {key}: {source}")]
    Backend {
        key: &'static str,
        #[source]
        source: BackendError,
    },
}

/// Problems found while loading or validating a protocol catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    #[error("{0} has no protocols")]
    EmptyProtocols(CategoryId),
    #[error("protocol {name:?} in {category} grants no xp")]
    ZeroXp { category: CategoryId, name: String },
    #[error(
        "protocol {name:?} in {category} grants {xp_gain} xp, which can exceed one level under duress"
    )]
    XpTooLarge {
        category: CategoryId,
        name: String,
        xp_gain: u32,
    },
    #[error("emergence entry for {category} targets level {level}; unlocks start at level 2")]
    EmergenceLevelTooLow { category: CategoryId, level: u32 },
    #[error("duplicate emergence entry for {category} level {level}")]
    DuplicateEmergence { category: CategoryId, level: u32 },
}

/// Umbrella error for store operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("{category} has no protocol named {name:?}")]
    UnknownProtocol { category: CategoryId, name: String },
    #[error(
        "protocol {name:?} would apply {applied_xp} xp to {category}, more than one level at once"
    )]
    XpOverflow {
        category: CategoryId,
        name: String,
        applied_xp: u32,
    },
}
