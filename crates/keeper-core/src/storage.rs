//! Durable key-value store trait.
//!
//! The durable store is an external collaborator: an opaque asynchronous
//! get/set/remove API with no atomicity or cross-key ordering guarantees.
//! Implementations live in `keeper-infrastructure`.

use async_trait::async_trait;

use crate::error::Result;

/// Asynchronous durable key-value storage.
///
/// Calls may suspend; they are the only suspension points in the system.
/// Failures surface as [`KeeperError::Persistence`](crate::error::KeeperError)
/// and are treated as report-only by the persistence gateway, never fatal to
/// the in-memory store.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Reads the bytes stored under `key`, or `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `bytes` under `key`, replacing any previous value.
    async fn set(&self, key: &str, bytes: Vec<u8>) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// The well-known logical key holding the serialized session profile.
///
/// Only the profile is persisted; the authenticated flag is derived on load.
/// Absence of the key means logged out.
pub const SESSION_KEY: &str = "user";
