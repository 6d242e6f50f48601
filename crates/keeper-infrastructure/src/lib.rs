//! Infrastructure layer for Keeper.
//!
//! Durable store implementations, platform paths, and the persistence
//! gateway that keeps the in-memory store and durable storage consistent.

pub mod file_store;
pub mod gateway;
pub mod memory_store;
pub mod paths;

pub use file_store::FileDurableStore;
pub use gateway::PersistenceGateway;
pub use memory_store::InMemoryDurableStore;
pub use paths::KeeperPaths;
