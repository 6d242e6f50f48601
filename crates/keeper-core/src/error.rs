//! Error types for the Keeper state container.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Keeper workspace.
///
/// This provides typed, structured error variants so callers can distinguish
/// boundary validation failures, record-domain errors, and persistence faults.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum KeeperError {
    /// Malformed action payload, rejected at the dispatch boundary.
    /// State is unchanged.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record with this id already exists in the list.
    #[error("Duplicate record id: '{id}'")]
    DuplicateId { id: String },

    /// Entity not found error with type information.
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Hydration was attempted after the store already became ready.
    /// The ready transition happens exactly once per process lifetime.
    #[error("Store is already hydrated")]
    AlreadyHydrated,

    /// Durable store call failed (report-only at the gateway boundary).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// IO error (file system operations).
    #[error("IO error: {0}")]
    Io(String),
}

impl KeeperError {
    /// Creates a Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a DuplicateId error.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Creates a NotFound error.
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Creates a Serialization error for a JSON payload.
    pub fn json(message: impl Into<String>) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: message.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a DuplicateId error.
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }

    /// Check if this is a Validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Persistence error.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// A specialized Result type for Keeper operations.
pub type Result<T> = std::result::Result<T, KeeperError>;
