//! The public action vocabulary.
//!
//! These five actions are the complete external mutation surface of the
//! store. Hydration is deliberately absent: it belongs to the bootstrap
//! protocol and is only reachable through [`Store::hydrate`](crate::store::Store::hydrate).

use serde::{Deserialize, Serialize};

use crate::session::Profile;

/// An externally dispatchable action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A login that already succeeded upstream; the profile is stored as a
    /// fact. The profile must not be JSON `null`.
    Login { profile: Profile },
    /// Clear the session. Idempotent.
    Logout,
    /// Append a record with a caller-supplied unique id.
    Add { id: String, text: String },
    /// Replace the text of an existing record.
    Update { id: String, text: String },
    /// Remove a record; a no-op when the id is absent.
    Delete { id: String },
}
