//! The combined application state tree.

use serde::{Deserialize, Serialize};

use crate::record::RecordList;
use crate::session::Session;

/// The single authoritative state tree owned by the [`Store`](crate::store::Store).
///
/// Values handed out by `Store::get_state` are owned snapshots; mutating a
/// snapshot never affects the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Authentication state.
    pub session: Session,
    /// The mutable record list.
    pub records: RecordList,
}

impl AppState {
    /// The initial state at process start: logged out, empty list.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AppState::new();
        assert!(!state.session.is_authenticated);
        assert!(state.session.user.is_none());
        assert!(state.records.is_empty());
    }
}
