//! Pure state transitions for the record list.

use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, Result};
use crate::record::model::{Record, RecordList};

/// Actions the record reducer responds to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordAction {
    /// Append a new record. Fails with `DuplicateId` if the id is taken.
    Add { id: String, text: String },
    /// Replace the text of an existing record in place. Fails with
    /// `NotFound` if the id is absent.
    Update { id: String, text: String },
    /// Remove a record. A no-op when the id is absent, so retries are safe.
    Delete { id: String },
}

/// Computes the next record list.
///
/// Domain errors leave the prior list untouched and are surfaced to the
/// dispatching caller. The relative order of untouched entries is preserved
/// by every operation.
pub fn reduce(state: &RecordList, action: &RecordAction) -> Result<RecordList> {
    match action {
        RecordAction::Add { id, text } => {
            if state.contains(id) {
                return Err(KeeperError::duplicate_id(id));
            }
            let mut next = state.clone();
            next.push(Record::new(id, text));
            Ok(next)
        }
        RecordAction::Update { id, text } => {
            if !state.contains(id) {
                return Err(KeeperError::not_found("record", id));
            }
            let mut next = state.clone();
            for record in next.entries_mut() {
                if &record.id == id {
                    record.text = text.clone();
                    break;
                }
            }
            Ok(next)
        }
        RecordAction::Delete { id } => {
            let mut next = state.clone();
            next.entries_mut().retain(|r| &r.id != id);
            Ok(next)
        }
    }
}
