//! Record domain model.

use serde::{Deserialize, Serialize};

/// A single record in the list.
///
/// The `id` is caller-supplied and must be unique within the list; the core
/// never generates ids internally (see [`IdGenerator`](crate::idgen::IdGenerator)
/// for the injectable generator callers are expected to use).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Caller-supplied unique identifier.
    pub id: String,
    /// Free-form text content.
    pub text: String,
}

impl Record {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Ordered list of records, insertion order preserved.
///
/// Invariant: no two entries share an `id`. The invariant is maintained by
/// the record reducer, which is the only code that produces new lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordList(Vec<Record>);

impl RecordList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the record with the given id, if present.
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.0.iter().find(|r| r.id == id)
    }

    /// True if a record with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.0.push(record);
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Record> {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let list = RecordList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(!list.contains("1"));
    }

    #[test]
    fn test_get_finds_by_id() {
        let mut list = RecordList::new();
        list.push(Record::new("1", "buy milk"));
        list.push(Record::new("2", "walk dog"));

        assert_eq!(list.get("2").map(|r| r.text.as_str()), Some("walk dog"));
        assert!(list.get("3").is_none());
    }
}
