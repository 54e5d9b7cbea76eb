//! Deduplicated record set

use crate::types::{JsonValue, RecordId};
use std::collections::HashMap;

/// Records keyed by identifier, each identifier at most once
///
/// Iteration follows the order in which identifiers first arrived. That
/// order is an artifact of scheduling; callers must not depend on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    records: HashMap<RecordId, JsonValue>,
    order: Vec<RecordId>,
}

impl ResultSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record; returns `true` when the id is new
    pub fn insert(&mut self, id: RecordId, record: JsonValue) -> bool {
        if self.records.insert(id.clone(), record).is_some() {
            return false;
        }
        self.order.push(id);
        true
    }

    /// Number of unique records
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Check if an id is present
    pub fn contains(&self, id: &RecordId) -> bool {
        self.records.contains_key(id)
    }

    /// Look up a record
    pub fn get(&self, id: &RecordId) -> Option<&JsonValue> {
        self.records.get(id)
    }

    /// Iterate over `(id, record)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &JsonValue)> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id).map(|record| (id, record)))
    }

    /// Iterate over records
    pub fn records(&self) -> impl Iterator<Item = &JsonValue> {
        self.iter().map(|(_, record)| record)
    }

    /// Consume the set into its records
    pub fn into_records(mut self) -> Vec<JsonValue> {
        self.order
            .iter()
            .filter_map(|id| self.records.remove(id))
            .collect()
    }
}

impl FromIterator<(RecordId, JsonValue)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (RecordId, JsonValue)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, record) in iter {
            set.insert(id, record);
        }
        set
    }
}
