use std::collections::HashMap;

use crate::{
    domain::{DocumentReference, Table},
    storage::{DocumentParser, ParseError},
};

/// A filesystem-agnostic set of documents.
///
/// Useful for exercising the traversal engine without writing files.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: HashMap<DocumentReference, Table>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, keyed by its own reference.
    ///
    /// Returns the table previously stored under that reference, if any.
    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.reference().clone(), table)
    }
}

impl FromIterator<Table> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut store = Self::new();
        for table in iter {
            store.insert(table);
        }
        store
    }
}

impl DocumentParser for MemoryStore {
    fn parse(&self, reference: &DocumentReference) -> Result<Table, ParseError> {
        self.tables
            .get(reference)
            .cloned()
            .ok_or_else(|| ParseError::NotFound(reference.clone()))
    }
}
