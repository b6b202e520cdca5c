//! In-memory collection reconciliation.

use crate::models::{Attendance, Member};

/// A record with a stable identity.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Member {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Attendance {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Merge a mutation result: replace the row with the same id, otherwise prepend it.
pub fn reconcile<T: Keyed>(mut collection: Vec<T>, record: T) -> Vec<T> {
    match collection.iter().position(|item| item.key() == record.key()) {
        Some(index) => collection[index] = record,
        None => collection.insert(0, record),
    }
    collection
}

/// Drop the row with `id`, if present.
pub fn remove<T: Keyed>(mut collection: Vec<T>, id: &str) -> Vec<T> {
    collection.retain(|item| item.key() != id);
    collection
}
