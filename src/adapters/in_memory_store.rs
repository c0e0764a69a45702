//! In-memory tree store for testing.
//!
//! This adapter provides a pure in-memory implementation of TreeStore,
//! enabling fast tests without any file system I/O.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result,
    error::Error,
    identifiers::{SessionId, StorageRef},
    ports::TreeStore,
};

#[derive(Default)]
struct Inner {
    blobs: HashMap<StorageRef, (SessionId, String)>,
    next: u64,
}

/// In-memory store for testing.
///
/// Every `put` gets a fresh reference of the form `<session>/<n>`, so saving the
/// same session twice keeps both snapshots.
///
/// # Thread Safety
///
/// This store is thread-safe and can be safely cloned and shared across
/// threads. All clones share the same underlying storage.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the number of blobs currently stored.
    pub fn count(&self) -> usize {
        self.lock().blobs.len()
    }

    /// Clear all stored blobs.
    pub fn clear(&self) {
        self.lock().blobs.clear();
    }

    /// Check if a blob exists under the given reference.
    pub fn contains(&self, reference: &StorageRef) -> bool {
        self.lock().blobs.contains_key(reference)
    }

    /// References stored for one session, oldest first.
    pub fn references_for(&self, session: &SessionId) -> Vec<StorageRef> {
        let inner = self.lock();
        let mut refs: Vec<(u64, StorageRef)> = inner
            .blobs
            .iter()
            .filter(|(_, (owner, _))| owner == session)
            .filter_map(|(reference, _)| {
                let seq = reference.as_str().rsplit('/').next()?.parse().ok()?;
                Some((seq, reference.clone()))
            })
            .collect();
        refs.sort();
        refs.into_iter().map(|(_, reference)| reference).collect()
    }
}

impl TreeStore for InMemoryStore {
    fn put(&self, session: &SessionId, blob: &str) -> Result<StorageRef> {
        let mut inner = self.lock();
        let reference = StorageRef::new(format!("{session}/{}", inner.next));
        inner.next += 1;
        inner
            .blobs
            .insert(reference.clone(), (session.clone(), blob.to_string()));
        tracing::debug!(%session, %reference, bytes = blob.len(), "stored tree in memory");
        Ok(reference)
    }

    fn get(&self, reference: &StorageRef) -> Result<String> {
        self.lock()
            .blobs
            .get(reference)
            .map(|(_, blob)| blob.clone())
            .ok_or_else(|| Error::NotFound {
                id: reference.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_put_and_get() {
        let store = InMemoryStore::new();
        let session = SessionId::new("s1");

        assert_eq!(store.count(), 0);

        let reference = store.put(&session, "blob").unwrap();
        assert_eq!(store.count(), 1);
        assert!(store.contains(&reference));
        assert_eq!(store.get(&reference).unwrap(), "blob");
    }

    #[test]
    fn test_get_unknown_reference_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.get(&StorageRef::new("nope/0"));
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_repeated_puts_keep_every_snapshot() {
        let store = InMemoryStore::new();
        let session = SessionId::new("s1");
        let first = store.put(&session, "one").unwrap();
        let second = store.put(&session, "two").unwrap();
        store.put(&SessionId::new("other"), "three").unwrap();

        assert_ne!(first, second);
        assert_eq!(store.references_for(&session), vec![first, second]);

        store.clear();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_clone_shares_storage() {
        let store1 = InMemoryStore::new();
        let store2 = store1.clone();

        let reference = store1.put(&SessionId::new("shared"), "blob").unwrap();
        assert_eq!(store2.get(&reference).unwrap(), "blob");
        assert_eq!(store2.count(), 1);
    }
}
