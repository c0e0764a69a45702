//! Durable-store port for encoded trees.
//!
//! This module defines the trait boundary between session handling and
//! whatever keeps finished trees around.

use crate::{
    Result,
    identifiers::{SessionId, StorageRef},
};

/// Port for persisting and retrieving encoded move trees.
///
/// Blobs are opaque to the store; the codec owns their format.
///
/// # Examples
///
/// ```
/// use movetree::adapters::InMemoryStore;
/// use movetree::identifiers::SessionId;
/// use movetree::ports::TreeStore;
///
/// let store = InMemoryStore::new();
/// let reference = store.put(&SessionId::new("s1"), "{\"nodes\":{}}")?;
/// assert_eq!(store.get(&reference)?, "{\"nodes\":{}}");
/// # Ok::<(), movetree::Error>(())
/// ```
pub trait TreeStore {
    /// Persist `blob` for `session` and return a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn put(&self, session: &SessionId, blob: &str) -> Result<StorageRef>;

    /// Retrieve the blob stored under `reference`.
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing is stored under the reference; other errors if
    /// the stored data cannot be read back.
    fn get(&self, reference: &StorageRef) -> Result<String>;
}
