//! Storage trait for opaque string blobs keyed by name

use siwa_types::AuthResult;

/// Get/put/remove a single opaque string blob under a namespaced key.
///
/// Implementations must keep the backing storage private to the application
/// (not world-readable). A `put` must be visible to subsequent `get` calls
/// within the same process; no cross-key transactional guarantees.
pub trait StateStore: Send + Sync {
    /// Read the blob stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Remove the blob stored under `key`. Removing an absent key is not an
    /// error.
    fn remove(&self, key: &str) -> AuthResult<()>;
}
