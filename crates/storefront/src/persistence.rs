//! Durable key-value storage for cart snapshots.
//!
//! The cart is persisted as a single JSON document under
//! [`CART_STORAGE_KEY`]:
//!
//! ```json
//! {"state":{"cart":[{"id":1,"name":"Desk Lamp","price":24.5,"imgUrl":"","quantity":2}]},"version":0}
//! ```
//!
//! Stores only move opaque strings; encoding lives in [`encode_snapshot`]
//! and [`decode_snapshot`].

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use powerlabs_core::Cart;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::runtime::RuntimeFlavor;

/// Key under which the cart snapshot is stored.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Errors raised by snapshot stores and snapshot decoding.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Reading or writing the backing file failed.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON or does not describe a valid cart.
    #[error("snapshot is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    /// The store cannot be used right now.
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}

/// A key-value store holding serialized snapshots.
pub trait SnapshotStore: Send {
    /// Read the value stored under `key`, `None` if nothing was written.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the backing storage cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Durably write `data` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError` if the write did not reach storage.
    fn save(&mut self, key: &str, data: &str) -> Result<(), PersistenceError>;
}

// =============================================================================
// Snapshot Encoding
// =============================================================================

#[derive(Serialize)]
struct SnapshotRef<'a> {
    state: SnapshotStateRef<'a>,
    version: u32,
}

#[derive(Serialize)]
struct SnapshotStateRef<'a> {
    cart: &'a Cart,
}

#[derive(Deserialize)]
struct Snapshot {
    state: SnapshotState,
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotState {
    cart: Cart,
}

/// Serialize a cart into the snapshot document.
///
/// # Errors
///
/// Returns `PersistenceError::Json` if serialization fails.
pub fn encode_snapshot(cart: &Cart) -> Result<String, PersistenceError> {
    let snapshot = SnapshotRef {
        state: SnapshotStateRef { cart },
        version: SNAPSHOT_VERSION,
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Parse a snapshot document back into a cart.
///
/// Cart invariants (unique ids, quantities of at least 1, non-negative
/// prices) are checked while parsing.
///
/// # Errors
///
/// Returns `PersistenceError::Json` for malformed or invalid carts and
/// `PersistenceError::UnsupportedVersion` for other format versions.
pub fn decode_snapshot(data: &str) -> Result<Cart, PersistenceError> {
    let snapshot: Snapshot = serde_json::from_str(data)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(PersistenceError::UnsupportedVersion(snapshot.version));
    }
    Ok(snapshot.state.cart)
}

// =============================================================================
// File Store
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is flushed and then renamed over the
/// target, so a crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the snapshot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), PersistenceError> {
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));

        run_blocking(|| -> Result<(), PersistenceError> {
            fs::create_dir_all(&self.dir)?;
            let mut file = fs::File::create(&tmp)?;
            file.write_all(data.as_bytes())?;
            file.sync_all()?;
            drop(file);

            fs::rename(&tmp, &target)?;
            Ok(())
        })
    }
}

/// Run blocking file I/O, moving other tasks off this worker first when
/// called from a multi-threaded runtime.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-memory store for tests and ephemeral sessions.
///
/// Clones share the same entries, so a test can keep a handle and inspect
/// what the cart store wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `data` under `key`.
    #[must_use]
    pub fn with_entry(key: &str, data: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), data.to_string());
        }
        store
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn check_available(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, PersistenceError> {
        self.entries
            .lock()
            .map_err(|_| PersistenceError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&mut self, key: &str, data: &str) -> Result<(), PersistenceError> {
        self.check_available()?;
        self.entries()?.insert(key.to_string(), data.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use powerlabs_core::{Money, Product, ProductId};

    use super::*;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        let lamp = Product::new(ProductId::new(1), "Desk Lamp", Money::from_cents(2450), "/lamp.jpg");
        let mug = Product::new(ProductId::new(2), "Mug", Money::from_cents(875), "");
        cart.add(&mug);
        cart.add(&lamp);
        cart.add(&lamp);
        cart
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let cart = sample_cart();
        let restored = decode_snapshot(&encode_snapshot(&cart).unwrap()).unwrap();

        assert_eq!(restored, cart);
        let ids: Vec<i64> = restored.items().iter().map(|i| i.id().as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_snapshot_document_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&encode_snapshot(&sample_cart()).unwrap()).unwrap();

        assert_eq!(json["version"], 0);
        assert_eq!(json["state"]["cart"][1]["quantity"], 2);
        assert_eq!(json["state"]["cart"][1]["imgUrl"], "/lamp.jpg");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_snapshot("{not json"),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let data = r#"{"state":{"cart":[]},"version":3}"#;
        assert!(matches!(
            decode_snapshot(data),
            Err(PersistenceError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_decode_rejects_duplicate_lines() {
        let data = r#"{"state":{"cart":[
            {"id":1,"name":"Lamp","price":10,"imgUrl":"","quantity":1},
            {"id":1,"name":"Lamp","price":10,"imgUrl":"","quantity":2}
        ]},"version":0}"#;
        assert!(decode_snapshot(data).is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshotStore::new(dir.path().join("nested"));

        assert_eq!(store.load(CART_STORAGE_KEY).unwrap(), None);

        store.save(CART_STORAGE_KEY, "first").unwrap();
        store.save(CART_STORAGE_KEY, "second").unwrap();
        assert_eq!(
            store.load(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("second")
        );
        assert!(!dir.path().join("nested/cart-storage.json.tmp").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_file_store_save_inside_multi_thread_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshotStore::new(dir.path());

        store.save(CART_STORAGE_KEY, "from a worker").unwrap();
        assert_eq!(
            store.load(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("from a worker")
        );
    }

    #[tokio::test]
    async fn test_file_store_save_inside_current_thread_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSnapshotStore::new(dir.path());

        store.save(CART_STORAGE_KEY, "single").unwrap();
        assert!(store.load(CART_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_decode_rejects_overflowing_total() {
        let data = r#"{"state":{"cart":[
            {"id":1,"name":"Bar","price":50000000000000000000000000000,"imgUrl":"","quantity":2}
        ]},"version":0}"#;
        assert!(matches!(
            decode_snapshot(data),
            Err(PersistenceError::Json(_))
        ));
    }

    #[test]
    fn test_memory_store_shares_entries_between_clones() {
        let handle = MemorySnapshotStore::new();
        let mut store = handle.clone();

        store.save("k", "v").unwrap();
        assert_eq!(handle.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store_unavailable() {
        let mut store = MemorySnapshotStore::with_entry("k", "old");
        store.set_unavailable(true);

        assert!(matches!(
            store.save("k", "new"),
            Err(PersistenceError::Unavailable(_))
        ));
        assert_eq!(store.get("k").as_deref(), Some("old"));
    }
}
