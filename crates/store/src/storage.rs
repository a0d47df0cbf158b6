//! Durable key-value storage port.
//!
//! The wizard persists its state documents through this narrow seam. The
//! production implementation is whatever the host shell provides (browser
//! local storage, a desktop profile file); tests and demo mode use the
//! in-memory implementation.

use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value storage for serialized state documents.
///
/// Backend failures are opaque to the wizard; the store logs and carries
/// on, since client-side persistence is best-effort.
pub trait StateStorage: Send + Sync {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// In-memory [`StateStorage`] for tests and demo mode.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents. Test helper.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("storage lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self.entries.lock().expect("storage lock poisoned");
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().expect("storage lock poisoned");
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_roundtrips() {
        let storage = MemoryStorage::new();
        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn load_missing_key_is_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load("absent").unwrap(), None);
    }

    #[test]
    fn remove_deletes_the_entry() {
        let storage = MemoryStorage::new();
        storage.save("k", "v").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }
}
