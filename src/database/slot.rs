//! Named key-value slots, one per collection.
//!
//! Each slot holds the serialized form of a whole collection. Writes to
//! different slots are independent; nothing is transactional across slots.

use anyhow::{Context, Result};
use redb::{Database, ReadableTable};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use super::schema::{COLLECTIONS_TABLE, CollectionKey};

pub trait SlotStorage: Send + Sync {
    /// Raw bytes stored under `key`, `None` if the slot was never written.
    fn read(&self, key: CollectionKey) -> Result<Option<Vec<u8>>>;

    fn write(&self, key: CollectionKey, bytes: &[u8]) -> Result<()>;

    fn clear(&self, key: CollectionKey) -> Result<()>;
}

// ────────────────────────────────────────────────────────────────
// redb-backed slots
// ────────────────────────────────────────────────────────────────

pub struct RedbSlots {
    pub in_disk: Database,
}

impl RedbSlots {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Database::create(path)
            .with_context(|| format!("Failed to open slot database {:?}", path))?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(COLLECTIONS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { in_disk: db })
    }
}

impl SlotStorage for RedbSlots {
    fn read(&self, key: CollectionKey) -> Result<Option<Vec<u8>>> {
        let read_txn = self.in_disk.begin_read()?;
        let table = read_txn.open_table(COLLECTIONS_TABLE)?;
        let value = table
            .get(key.as_str())
            .with_context(|| format!("Failed to read slot {key}"))?;
        Ok(value.map(|access| access.value().to_vec()))
    }

    fn write(&self, key: CollectionKey, bytes: &[u8]) -> Result<()> {
        let write_txn = self.in_disk.begin_write()?;
        {
            let mut table = write_txn.open_table(COLLECTIONS_TABLE)?;
            table
                .insert(key.as_str(), bytes)
                .with_context(|| format!("Failed to write slot {key}"))?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn clear(&self, key: CollectionKey) -> Result<()> {
        let write_txn = self.in_disk.begin_write()?;
        {
            let mut table = write_txn.open_table(COLLECTIONS_TABLE)?;
            table.remove(key.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────
// In-memory slots
// ────────────────────────────────────────────────────────────────

/// Process-local slots. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemorySlots {
    in_memory: Arc<RwLock<HashMap<CollectionKey, Vec<u8>>>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStorage for MemorySlots {
    fn read(&self, key: CollectionKey) -> Result<Option<Vec<u8>>> {
        let map = self
            .in_memory
            .read()
            .map_err(|_| anyhow::anyhow!("Memory slots lock poisoned"))?;
        Ok(map.get(&key).cloned())
    }

    fn write(&self, key: CollectionKey, bytes: &[u8]) -> Result<()> {
        let mut map = self
            .in_memory
            .write()
            .map_err(|_| anyhow::anyhow!("Memory slots lock poisoned"))?;
        map.insert(key, bytes.to_vec());
        Ok(())
    }

    fn clear(&self, key: CollectionKey) -> Result<()> {
        let mut map = self
            .in_memory
            .write()
            .map_err(|_| anyhow::anyhow!("Memory slots lock poisoned"))?;
        map.remove(&key);
        Ok(())
    }
}
