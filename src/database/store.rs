use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

use super::schema::CollectionKey;
use super::slot::SlotStorage;

/// An entity that can live in a [`RecordStore`].
pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> &str;

    /// Drop payloads that are too large to persist. Returns whether anything
    /// was removed.
    fn strip_transient(&mut self) -> bool {
        false
    }
}

/// Result of a [`RecordStore::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Written after transient payloads were stripped to fit the quota
    WrittenStripped,
    /// Nothing was written; the collection only lives in memory
    InMemoryOnly,
}

/// In-memory copy of one collection, mirrored to one slot.
///
/// Mutations only touch memory; call [`RecordStore::save`] once the handler
/// is done. Persistence failures are logged and switch the store to
/// in-memory-only operation for the rest of its life.
pub struct RecordStore<T: Record> {
    slots: Arc<dyn SlotStorage>,
    key: CollectionKey,
    quota: usize,
    records: Vec<T>,
    degraded: bool,
}

impl<T: Record> RecordStore<T> {
    /// Open the store and load whatever the slot currently holds.
    pub fn open(slots: Arc<dyn SlotStorage>, key: CollectionKey, quota: usize) -> Self {
        let mut store = Self {
            slots,
            key,
            quota,
            records: Vec::new(),
            degraded: false,
        };
        store.load();
        store
    }

    pub fn key(&self) -> CollectionKey {
        self.key
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Reload the collection from its slot.
    ///
    /// A missing slot yields an empty collection; an unreadable or unparsable
    /// slot is logged and also yields an empty collection.
    pub fn load(&mut self) -> &[T] {
        if self.degraded {
            debug!("Slot {} is in-memory only, skipping load", self.key);
            return &self.records;
        }

        self.records = match self.slots.read(self.key) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<T>>(&bytes) {
                Ok(records) => {
                    debug!("Loaded {} records from slot {}", records.len(), self.key);
                    records
                }
                Err(e) => {
                    error!("Slot {} holds invalid data, starting empty: {}", self.key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("Failed to read slot {}, starting empty: {:?}", self.key, e);
                Vec::new()
            }
        };
        &self.records
    }

    /// Persist the whole collection.
    pub fn save(&mut self) -> SaveOutcome {
        if self.degraded {
            debug!("Slot {} is in-memory only, skipping save", self.key);
            return SaveOutcome::InMemoryOnly;
        }
        let start_time = Instant::now();

        let (bytes, outcome) = match self.encode() {
            Some(encoded) => encoded,
            None => {
                self.degrade();
                return SaveOutcome::InMemoryOnly;
            }
        };

        match self.slots.write(self.key, &bytes) {
            Ok(()) => {
                debug!(
                    duration = &*format!("{:?}", start_time.elapsed());
                    "Saved {} records to slot {}", self.records.len(), self.key
                );
                outcome
            }
            Err(e) => {
                error!("Failed to write slot {}: {:?}", self.key, e);
                self.degrade();
                SaveOutcome::InMemoryOnly
            }
        }
    }

    fn encode(&self) -> Option<(Vec<u8>, SaveOutcome)> {
        let bytes = match serde_json::to_vec(&self.records) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to serialize slot {}: {}", self.key, e);
                return None;
            }
        };
        if bytes.len() <= self.quota {
            return Some((bytes, SaveOutcome::Written));
        }

        warn!(
            "Slot {} needs {} bytes, quota is {}; stripping inline previews",
            self.key,
            bytes.len(),
            self.quota
        );
        let mut stripped = self.records.clone();
        let mut any = false;
        for record in &mut stripped {
            any |= record.strip_transient();
        }
        if any {
            match serde_json::to_vec(&stripped) {
                Ok(bytes) if bytes.len() <= self.quota => {
                    return Some((bytes, SaveOutcome::WrittenStripped));
                }
                Ok(bytes) => {
                    error!(
                        "Slot {} still needs {} bytes after stripping, quota is {}",
                        self.key,
                        bytes.len(),
                        self.quota
                    );
                }
                Err(e) => error!("Failed to serialize slot {}: {}", self.key, e),
            }
        } else {
            error!("Slot {} exceeds its quota and has nothing to strip", self.key);
        }
        None
    }

    /// Stop persisting this collection for the rest of the session.
    pub fn degrade(&mut self) {
        if !self.degraded {
            warn!(
                "Slot {} switched to in-memory only for this session",
                self.key
            );
            self.degraded = true;
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    /// Replace the record with the same id, or insert it at the front.
    pub fn upsert(&mut self, record: T) {
        match self.records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => self.records.insert(0, record),
        }
    }

    /// Append records at the back, keeping submission order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = T>) {
        self.records.extend(records);
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.records.iter().position(|record| record.id() == id)?;
        Some(self.records.remove(index))
    }

    /// Drop every stored record and the slot contents.
    pub fn clear(&mut self) {
        self.records.clear();
        if !self.degraded {
            if let Err(e) = self.slots.clear(self.key) {
                error!("Failed to clear slot {}: {:?}", self.key, e);
                self.degrade();
            } else {
                info!("Cleared slot {}", self.key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::slot::MemorySlots;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blob: Option<String>,
    }

    impl Record for Note {
        fn id(&self) -> &str {
            &self.id
        }

        fn strip_transient(&mut self) -> bool {
            self.blob.take().is_some()
        }
    }

    fn note(id: &str, blob: Option<&str>) -> Note {
        Note {
            id: id.into(),
            body: format!("body {id}"),
            blob: blob.map(str::to_string),
        }
    }

    struct FailingSlots;

    impl SlotStorage for FailingSlots {
        fn read(&self, _key: CollectionKey) -> anyhow::Result<Option<Vec<u8>>> {
            Ok(None)
        }
        fn write(&self, _key: CollectionKey, _bytes: &[u8]) -> anyhow::Result<()> {
            anyhow::bail!("quota exceeded")
        }
        fn clear(&self, _key: CollectionKey) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn upsert_replaces_or_prepends() {
        let slots = Arc::new(MemorySlots::new());
        let mut store: RecordStore<Note> = RecordStore::open(slots, CollectionKey::Images, 1024);
        store.upsert(note("a", None));
        store.upsert(note("b", None));
        assert_eq!(store.records()[0].id, "b");

        let mut changed = note("a", None);
        changed.body = "changed".into();
        store.upsert(changed);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().body, "changed");

        assert!(store.remove("a").is_some());
        assert!(store.remove("a").is_none());
    }

    #[test]
    fn unparsable_slot_loads_empty() {
        let slots = Arc::new(MemorySlots::new());
        slots.write(CollectionKey::Images, b"{not json").unwrap();
        let store: RecordStore<Note> = RecordStore::open(slots, CollectionKey::Images, 1024);
        assert!(store.is_empty());
        assert!(!store.is_degraded());
    }

    #[test]
    fn oversized_collection_is_stripped_then_written() {
        let slots = Arc::new(MemorySlots::new());
        let mut store: RecordStore<Note> =
            RecordStore::open(slots.clone(), CollectionKey::Images, 120);
        store.upsert(note("a", Some(&"x".repeat(200))));

        assert_eq!(store.save(), SaveOutcome::WrittenStripped);
        assert!(store.get("a").unwrap().blob.is_some());

        let reloaded: RecordStore<Note> = RecordStore::open(slots, CollectionKey::Images, 120);
        assert_eq!(reloaded.get("a").unwrap().blob, None);
    }

    #[test]
    fn hopeless_quota_degrades_to_memory() {
        let slots = Arc::new(MemorySlots::new());
        let mut store: RecordStore<Note> = RecordStore::open(slots.clone(), CollectionKey::Images, 4);
        store.upsert(note("a", None));
        assert_eq!(store.save(), SaveOutcome::InMemoryOnly);
        assert!(store.is_degraded());
        assert_eq!(slots.read(CollectionKey::Images).unwrap(), None);

        store.upsert(note("b", None));
        assert_eq!(store.load().len(), 2);
    }

    #[test]
    fn write_failure_degrades_to_memory() {
        let mut store: RecordStore<Note> =
            RecordStore::open(Arc::new(FailingSlots), CollectionKey::Videos, 1024);
        store.upsert(note("a", None));
        assert_eq!(store.save(), SaveOutcome::InMemoryOnly);
        assert!(store.is_degraded());
        assert_eq!(store.save(), SaveOutcome::InMemoryOnly);
        assert_eq!(store.len(), 1);
    }
}
