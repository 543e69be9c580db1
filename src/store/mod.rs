//! Company record persistence.
//!
//! All records live as one JSON array under a single key. Every operation is
//! a whole-collection read-modify-write with no locking, so the store assumes
//! a single writer process. Two concurrent writers lose updates (last write
//! wins).

pub mod kv;

pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

use std::sync::Arc;

use crate::config::DEFAULT_STORAGE_KEY;
use crate::error::ProfilerError;
use crate::types::CompanyRecord;

pub struct RecordStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl RecordStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            kv,
            key: key.to_string(),
        }
    }

    /// Store under the default key.
    pub fn with_default_key(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, DEFAULT_STORAGE_KEY)
    }

    /// In-memory store, for tests.
    pub fn in_memory() -> Self {
        Self::with_default_key(Arc::new(MemoryKeyValueStore::new()))
    }

    /// All stored records. An absent key means no records.
    pub fn get_all(&self) -> Result<Vec<CompanyRecord>, ProfilerError> {
        let Some(bytes) = self.kv.get(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            ProfilerError::Storage(format!("Failed to parse stored companies: {}", e))
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<CompanyRecord>, ProfilerError> {
        Ok(self.get_all()?.into_iter().find(|r| r.id == id))
    }

    /// Like `get`, but a missing id is an error.
    pub fn require(&self, id: &str) -> Result<CompanyRecord, ProfilerError> {
        self.get(id)?
            .ok_or_else(|| ProfilerError::NotFound(id.to_string()))
    }

    /// Insert or replace the record with the same id.
    ///
    /// Ids are derived from display names and can collide ("Acme, Inc" and
    /// "ACME Inc"). The incoming record replaces the stored one either way;
    /// a differing name is only logged.
    pub fn upsert(&self, record: CompanyRecord) -> Result<(), ProfilerError> {
        let mut records = self.get_all()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                if existing.name() != record.name() {
                    log::warn!(
                        "Record id '{}' collides: replacing \"{}\" with \"{}\"",
                        record.id,
                        existing.name(),
                        record.name()
                    );
                }
                *existing = record;
            }
            None => records.push(record),
        }
        self.write_all(&records)
    }

    /// Remove one record. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> Result<bool, ProfilerError> {
        let mut records = self.get_all()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records)?;
        Ok(true)
    }

    /// Remove every record by removing the storage key.
    pub fn delete_all(&self) -> Result<(), ProfilerError> {
        self.kv.remove(&self.key)
    }

    fn write_all(&self, records: &[CompanyRecord]) -> Result<(), ProfilerError> {
        let bytes = serde_json::to_vec(records).map_err(|e| {
            ProfilerError::Storage(format!("Failed to serialize companies: {}", e))
        })?;
        self.kv.set(&self.key, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CompanyData;
    use crate::util::company_to_id;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn record(name: &str) -> CompanyRecord {
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        CompanyRecord {
            id: company_to_id(name),
            last_fetched: "2026-10-19T10:00:00+00:00".to_string(),
            data: CompanyData::empty(name, day),
        }
    }

    #[test]
    fn test_empty_store_returns_no_records() {
        let store = RecordStore::in_memory();
        assert!(store.get_all().unwrap().is_empty());
        assert!(store.get("acme-inc").unwrap().is_none());
    }

    #[test]
    fn test_upsert_then_get() {
        let store = RecordStore::in_memory();
        let acme = record("Acme Inc");
        store.upsert(acme.clone()).unwrap();
        assert_eq!(store.get("acme-inc").unwrap(), Some(acme));
    }

    #[test]
    fn test_upsert_replaces_same_id() {
        let store = RecordStore::in_memory();
        store.upsert(record("Acme Inc")).unwrap();
        let mut updated = record("Acme Inc");
        updated.data.segmentation = Some("Large Cap".into());
        store.upsert(updated).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data.segmentation.as_deref(), Some("Large Cap"));
    }

    #[test]
    fn test_id_collision_last_write_wins() {
        let store = RecordStore::in_memory();
        store.upsert(record("Acme, Inc")).unwrap();
        store.upsert(record("ACME Inc")).unwrap();
        let all = store.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "ACME Inc");
    }

    #[test]
    fn test_delete_and_delete_all() {
        let store = RecordStore::in_memory();
        store.upsert(record("Acme Inc")).unwrap();
        store.upsert(record("Globex")).unwrap();

        assert!(store.delete("acme-inc").unwrap());
        assert!(!store.delete("acme-inc").unwrap());
        assert!(store.get("acme-inc").unwrap().is_none());
        assert_eq!(store.get_all().unwrap().len(), 1);

        store.delete_all().unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_require_missing_is_not_found() {
        let store = RecordStore::in_memory();
        assert!(matches!(store.require("nope"), Err(ProfilerError::NotFound(_))));
    }

    #[test]
    fn test_file_backed_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let acme = record("Acme Inc");
        {
            let store = RecordStore::with_default_key(Arc::new(FileKeyValueStore::new(dir.path())));
            store.upsert(acme.clone()).unwrap();
        }
        assert!(dir.path().join("companyDataCrawlerApp.json").exists());
        let store = RecordStore::with_default_key(Arc::new(FileKeyValueStore::new(dir.path())));
        assert_eq!(store.get_all().unwrap(), vec![acme]);
    }

    #[test]
    fn test_corrupt_storage_is_storage_error() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        kv.set(DEFAULT_STORAGE_KEY, b"{oops").unwrap();
        let store = RecordStore::with_default_key(kv);
        assert!(matches!(store.get_all(), Err(ProfilerError::Storage(_))));
    }
}
