use crate::error::{Error, Result};
use crate::record::StoredLeaseRecord;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// The contract the lease protocol requires from a backing store.
///
/// One record per lease name; the record id is the lease name. Exclusivity
/// under contention rests on `create` being atomic with respect to concurrent
/// creates of the same id (insert-if-absent). Backends that cannot guarantee
/// that degrade the protocol to best effort.
#[async_trait]
pub trait LockStore: Send + Sync + std::fmt::Debug {
    /// Fetch the record for `id`. Absence is `Ok(None)`, never an error.
    async fn get(&self, id: &str) -> Result<Option<StoredLeaseRecord>>;

    /// Insert a new record; fails if one already exists for the same id.
    async fn create(&self, record: StoredLeaseRecord) -> Result<()>;

    /// Overwrite the record at `record.id`. May race with concurrent
    /// updates; the protocol compensates with a confirming re-read.
    async fn update(&self, record: StoredLeaseRecord) -> Result<()>;

    /// Remove the record for `id`. Deleting a missing id is a no-op.
    async fn delete_by_id(&self, id: &str) -> Result<()>;
}

/// Process-local [`LockStore`] backed by a concurrent map.
///
/// Useful as a reference backend and as the substrate for protocol tests;
/// its `create` is genuinely atomic, so the first-writer-wins guarantee
/// holds.
#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    records: DashMap<String, StoredLeaseRecord>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LockStore for InMemoryLockStore {
    async fn get(&self, id: &str) -> Result<Option<StoredLeaseRecord>> {
        Ok(self.records.get(id).map(|entry| entry.clone()))
    }

    async fn create(&self, record: StoredLeaseRecord) -> Result<()> {
        match self.records.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
            Entry::Occupied(_) => Err(Error::Conflict { id: record.id }),
        }
    }

    async fn update(&self, record: StoredLeaseRecord) -> Result<()> {
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        self.records.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, owner: &str) -> StoredLeaseRecord {
        StoredLeaseRecord {
            id: id.into(),
            org_id: None,
            locked_by: owner.into(),
            locked_at: 1_000,
            locked_till: 11_000,
        }
    }

    #[tokio::test]
    async fn get_on_absent_id_is_none_not_error() {
        let store = InMemoryLockStore::new();
        assert_eq!(store.get("job-x").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = InMemoryLockStore::new();
        store.create(record("job-x", "host-a")).await.unwrap();
        let err = store.create(record("job-x", "host-b")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { id } if id == "job-x"));
        // loser's write must not clobber the winner's record
        let held = store.get("job-x").await.unwrap().unwrap();
        assert_eq!(held.locked_by, "host-a");
    }

    #[tokio::test]
    async fn update_overwrites_in_place() {
        let store = InMemoryLockStore::new();
        store.create(record("job-x", "host-a")).await.unwrap();
        store.update(record("job-x", "host-b")).await.unwrap();
        let held = store.get("job-x").await.unwrap().unwrap();
        assert_eq!(held.locked_by, "host-b");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_a_noop() {
        let store = InMemoryLockStore::new();
        store.delete_by_id("job-x").await.unwrap();

        store.create(record("job-x", "host-a")).await.unwrap();
        store.delete_by_id("job-x").await.unwrap();
        assert!(store.is_empty());
    }
}
