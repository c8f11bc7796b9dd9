//! In-process store backend.
//!
//! [`MemoryStore`] keeps records serialized, the same way a remote key-value
//! store would, so a record that does not survive a JSON round trip fails
//! here just as it would against Redis. Used by the tests and by the server
//! when it runs without Redis.
//!
//! # Limitations
//!
//! - Nothing is persisted; all data is lost when the process exits.
//! - The sequence counter restarts at 1 for every new store.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::store::KeyValueStore;

/// In-memory [`KeyValueStore`] for a single entity type.
///
/// Cloning is cheap; all clones share the same records and sequence.
pub struct MemoryStore<T> {
    records: Arc<RwLock<BTreeMap<i64, Bytes>>>,
    sequence: Arc<AtomicI64>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicI64::new(0)),
            _entity: PhantomData,
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn key(id: i64) -> String {
        format!("{}:{id}", T::COLLECTION)
    }

    fn decode(id: i64, bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::codec(Self::key(id), e))
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            sequence: Arc::clone(&self.sequence),
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Entity> KeyValueStore<T> for MemoryStore<T> {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<T>> {
        let bytes = self.records.read().get(&id).cloned();
        bytes.map(|b| Self::decode(id, &b)).transpose()
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        let snapshot: Vec<(i64, Bytes)> = self
            .records
            .read()
            .iter()
            .map(|(id, bytes)| (*id, bytes.clone()))
            .collect();
        snapshot
            .iter()
            .map(|(id, bytes)| Self::decode(*id, bytes))
            .collect()
    }

    async fn store(&self, entity: &T) -> StoreResult<()> {
        let id = entity.id();
        let bytes = serde_json::to_vec(entity).map_err(|e| StoreError::codec(Self::key(id), e))?;
        self.records.write().insert(id, Bytes::from(bytes));
        tracing::trace!(collection = T::COLLECTION, id, "stored record");
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let removed = self.records.write().remove(&id).is_some();
        tracing::trace!(collection = T::COLLECTION, id, removed, "deleted record");
        Ok(())
    }

    async fn next_sequence_id(&self) -> StoreResult<i64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Todo;

    fn todo(id: i64, content: &str) -> Todo {
        Todo {
            id,
            content: content.to_string(),
            order: 0,
            done: false,
        }
    }

    #[tokio::test]
    async fn get_missing_id_is_none() {
        let store = MemoryStore::<Todo>::new();
        assert_eq!(store.get_by_id(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_overwrites_whole_record() {
        let store = MemoryStore::<Todo>::new();
        store.store(&todo(1, "first")).await.unwrap();
        let mut replacement = todo(1, "second");
        replacement.done = true;
        store.store(&replacement).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_by_id(1).await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn get_all_returns_every_record() {
        let store = MemoryStore::<Todo>::new();
        store.store(&todo(2, "b")).await.unwrap();
        store.store(&todo(1, "a")).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains(&todo(1, "a")));
        assert!(all.contains(&todo(2, "b")));
    }

    #[tokio::test]
    async fn delete_absent_id_is_noop() {
        let store = MemoryStore::<Todo>::new();
        store.store(&todo(1, "keep")).await.unwrap();
        store.delete_by_id(99).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn sequence_starts_at_one_and_increases() {
        let store = MemoryStore::<Todo>::new();
        assert_eq!(store.next_sequence_id().await.unwrap(), 1);
        assert_eq!(store.next_sequence_id().await.unwrap(), 2);
        assert_eq!(store.next_sequence_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::<Todo>::new();
        let clone = store.clone();
        clone.store(&todo(5, "shared")).await.unwrap();
        clone.next_sequence_id().await.unwrap();

        assert_eq!(store.get_by_id(5).await.unwrap(), Some(todo(5, "shared")));
        assert_eq!(store.next_sequence_id().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn undecodable_record_is_codec_error() {
        let store = MemoryStore::<Todo>::new();
        store
            .records
            .write()
            .insert(3, Bytes::from_static(b"not json"));

        let err = store.get_by_id(3).await.unwrap_err();
        assert!(matches!(err, StoreError::Codec { ref key, .. } if key == "Todo:3"));
    }
}
