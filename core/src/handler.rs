//! REST verb mapping for todos.
//!
//! # Design
//! `TodoHandler` owns no mutable state; everything it touches goes through
//! the injected store. POST and PUT both land in [`TodoHandler::write`], so the
//! two verbs cannot drift apart.

use crate::entity::{Entity, UNASSIGNED_ID};
use crate::error::StoreResult;
use crate::store::KeyValueStore;
use crate::types::Todo;

/// Outcome of [`TodoHandler::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read<T> {
    /// The id was the sentinel: every stored record.
    All(Vec<T>),
    /// A single lookup; `None` when the id is not stored.
    One(Option<T>),
}

/// Maps the todo REST operations onto a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct TodoHandler<S> {
    store: S,
}

impl<S> TodoHandler<S>
where
    S: KeyValueStore<Todo>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// List every todo when `id` is the sentinel, otherwise fetch one.
    pub async fn read(&self, id: i64) -> StoreResult<Read<Todo>> {
        if id == UNASSIGNED_ID {
            let todos = self.store.get_all().await?;
            tracing::debug!(count = todos.len(), "listed todos");
            return Ok(Read::All(todos));
        }
        let todo = self.store.get_by_id(id).await?;
        tracing::debug!(id, found = todo.is_some(), "fetched todo");
        Ok(Read::One(todo))
    }

    /// Create or replace a todo.
    ///
    /// A todo without an id gets the next sequence id first. The store call is
    /// an unconditional upsert, so a caller-supplied id that is not stored yet
    /// creates the record. An explicit id of `0` cannot be stored; it always
    /// means "create".
    pub async fn write(&self, mut todo: Todo) -> StoreResult<Todo> {
        if !todo.has_id() {
            let id = self.store.next_sequence_id().await?;
            todo.set_id(id);
            tracing::debug!(id, "allocated todo id");
        }
        self.store.store(&todo).await?;
        tracing::debug!(id = todo.id, "stored todo");
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        self.store.delete_by_id(id).await?;
        tracing::debug!(id, "deleted todo");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::memory::MemoryStore;

    fn handler() -> TodoHandler<MemoryStore<Todo>> {
        TodoHandler::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn write_without_id_allocates_fresh_ids() {
        let h = handler();
        let first = h.write(Todo::new("buy milk", 1)).await.unwrap();
        let second = h.write(Todo::new("walk dog", 2)).await.unwrap();

        assert_ne!(first.id, UNASSIGNED_ID);
        assert_ne!(second.id, UNASSIGNED_ID);
        assert_ne!(first.id, second.id);
        assert_eq!(first.content, "buy milk");
    }

    #[tokio::test]
    async fn write_with_unknown_id_creates_record() {
        let h = handler();
        let todo = Todo {
            id: 500,
            content: "explicit".to_string(),
            order: 0,
            done: false,
        };
        let stored = h.write(todo.clone()).await.unwrap();
        assert_eq!(stored, todo);
        assert_eq!(h.read(500).await.unwrap(), Read::One(Some(todo)));
    }

    #[tokio::test]
    async fn write_with_existing_id_overwrites() {
        let h = handler();
        let created = h.write(Todo::new("buy milk", 1)).await.unwrap();
        let updated = Todo {
            done: true,
            ..created.clone()
        };
        h.write(updated.clone()).await.unwrap();

        let Read::One(Some(fetched)) = h.read(created.id).await.unwrap() else {
            panic!("expected a single todo");
        };
        assert!(fetched.done);
        assert_eq!(fetched.content, "buy milk");
        assert_eq!(h.store().len(), 1);
    }

    #[tokio::test]
    async fn rewriting_fetched_record_changes_nothing() {
        let h = handler();
        let created = h.write(Todo::new("stable", 4)).await.unwrap();
        let Read::One(Some(fetched)) = h.read(created.id).await.unwrap() else {
            panic!("expected a single todo");
        };
        let rewritten = h.write(fetched.clone()).await.unwrap();

        assert_eq!(rewritten, fetched);
        assert_eq!(h.read(created.id).await.unwrap(), Read::One(Some(created)));
        assert_eq!(h.store().len(), 1);
    }

    #[tokio::test]
    async fn read_sentinel_lists_all() {
        let h = handler();
        let a = h.write(Todo::new("a", 1)).await.unwrap();
        let b = h.write(Todo::new("b", 2)).await.unwrap();

        let Read::All(todos) = h.read(UNASSIGNED_ID).await.unwrap() else {
            panic!("expected a list");
        };
        assert_eq!(todos.len(), 2);
        assert!(todos.contains(&a));
        assert!(todos.contains(&b));
    }

    #[tokio::test]
    async fn delete_then_read_is_not_found_and_delete_is_idempotent() {
        let h = handler();
        let created = h.write(Todo::new("temp", 0)).await.unwrap();

        h.delete(created.id).await.unwrap();
        assert_eq!(h.read(created.id).await.unwrap(), Read::One(None));
        h.delete(created.id).await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_never_share_an_id() {
        let h = handler();
        let tasks: Vec<_> = (0..64)
            .map(|i| {
                let h = h.clone();
                tokio::spawn(async move { h.write(Todo::new(format!("todo {i}"), i)).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            let todo = task.await.unwrap().unwrap();
            assert!(ids.insert(todo.id), "duplicate id {}", todo.id);
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(h.store().len(), 64);
    }

    /// Store that fails every call once `down` is set.
    #[derive(Clone, Default)]
    struct FlakyStore {
        inner: MemoryStore<Todo>,
        down: Arc<AtomicBool>,
    }

    impl FlakyStore {
        fn check(&self) -> StoreResult<()> {
            if self.down.load(Ordering::SeqCst) {
                return Err(StoreError::unavailable("connection refused"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl KeyValueStore<Todo> for FlakyStore {
        async fn get_by_id(&self, id: i64) -> StoreResult<Option<Todo>> {
            self.check()?;
            self.inner.get_by_id(id).await
        }

        async fn get_all(&self) -> StoreResult<Vec<Todo>> {
            self.check()?;
            self.inner.get_all().await
        }

        async fn store(&self, entity: &Todo) -> StoreResult<()> {
            self.check()?;
            self.inner.store(entity).await
        }

        async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
            self.check()?;
            self.inner.delete_by_id(id).await
        }

        async fn next_sequence_id(&self) -> StoreResult<i64> {
            self.check()?;
            self.inner.next_sequence_id().await
        }
    }

    #[tokio::test]
    async fn store_failures_propagate_unchanged() {
        let store = FlakyStore::default();
        let h = TodoHandler::new(store.clone());
        let created = h.write(Todo::new("before outage", 0)).await.unwrap();

        store.down.store(true, Ordering::SeqCst);
        assert!(matches!(
            h.write(Todo::new("during outage", 0)).await,
            Err(StoreError::Unavailable { .. })
        ));
        assert!(h.read(UNASSIGNED_ID).await.is_err());
        assert!(h.delete(created.id).await.is_err());

        store.down.store(false, Ordering::SeqCst);
        assert_eq!(h.read(created.id).await.unwrap(), Read::One(Some(created)));
        assert_eq!(store.inner.len(), 1);
    }
}
