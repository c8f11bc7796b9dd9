//! The key-value persistence contract.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::StoreResult;

/// Typed key-value persistence for one entity type.
///
/// Implementations must be safe to share between concurrent requests. The one
/// hard guarantee is on [`next_sequence_id`](Self::next_sequence_id): two
/// callers, concurrent or not, never receive the same value, because a
/// duplicate id would make [`store`](Self::store) silently overwrite another
/// record.
#[async_trait]
pub trait KeyValueStore<T: Entity>: Send + Sync {
    /// Fetch one record. Absence is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<T>>;

    /// Snapshot of every stored record, in a store-defined order.
    async fn get_all(&self) -> StoreResult<Vec<T>>;

    /// Upsert keyed by `entity.id()`, replacing any prior record whole.
    async fn store(&self, entity: &T) -> StoreResult<()>;

    /// Remove a record. Deleting an absent id succeeds.
    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;

    /// Allocate an id never handed out before for this entity type.
    async fn next_sequence_id(&self) -> StoreResult<i64>;

    /// Round trip to the backend. Stores without a remote side are always healthy.
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
