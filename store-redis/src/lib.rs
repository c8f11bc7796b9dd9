//! Redis-backed [`KeyValueStore`].
//!
//! # Architecture
//!
//! Records are stored as JSON under the layout described in [`keys`]. A
//! record and its membership in the id set are written and removed together
//! in a `MULTI` pipeline, so `get_all` never sees an id set that disagrees
//! with a completed `store` or `delete_by_id`. Ids come from `INCR` on the
//! sequence key, which Redis executes atomically for all clients.
//!
//! # Example
//!
//! ```no_run
//! use todo_core::{KeyValueStore, Todo};
//! use todo_store_redis::RedisStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisStore::<Todo>::connect("redis://127.0.0.1:6379").await?;
//! let id = store.next_sequence_id().await?;
//! # Ok(())
//! # }
//! ```

pub mod keys;

use std::marker::PhantomData;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use todo_core::{Entity, KeyValueStore, StoreError, StoreResult};

/// [`KeyValueStore`] over a shared Redis connection.
///
/// Cloning is cheap: clones share the underlying `ConnectionManager`, which
/// reconnects on its own after a dropped connection.
pub struct RedisStore<T> {
    conn: ConnectionManager,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RedisStore<T> {
    /// Connect to Redis at `redis_url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid or the
    /// initial connection fails.
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        let client = Client::open(redis_url)
            .map_err(unavailable(format!("invalid Redis URL {redis_url}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(unavailable(format!("failed to connect to {redis_url}")))?;
        tracing::info!(collection = T::COLLECTION, redis_url, "connected to Redis");
        Ok(Self::from_manager(conn))
    }

    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }

    fn decode(key: &str, bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::codec(key, e))
    }
}

impl<T> Clone for RedisStore<T> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            _entity: PhantomData,
        }
    }
}

fn unavailable(context: String) -> impl FnOnce(RedisError) -> StoreError {
    move |e| StoreError::unavailable_with_source(context, e)
}

#[async_trait]
impl<T: Entity> KeyValueStore<T> for RedisStore<T> {
    async fn get_by_id(&self, id: i64) -> StoreResult<Option<T>> {
        let mut conn = self.conn.clone();
        let key = keys::record(T::COLLECTION, id);
        let raw: Option<Vec<u8>> = conn
            .get(&key)
            .await
            .map_err(unavailable(format!("GET {key}")))?;
        raw.map(|bytes| Self::decode(&key, &bytes)).transpose()
    }

    async fn get_all(&self) -> StoreResult<Vec<T>> {
        let mut conn = self.conn.clone();
        let ids_key = keys::ids(T::COLLECTION);
        let mut ids: Vec<i64> = conn
            .smembers(&ids_key)
            .await
            .map_err(unavailable(format!("SMEMBERS {ids_key}")))?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        ids.sort_unstable();

        let record_keys: Vec<String> = ids
            .iter()
            .map(|id| keys::record(T::COLLECTION, *id))
            .collect();
        let raws: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&record_keys)
            .query_async(&mut conn)
            .await
            .map_err(unavailable(format!("MGET {} records", record_keys.len())))?;

        // A record deleted between SMEMBERS and MGET comes back as nil.
        record_keys
            .iter()
            .zip(raws)
            .filter_map(|(key, raw)| raw.map(|bytes| Self::decode(key, &bytes)))
            .collect()
    }

    async fn store(&self, entity: &T) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let id = entity.id();
        let key = keys::record(T::COLLECTION, id);
        let bytes = serde_json::to_vec(entity).map_err(|e| StoreError::codec(&key, e))?;

        let _: () = redis::pipe()
            .atomic()
            .set(&key, bytes)
            .ignore()
            .sadd(keys::ids(T::COLLECTION), id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable(format!("store {key}")))?;

        tracing::debug!(collection = T::COLLECTION, id, "stored record in Redis");
        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let key = keys::record(T::COLLECTION, id);

        let _: () = redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .srem(keys::ids(T::COLLECTION), id)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable(format!("delete {key}")))?;

        tracing::debug!(collection = T::COLLECTION, id, "deleted record from Redis");
        Ok(())
    }

    async fn next_sequence_id(&self) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let key = keys::sequence(T::COLLECTION);
        conn.incr(&key, 1_i64)
            .await
            .map_err(unavailable(format!("INCR {key}")))
    }

    async fn health_check(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(unavailable("PING".to_string()))?;
        Ok(())
    }
}
