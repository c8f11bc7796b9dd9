//! The record contract shared by every store backend.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Id value meaning "no id assigned yet". Never stored.
pub const UNASSIGNED_ID: i64 = 0;

/// A record that can be persisted in a [`KeyValueStore`](crate::KeyValueStore).
///
/// Each entity type lives in its own namespace, named by [`Entity::COLLECTION`],
/// and is keyed by a 64-bit integer id.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Namespace name for this entity type, e.g. `"Todo"`.
    const COLLECTION: &'static str;

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    /// `false` while the id is still the [`UNASSIGNED_ID`] sentinel.
    fn has_id(&self) -> bool {
        self.id() != UNASSIGNED_ID
    }
}
