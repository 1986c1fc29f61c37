pub mod memory;
pub mod sqlite;

pub use memory::MemoryMetaStore;
pub use sqlite::SqliteMetaStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{EntityId, MetaKey, MetaRecord, Namespace};

/// Durable storage contract for goal values.
///
/// Implementations must make `put` a single atomic overwrite per key; the
/// store is shared across request handlers.
#[async_trait]
pub trait MetaStore: Send + Sync {
    /// Insert or overwrite the value for `key`.
    async fn put(&self, key: &MetaKey, value: f64) -> Result<MetaRecord, StoreError>;

    async fn get(&self, key: &MetaKey) -> Result<Option<MetaRecord>, StoreError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &MetaKey) -> Result<(), StoreError>;

    /// Every record of one entity in one namespace, in no particular order.
    async fn list(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
    ) -> Result<Vec<MetaRecord>, StoreError>;

    /// Remove all records in all namespaces, returning how many were removed.
    async fn clear(&self) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
