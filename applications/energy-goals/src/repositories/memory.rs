use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::MetaStore;
use crate::error::StoreError;
use crate::models::{EntityId, MetaKey, MetaRecord, Namespace};

#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    value: f64,
    updated_at: DateTime<Utc>,
}

/// String-keyed in-process store with browser-storage semantics: flat
/// string keys, string payloads, and enumeration by key prefix.
///
/// An optional entry limit emulates a storage quota.
#[derive(Debug, Default)]
pub struct MemoryMetaStore {
    entries: RwLock<BTreeMap<String, String>>,
    max_entries: Option<usize>,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            max_entries: Some(max_entries),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn decode(key: &MetaKey, raw: &str) -> Result<MetaRecord, StoreError> {
        let stored: StoredValue = serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
            key: key.storage_key(),
            reason: e.to_string(),
        })?;
        Ok(MetaRecord {
            key: key.clone(),
            value: stored.value,
            updated_at: stored.updated_at,
        })
    }
}

#[async_trait]
impl MetaStore for MemoryMetaStore {
    async fn put(&self, key: &MetaKey, value: f64) -> Result<MetaRecord, StoreError> {
        let storage_key = key.storage_key();
        let updated_at = Utc::now();
        let payload = serde_json::to_string(&StoredValue { value, updated_at }).map_err(|e| {
            StoreError::Corrupt {
                key: storage_key.clone(),
                reason: e.to_string(),
            }
        })?;

        let mut entries = self.entries.write().await;
        if let Some(limit) = self.max_entries {
            if !entries.contains_key(&storage_key) && entries.len() >= limit {
                return Err(StoreError::QuotaExceeded(format!(
                    "{} entries already stored",
                    entries.len()
                )));
            }
        }
        entries.insert(storage_key, payload);

        Ok(MetaRecord {
            key: key.clone(),
            value,
            updated_at,
        })
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<MetaRecord>, StoreError> {
        let entries = self.entries.read().await;
        entries
            .get(&key.storage_key())
            .map(|raw| Self::decode(key, raw))
            .transpose()
    }

    async fn delete(&self, key: &MetaKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(&key.storage_key());
        Ok(())
    }

    async fn list(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
    ) -> Result<Vec<MetaRecord>, StoreError> {
        let prefix = MetaKey::entity_prefix(namespace, entity_id);
        let entries = self.entries.read().await;

        let mut records = Vec::new();
        for (raw_key, raw_value) in entries.range(prefix.clone()..) {
            if !raw_key.starts_with(&prefix) {
                break;
            }
            match MetaKey::parse_storage_key(raw_key) {
                Some(key) => records.push(Self::decode(&key, raw_value)?),
                None => tracing::warn!(key = %raw_key, "Skipping unparseable goal key"),
            }
        }
        Ok(records)
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len() as u64;
        entries.clear();
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodKind;

    fn key(entity: &str, index: u32) -> MetaKey {
        MetaKey::new(
            Namespace::ConsumptionGoal,
            EntityId::from(entity),
            PeriodKind::Monthly,
            index,
        )
    }

    #[tokio::test]
    async fn test_roundtrip_and_overwrite() {
        let store = MemoryMetaStore::new();
        let k = key("33", 4);

        store.put(&k, 10.0).await.unwrap();
        store.put(&k, 20.0).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&k).await.unwrap().unwrap().value, 20.0);
    }

    #[tokio::test]
    async fn test_list_only_returns_matching_entity() {
        let store = MemoryMetaStore::new();
        store.put(&key("3", 0), 1.0).await.unwrap();
        store.put(&key("3", 1), 2.0).await.unwrap();
        store.put(&key("33", 0), 3.0).await.unwrap();
        store.put(&key("3_x", 0), 4.0).await.unwrap();

        let records = store
            .list(Namespace::ConsumptionGoal, &EntityId::from("3"))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.key.entity_id.as_str() == "3"));
    }

    #[tokio::test]
    async fn test_quota_rejects_new_keys_but_allows_overwrite() {
        let store = MemoryMetaStore::with_max_entries(1);
        let first = key("33", 0);

        store.put(&first, 1.0).await.unwrap();
        let err = store.put(&key("33", 1), 2.0).await.unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded(_)));

        store.put(&first, 5.0).await.unwrap();
        assert_eq!(store.get(&first).await.unwrap().unwrap().value, 5.0);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported() {
        let store = MemoryMetaStore::new();
        let k = key("33", 2);
        store
            .entries
            .write()
            .await
            .insert(k.storage_key(), "not json".to_string());

        assert!(matches!(
            store.get(&k).await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_clear_reports_removed_count() {
        let store = MemoryMetaStore::new();
        store.put(&key("33", 0), 1.0).await.unwrap();
        store.put(&key("36", 0), 1.0).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.is_empty().await);
    }
}
