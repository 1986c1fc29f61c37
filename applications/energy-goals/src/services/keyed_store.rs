use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{GoalError, ValidationError};
use crate::models::{EntityId, MetaKey, MetaRecord, Namespace, PeriodKind};
use crate::repositories::MetaStore;

/// Period-keyed numeric store over an injected [`MetaStore`] backend.
///
/// Storage failures never escape this type: writes report `false`, reads
/// degrade to "absent". Every read goes to the backend.
#[derive(Clone)]
pub struct KeyedValueStore {
    backend: Arc<dyn MetaStore>,
}

impl KeyedValueStore {
    pub fn new(backend: Arc<dyn MetaStore>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn MetaStore> {
        &self.backend
    }

    /// Checks a value and index before anything is written.
    pub fn validate_entry(
        period_kind: PeriodKind,
        period_index: u32,
        value: f64,
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(value));
        }
        if value < 0.0 {
            return Err(ValidationError::Negative(value));
        }
        if !period_kind.contains_index(period_index) {
            return Err(ValidationError::IndexOutOfRange {
                kind: period_kind,
                index: period_index,
            });
        }
        Ok(())
    }

    pub async fn try_put(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        period_kind: PeriodKind,
        period_index: u32,
        value: f64,
    ) -> Result<MetaRecord, GoalError> {
        Self::validate_entry(period_kind, period_index, value)?;
        let key = MetaKey::new(namespace, entity_id.clone(), period_kind, period_index);
        let record = self.backend.put(&key, value).await?;
        info!(key = %key, value, "Goal value stored");
        Ok(record)
    }

    pub async fn put(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        period_kind: PeriodKind,
        period_index: u32,
        value: f64,
    ) -> bool {
        match self
            .try_put(namespace, entity_id, period_kind, period_index, value)
            .await
        {
            Ok(_) => true,
            Err(GoalError::Validation(e)) => {
                warn!(entity = %entity_id, %period_kind, period_index, "Rejected goal value: {}", e);
                false
            }
            Err(GoalError::Storage(e)) => {
                warn!(entity = %entity_id, %period_kind, period_index, error = %e, "Failed to persist goal value");
                false
            }
        }
    }

    pub async fn get(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        period_kind: PeriodKind,
        period_index: u32,
    ) -> Option<f64> {
        let key = MetaKey::new(namespace, entity_id.clone(), period_kind, period_index);
        match self.backend.get(&key).await {
            Ok(Some(record)) => {
                debug!(key = %key, value = record.value, "Goal value loaded from storage");
                Some(record.value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Goal storage read failed, treating as absent");
                None
            }
        }
    }

    pub async fn delete(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        period_kind: PeriodKind,
        period_index: u32,
    ) {
        let key = MetaKey::new(namespace, entity_id.clone(), period_kind, period_index);
        match self.backend.delete(&key).await {
            Ok(()) => info!(key = %key, "Goal value deleted"),
            Err(e) => warn!(key = %key, error = %e, "Failed to delete goal value"),
        }
    }

    pub async fn list_all(&self, namespace: Namespace, entity_id: &EntityId) -> Vec<MetaRecord> {
        match self.backend.list(namespace, entity_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(%namespace, entity = %entity_id, error = %e, "Failed to list goal values");
                Vec::new()
            }
        }
    }

    pub async fn clear(&self) -> bool {
        match self.backend.clear().await {
            Ok(removed) => {
                info!(removed, "Goal storage cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear goal storage");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::repositories::MemoryMetaStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl MetaStore for BrokenStore {
        async fn put(&self, _key: &MetaKey, _value: f64) -> Result<MetaRecord, StoreError> {
            Err(StoreError::QuotaExceeded("full".into()))
        }
        async fn get(&self, key: &MetaKey) -> Result<Option<MetaRecord>, StoreError> {
            Err(StoreError::Corrupt {
                key: key.storage_key(),
                reason: "bad bytes".into(),
            })
        }
        async fn delete(&self, _key: &MetaKey) -> Result<(), StoreError> {
            Err(StoreError::QuotaExceeded("full".into()))
        }
        async fn list(
            &self,
            _namespace: Namespace,
            _entity_id: &EntityId,
        ) -> Result<Vec<MetaRecord>, StoreError> {
            Err(StoreError::QuotaExceeded("full".into()))
        }
        async fn clear(&self) -> Result<u64, StoreError> {
            Err(StoreError::QuotaExceeded("full".into()))
        }
        async fn health_check(&self) -> Result<(), StoreError> {
            Err(StoreError::QuotaExceeded("full".into()))
        }
    }

    fn memory_store() -> KeyedValueStore {
        KeyedValueStore::new(Arc::new(MemoryMetaStore::new()))
    }

    #[test]
    fn test_validate_entry() {
        assert!(KeyedValueStore::validate_entry(PeriodKind::Monthly, 0, 0.0).is_ok());
        assert!(KeyedValueStore::validate_entry(PeriodKind::Monthly, 0, f64::NAN).is_err());
        assert_eq!(
            KeyedValueStore::validate_entry(PeriodKind::Monthly, 0, f64::INFINITY),
            Err(ValidationError::NonFinite(f64::INFINITY))
        );
        assert_eq!(
            KeyedValueStore::validate_entry(PeriodKind::Daily, 0, -1.0),
            Err(ValidationError::Negative(-1.0))
        );
        assert_eq!(
            KeyedValueStore::validate_entry(PeriodKind::Monthly, 12, 1.0),
            Err(ValidationError::IndexOutOfRange {
                kind: PeriodKind::Monthly,
                index: 12
            })
        );
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = memory_store();
        let id = EntityId::from(33u32);

        assert!(store.put(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5, 800.0).await);
        assert_eq!(
            store.get(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5).await,
            Some(800.0)
        );

        store.delete(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5).await;
        store.delete(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5).await;
        assert_eq!(
            store.get(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5).await,
            None
        );
    }

    #[tokio::test]
    async fn test_rejected_put_writes_nothing() {
        let store = memory_store();
        let id = EntityId::from(33u32);

        assert!(!store.put(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 5, -3.0).await);
        assert!(!store.put(Namespace::ConsumptionGoal, &id, PeriodKind::Daily, 31, 3.0).await);
        assert!(store.list_all(Namespace::ConsumptionGoal, &id).await.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failures_degrade() {
        let store = KeyedValueStore::new(Arc::new(BrokenStore));
        let id = EntityId::from(33u32);

        assert!(!store.put(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 1, 5.0).await);
        assert_eq!(
            store.get(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 1).await,
            None
        );
        assert!(store.list_all(Namespace::ConsumptionGoal, &id).await.is_empty());
        assert!(!store.clear().await);
        store.delete(Namespace::ConsumptionGoal, &id, PeriodKind::Monthly, 1).await;
    }

    #[tokio::test]
    async fn test_try_put_reports_storage_error() {
        let store = KeyedValueStore::new(Arc::new(BrokenStore));
        let err = store
            .try_put(
                Namespace::ActivationGoal,
                &EntityId::from(33u32),
                PeriodKind::Daily,
                1,
                5.0,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GoalError::Storage(StoreError::QuotaExceeded(_))));
    }
}
