use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::MetaStore;
use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{EntityId, MetaKey, MetaRecord, Namespace, PeriodKind};

#[derive(Debug, sqlx::FromRow)]
struct GoalRow {
    namespace: String,
    entity_id: String,
    period_kind: String,
    period_index: i64,
    value: f64,
    updated_at: DateTime<Utc>,
}

impl GoalRow {
    fn into_record(self) -> Result<MetaRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            key: format!(
                "{}/{}/{}/{}",
                self.namespace, self.entity_id, self.period_kind, self.period_index
            ),
            reason,
        };

        let namespace = Namespace::from_storage_prefix(&self.namespace)
            .ok_or_else(|| corrupt(format!("unknown namespace {}", self.namespace)))?;
        let period_kind: PeriodKind = self.period_kind.parse().map_err(corrupt)?;
        let period_index = u32::try_from(self.period_index)
            .map_err(|_| corrupt(format!("invalid period index {}", self.period_index)))?;
        let entity_id: EntityId = self.entity_id.parse().map_err(corrupt)?;

        Ok(MetaRecord {
            key: MetaKey::new(namespace, entity_id, period_kind, period_index),
            value: self.value,
            updated_at: self.updated_at,
        })
    }
}

/// Goal store backed by an embedded SQLite database.
#[derive(Clone)]
pub struct SqliteMetaStore {
    pool: DbPool,
}

impl SqliteMetaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetaStore for SqliteMetaStore {
    async fn put(&self, key: &MetaKey, value: f64) -> Result<MetaRecord, StoreError> {
        let now = Utc::now();

        // Single statement upsert; SQLite applies it atomically.
        sqlx::query(
            r#"
            INSERT INTO meta_goals (
                namespace, entity_id, period_kind, period_index, value, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (namespace, entity_id, period_kind, period_index) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key.namespace.storage_prefix())
        .bind(key.entity_id.as_str())
        .bind(key.period_kind.as_str())
        .bind(i64::from(key.period_index))
        .bind(value)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(MetaRecord {
            key: key.clone(),
            value,
            updated_at: now,
        })
    }

    async fn get(&self, key: &MetaKey) -> Result<Option<MetaRecord>, StoreError> {
        let row = sqlx::query_as::<_, GoalRow>(
            r#"
            SELECT namespace, entity_id, period_kind, period_index, value, updated_at
            FROM meta_goals
            WHERE namespace = ? AND entity_id = ? AND period_kind = ? AND period_index = ?
            "#,
        )
        .bind(key.namespace.storage_prefix())
        .bind(key.entity_id.as_str())
        .bind(key.period_kind.as_str())
        .bind(i64::from(key.period_index))
        .fetch_optional(&self.pool)
        .await?;

        row.map(GoalRow::into_record).transpose()
    }

    async fn delete(&self, key: &MetaKey) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            DELETE FROM meta_goals
            WHERE namespace = ? AND entity_id = ? AND period_kind = ? AND period_index = ?
            "#,
        )
        .bind(key.namespace.storage_prefix())
        .bind(key.entity_id.as_str())
        .bind(key.period_kind.as_str())
        .bind(i64::from(key.period_index))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
    ) -> Result<Vec<MetaRecord>, StoreError> {
        let rows = sqlx::query_as::<_, GoalRow>(
            r#"
            SELECT namespace, entity_id, period_kind, period_index, value, updated_at
            FROM meta_goals
            WHERE namespace = ? AND entity_id = ?
            ORDER BY updated_at DESC
            "#,
        )
        .bind(namespace.storage_prefix())
        .bind(entity_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GoalRow::into_record).collect()
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM meta_goals")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::db;

    async fn store() -> SqliteMetaStore {
        let cfg = DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
        };
        let pool = db::connect(&cfg).await.unwrap();
        db::migrate(&pool).await.unwrap();
        SqliteMetaStore::new(pool)
    }

    fn key(entity: u32, kind: PeriodKind, index: u32) -> MetaKey {
        MetaKey::new(Namespace::ConsumptionGoal, EntityId::from(entity), kind, index)
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = store().await;
        let k = key(33, PeriodKind::Monthly, 5);

        store.put(&k, 4200.0).await.unwrap();
        let record = store.get(&k).await.unwrap().unwrap();

        assert_eq!(record.key, k);
        assert_eq!(record.value, 4200.0);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = store().await;
        assert!(store.get(&key(33, PeriodKind::Daily, 2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_without_duplicates() {
        let store = store().await;
        let k = key(36, PeriodKind::Monthly, 1);

        store.put(&k, 100.0).await.unwrap();
        store.put(&k, 250.0).await.unwrap();

        let records = store
            .list(Namespace::ConsumptionGoal, &EntityId::from(36u32))
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 250.0);
    }

    #[tokio::test]
    async fn test_namespaces_do_not_collide() {
        let store = store().await;
        let consumption = key(37, PeriodKind::Daily, 3);
        let activation = MetaKey {
            namespace: Namespace::ActivationGoal,
            ..consumption.clone()
        };

        store.put(&consumption, 900.0).await.unwrap();
        store.put(&activation, 20.0).await.unwrap();

        assert_eq!(store.get(&consumption).await.unwrap().unwrap().value, 900.0);
        assert_eq!(store.get(&activation).await.unwrap().unwrap().value, 20.0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = store().await;
        let k = key(38, PeriodKind::Monthly, 0);

        store.put(&k, 1.0).await.unwrap();
        store.delete(&k).await.unwrap();
        store.delete(&k).await.unwrap();

        assert!(store.get(&k).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = store().await;
        store.put(&key(39, PeriodKind::Monthly, 0), 1.0).await.unwrap();
        store.put(&key(40, PeriodKind::Daily, 0), 2.0).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store
            .list(Namespace::ConsumptionGoal, &EntityId::from(39u32))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let store = store().await;
        assert!(store.health_check().await.is_ok());
    }
}
