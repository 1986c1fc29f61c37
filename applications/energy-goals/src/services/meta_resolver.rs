use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::keyed_store::KeyedValueStore;
use crate::error::{GoalError, ValidationError};
use crate::models::{DeviceData, EntityId, MetaRecord, Namespace, PeriodKind, Series};

pub const DEFAULT_CONSUMPTION_GOAL: f64 = 10000.0;
pub const DEFAULT_DAILY_ACTIVATION_HOURS: f64 = 24.0;
pub const DEFAULT_MONTHLY_ACTIVATION_HOURS: f64 = 720.0;

/// Last-resort goal values, used when neither a stored override nor a
/// remote default exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalDefaults {
    pub consumption_monthly: f64,
    pub consumption_daily: f64,
    pub activation_daily: f64,
    pub activation_monthly: f64,
}

impl Default for GoalDefaults {
    fn default() -> Self {
        Self {
            consumption_monthly: DEFAULT_CONSUMPTION_GOAL,
            consumption_daily: DEFAULT_CONSUMPTION_GOAL,
            activation_daily: DEFAULT_DAILY_ACTIVATION_HOURS,
            activation_monthly: DEFAULT_MONTHLY_ACTIVATION_HOURS,
        }
    }
}

impl GoalDefaults {
    pub fn fallback(&self, namespace: Namespace, kind: PeriodKind) -> f64 {
        match (namespace, kind) {
            (Namespace::ConsumptionGoal, PeriodKind::Monthly) => self.consumption_monthly,
            (Namespace::ConsumptionGoal, PeriodKind::Daily) => self.consumption_daily,
            (Namespace::ActivationGoal, PeriodKind::Monthly) => self.activation_monthly,
            (Namespace::ActivationGoal, PeriodKind::Daily) => self.activation_daily,
        }
    }
}

/// Goal defaults published by the metrics API alongside a device's series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteDefaults {
    pub monthly_consumption: Series,
    pub daily_consumption: Series,
    pub monthly_activation: Series,
    pub daily_activation: Series,
}

impl RemoteDefaults {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn series(&self, namespace: Namespace, kind: PeriodKind) -> &Series {
        match (namespace, kind) {
            (Namespace::ConsumptionGoal, PeriodKind::Monthly) => &self.monthly_consumption,
            (Namespace::ConsumptionGoal, PeriodKind::Daily) => &self.daily_consumption,
            (Namespace::ActivationGoal, PeriodKind::Monthly) => &self.monthly_activation,
            (Namespace::ActivationGoal, PeriodKind::Daily) => &self.daily_activation,
        }
    }

    /// Value at `index`, if the array reaches that far and the slot holds a
    /// finite number.
    pub fn lookup(&self, namespace: Namespace, kind: PeriodKind, index: u32) -> Option<f64> {
        self.series(namespace, kind)
            .get(index as usize)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

impl From<&DeviceData> for RemoteDefaults {
    fn from(data: &DeviceData) -> Self {
        Self {
            monthly_consumption: data.monthly_consumption_goals.clone(),
            daily_consumption: data.daily_consumption_goals.clone(),
            monthly_activation: data.monthly_activation_goals.clone(),
            daily_activation: data.daily_activation_goals.clone(),
        }
    }
}

/// Where a resolved goal value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalSource {
    StoredOverride,
    RemoteDefault,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedGoal {
    pub value: f64,
    pub source: GoalSource,
}

/// Resolves effective goal values through the override, remote and
/// fallback cascade, and owns goal writes.
#[derive(Clone)]
pub struct MetaResolver {
    store: KeyedValueStore,
    defaults: GoalDefaults,
}

impl MetaResolver {
    pub fn new(store: KeyedValueStore, defaults: GoalDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &KeyedValueStore {
        &self.store
    }

    pub fn defaults(&self) -> &GoalDefaults {
        &self.defaults
    }

    /// Stored override first, then the remote default, then the fallback.
    pub async fn resolve(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        remote: &RemoteDefaults,
    ) -> ResolvedGoal {
        let resolved = if let Some(value) = self.store.get(namespace, entity_id, kind, index).await {
            ResolvedGoal {
                value,
                source: GoalSource::StoredOverride,
            }
        } else if let Some(value) = remote.lookup(namespace, kind, index) {
            ResolvedGoal {
                value,
                source: GoalSource::RemoteDefault,
            }
        } else {
            ResolvedGoal {
                value: self.defaults.fallback(namespace, kind),
                source: GoalSource::Fallback,
            }
        };

        debug!(
            entity = %entity_id,
            %namespace,
            %kind,
            index,
            source = ?resolved.source,
            value = resolved.value,
            "Goal resolved"
        );
        resolved
    }

    pub async fn resolve_consumption_goal(
        &self,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        remote: &RemoteDefaults,
    ) -> f64 {
        self.resolve(Namespace::ConsumptionGoal, entity_id, kind, index, remote)
            .await
            .value
    }

    pub async fn resolve_activation_goal(
        &self,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        remote: &RemoteDefaults,
    ) -> f64 {
        self.resolve(Namespace::ActivationGoal, entity_id, kind, index, remote)
            .await
            .value
    }

    /// Validate and persist a goal, keeping the failure reason.
    pub async fn try_save_goal(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        value: f64,
    ) -> Result<MetaRecord, GoalError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(value).into());
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositive(value).into());
        }
        self.store.try_put(namespace, entity_id, kind, index, value).await
    }

    async fn save_goal(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        value: f64,
    ) -> bool {
        match self.try_save_goal(namespace, entity_id, kind, index, value).await {
            Ok(_) => true,
            Err(e) => {
                warn!(entity = %entity_id, %namespace, %kind, index, "Goal not saved: {}", e);
                false
            }
        }
    }

    pub async fn save_consumption_goal(
        &self,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        value: f64,
    ) -> bool {
        self.save_goal(Namespace::ConsumptionGoal, entity_id, kind, index, value)
            .await
    }

    pub async fn save_activation_goal(
        &self,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
        value: f64,
    ) -> bool {
        self.save_goal(Namespace::ActivationGoal, entity_id, kind, index, value)
            .await
    }

    pub async fn delete_goal(
        &self,
        namespace: Namespace,
        entity_id: &EntityId,
        kind: PeriodKind,
        index: u32,
    ) {
        self.store.delete(namespace, entity_id, kind, index).await
    }

    /// Stored overrides of one entity, ordered by period kind then index.
    pub async fn list_goals(&self, namespace: Namespace, entity_id: &EntityId) -> Vec<MetaRecord> {
        let mut records = self.store.list_all(namespace, entity_id).await;
        records.sort_by_key(|r| (r.key.period_kind, r.key.period_index));
        records
    }

    pub async fn clear_goals(&self) -> bool {
        self.store.clear().await
    }
}
