pub mod consumption;
pub mod devices;
pub mod goals;
pub mod health;
pub mod validation;

use std::sync::Arc;
use tracing::warn;

use crate::{
    api::models::FailedDevice,
    client::{fetch_fleet, DeviceDataSource},
    config::DeviceInfo,
    error::{AppError, Result},
    models::{DeviceData, EntityId, PeriodKind},
    services::{combine, MetaResolver, RemoteDefaults},
};

#[derive(Clone)]
pub struct AppState {
    pub resolver: MetaResolver,
    pub source: Arc<dyn DeviceDataSource>,
    pub devices: Arc<Vec<DeviceInfo>>,
}

impl AppState {
    pub fn device_ids(&self) -> Vec<EntityId> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }

    /// Parse a device path segment and check it against the catalog.
    pub fn known_device(&self, raw: &str) -> Result<EntityId> {
        let id: EntityId = raw.parse().map_err(AppError::InvalidInput)?;
        if id.is_all() || self.devices.iter().any(|d| d.id == id) {
            Ok(id)
        } else {
            Err(AppError::NotFound(format!("Unknown device: {}", id)))
        }
    }

    /// Device data for one device, or the combined fleet for `all`.
    pub async fn load_device_data(&self, id: &EntityId) -> Result<(DeviceData, Vec<FailedDevice>)> {
        if !id.is_all() {
            let data = self.source.fetch(id).await?;
            return Ok((data, Vec::new()));
        }

        let snapshot = fetch_fleet(self.source.as_ref(), &self.device_ids()).await;
        let failed = snapshot
            .failed
            .into_iter()
            .map(|(device_id, error)| FailedDevice { device_id, error })
            .collect();
        Ok((combine(&snapshot.data), failed))
    }

    /// Remote goal defaults for a single device. The fleet rollup has none,
    /// and a failed fetch degrades to none.
    pub async fn remote_defaults(&self, id: &EntityId) -> RemoteDefaults {
        if id.is_all() {
            return RemoteDefaults::none();
        }
        match self.source.fetch(id).await {
            Ok(data) => RemoteDefaults::from(&data),
            Err(e) => {
                warn!(device = %id, error = %e, "Remote goal defaults unavailable");
                RemoteDefaults::none()
            }
        }
    }
}

pub fn parse_period(raw: &str, index: u32) -> Result<PeriodKind> {
    let kind: PeriodKind = raw.parse().map_err(AppError::InvalidInput)?;
    if !kind.contains_index(index) {
        return Err(AppError::InvalidInput(format!(
            "period index {} is out of range for {} goals",
            index, kind
        )));
    }
    Ok(kind)
}
