use async_trait::async_trait;
use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::RemoteApiConfig;
use crate::models::{DeviceData, EntityId};

/// Metrics API error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}

/// Anything that can produce a device's metrics body.
#[async_trait]
pub trait DeviceDataSource: Send + Sync {
    async fn fetch(&self, device_id: &EntityId) -> Result<DeviceData, ClientError>;
}

/// Client for the remote per-device metrics endpoint.
#[derive(Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    base_url: String,
    include_history: bool,
}

impl MetricsClient {
    pub fn new(cfg: &RemoteApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
            include_history: cfg.include_history,
        })
    }

    /// Build `{base_url}?device_id={id}&historico={bool}`.
    pub fn device_url(&self, device_id: &EntityId) -> Result<reqwest::Url, ClientError> {
        reqwest::Url::parse_with_params(
            &self.base_url,
            &[
                ("device_id", device_id.as_str()),
                ("historico", if self.include_history { "true" } else { "false" }),
            ],
        )
        .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))
    }
}

#[async_trait]
impl DeviceDataSource for MetricsClient {
    async fn fetch(&self, device_id: &EntityId) -> Result<DeviceData, ClientError> {
        let url = self.device_url(device_id)?;
        debug!(device = %device_id, %url, "Fetching device metrics");

        let response = self
            .http
            .get(url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<DeviceData>()
            .await
            .map_err(|e| ClientError::Deserialization(e.to_string()))
    }
}

/// Result of fetching several devices at once.
#[derive(Debug, Default)]
pub struct FleetSnapshot {
    pub data: BTreeMap<EntityId, DeviceData>,
    pub failed: Vec<(EntityId, String)>,
}

/// Fetch every device concurrently. A failing device is recorded in
/// `failed` and never prevents the others from loading.
pub async fn fetch_fleet(source: &dyn DeviceDataSource, device_ids: &[EntityId]) -> FleetSnapshot {
    let results = join_all(device_ids.iter().map(|id| async move {
        let result = source.fetch(id).await;
        (id.clone(), result)
    }))
    .await;

    let mut snapshot = FleetSnapshot::default();
    for (id, result) in results {
        match result {
            Ok(data) => {
                snapshot.data.insert(id, data);
            }
            Err(e) => {
                warn!(device = %id, error = %e, "Device fetch failed, excluded from rollup");
                snapshot.failed.push((id, e.to_string()));
            }
        }
    }

    debug!(
        loaded = snapshot.data.len(),
        failed = snapshot.failed.len(),
        "Fleet fetch complete"
    );
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakySource;

    #[async_trait]
    impl DeviceDataSource for FlakySource {
        async fn fetch(&self, device_id: &EntityId) -> Result<DeviceData, ClientError> {
            if device_id.as_str() == "41" {
                return Err(ClientError::Http {
                    status: 500,
                    message: "boom".into(),
                });
            }
            Ok(DeviceData {
                monthly_consumption: vec![Some(1.0)],
                ..DeviceData::default()
            })
        }
    }

    fn config(base_url: &str, include_history: bool) -> RemoteApiConfig {
        RemoteApiConfig {
            base_url: base_url.into(),
            include_history,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_device_url() {
        let client = MetricsClient::new(&config("http://metrics.local/dev/dados", true)).unwrap();
        let url = client.device_url(&EntityId::from(33u32)).unwrap();
        assert_eq!(
            url.as_str(),
            "http://metrics.local/dev/dados?device_id=33&historico=true"
        );

        let client = MetricsClient::new(&config("http://metrics.local/dados", false)).unwrap();
        let url = client.device_url(&EntityId::from(41u32)).unwrap();
        assert_eq!(url.query(), Some("device_id=41&historico=false"));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = MetricsClient::new(&config("not a url", true)).unwrap();
        assert!(matches!(
            client.device_url(&EntityId::from(33u32)),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_fleet_tolerates_failures() {
        let ids = vec![
            EntityId::from(33u32),
            EntityId::from(41u32),
            EntityId::from(42u32),
        ];

        let snapshot = fetch_fleet(&FlakySource, &ids).await;

        assert_eq!(snapshot.data.len(), 2);
        assert!(snapshot.data.contains_key(&EntityId::from(42u32)));
        assert_eq!(snapshot.failed.len(), 1);
        assert_eq!(snapshot.failed[0].0, EntityId::from(41u32));
    }
}
