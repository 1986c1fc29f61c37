use axum::{
    extract::Request,
    routing::{delete, get},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::Level;

use super::handlers::{consumption, devices, goals, health, validation, AppState};

pub fn create_router(state: AppState) -> Router {
    // Health check
    let public_routes = Router::new().route("/health", get(health::health_check));

    let api_routes = Router::new()
        .route("/api/v1/devices", get(devices::list_devices))
        .route(
            "/api/v1/devices/{device_id}/goals/{goal}",
            get(goals::list_goals),
        )
        .route(
            "/api/v1/devices/{device_id}/goals/{goal}/{period}/{index}",
            get(goals::resolve_goal)
                .put(goals::save_goal)
                .delete(goals::delete_goal),
        )
        .route("/api/v1/goals", delete(goals::clear_goals))
        .route(
            "/api/v1/devices/{device_id}/consumption",
            get(consumption::get_consumption),
        )
        .route(
            "/api/v1/devices/{device_id}/validation",
            get(validation::validate_device),
        );

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::span!(
                        Level::INFO,
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(|_request: &Request, _span: &tracing::Span| {
                    tracing::event!(Level::DEBUG, "received request");
                })
                .on_response(
                    |response: &axum::response::Response,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(
                            Level::INFO,
                            status = response.status().as_u16(),
                            latency = ?latency,
                            "request completed"
                        );
                    },
                )
                .on_failure(
                    |_error: tower_http::classify::ServerErrorsFailureClass,
                     _latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::event!(Level::ERROR, "request failed");
                    },
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, DeviceDataSource};
    use crate::config::DeviceInfo;
    use crate::models::{DeviceData, EntityId};
    use crate::repositories::MemoryMetaStore;
    use crate::services::{GoalDefaults, KeyedValueStore, MetaResolver};
    use async_trait::async_trait;
    use axum::{body::Body, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct EmptySource;

    #[async_trait]
    impl DeviceDataSource for EmptySource {
        async fn fetch(&self, _device_id: &EntityId) -> Result<DeviceData, ClientError> {
            Ok(DeviceData::default())
        }
    }

    fn router() -> Router {
        let store = KeyedValueStore::new(Arc::new(MemoryMetaStore::new()));
        create_router(AppState {
            resolver: MetaResolver::new(store, GoalDefaults::default()),
            source: Arc::new(EmptySource),
            devices: Arc::new(vec![DeviceInfo {
                id: EntityId::from(33u32),
                name: "Bomba CAG".into(),
                location: None,
            }]),
        })
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_routes_resolve() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
        assert_eq!(status_of("/api/v1/devices").await, StatusCode::OK);
        assert_eq!(
            status_of("/api/v1/devices/33/goals/consumption/monthly/0").await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_unknown_paths() {
        assert_eq!(status_of("/api/v1/nothing").await, StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("/api/v1/devices/99/goals/consumption").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of("/api/v1/devices/33/goals/cost").await,
            StatusCode::BAD_REQUEST
        );
    }
}
