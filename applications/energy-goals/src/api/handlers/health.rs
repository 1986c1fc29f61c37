use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use super::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut response = json!({
        "status": "ok",
        "storage": {
            "connected": false,
        }
    });

    match state.resolver.store().backend().health_check().await {
        Ok(()) => {
            response["storage"]["connected"] = json!(true);
        }
        Err(e) => {
            response["status"] = json!("degraded");
            response["storage"]["error"] = json!(format!("Storage error: {}", e));
        }
    }

    let status = if response["storage"]["connected"].as_bool().unwrap_or(false) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
