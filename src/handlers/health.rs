use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn root_handler() -> &'static str {
    "Sahayak Backend Server"
}

pub async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match state.users.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!("Health check ping failed: {}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
