use axum::extract::State;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::{ok, Envelope};
use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
///
/// Always answers 200; a store that cannot be reached shows up as `degraded`.
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResult<Envelope<HealthResponse>> {
    let mut services = HashMap::new();

    let status = match state.persist.ping().await {
        Ok(()) => {
            services.insert("database".to_string(), "connected".to_string());
            "healthy"
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check could not reach the store");
            services.insert("database".to_string(), "disconnected".to_string());
            "degraded"
        }
    };

    Ok(ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.persist.backend().to_string(),
        services,
    }))
}
