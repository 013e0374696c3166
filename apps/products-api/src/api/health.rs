//! Health check endpoints

use axum::{extract::State, response::Response, routing::get, Router};
use axum_helpers::server::{health_router, run_health_checks, HealthCheckFuture};
use database::mongodb::check_health;

use crate::state::AppState;

/// Readiness: 200 when MongoDB answers a ping, 503 otherwise
async fn ready(State(state): State<AppState>) -> Response {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "mongodb",
        Box::pin(async {
            let status = check_health(&state.mongo_client, state.db.name()).await;
            if status.healthy {
                tracing::debug!(response_time = ?status.response_time, "MongoDB ping ok");
                Ok(())
            } else {
                Err(status
                    .message
                    .unwrap_or_else(|| "MongoDB ping failed".to_string()))
            }
        }),
    )];

    run_health_checks(checks).await
}

/// `/health` (liveness) and `/ready` (readiness)
pub fn router(state: AppState) -> Router {
    let readiness = Router::new()
        .route("/ready", get(ready))
        .with_state(state.clone());

    health_router(state.config.app).merge(readiness)
}
