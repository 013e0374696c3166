use mongodb::{Client, bson::doc};
use std::time::{Duration, Instant};

/// Outcome of a MongoDB ping
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Driver error text when unhealthy
    pub message: Option<String>,
    pub response_time: Duration,
}

/// Ping `database` and report latency.
///
/// ```ignore
/// let status = database::mongodb::check_health(&client, "store").await;
/// if !status.healthy {
///     tracing::warn!(error = ?status.message, "MongoDB unreachable");
/// }
/// ```
pub async fn check_health(client: &Client, database: &str) -> HealthStatus {
    let start = Instant::now();
    let result = client.database(database).run_command(doc! { "ping": 1 }).await;
    let response_time = start.elapsed();

    match result {
        Ok(_) => HealthStatus {
            healthy: true,
            message: None,
            response_time,
        },
        Err(e) => HealthStatus {
            healthy: false,
            message: Some(e.to_string()),
            response_time,
        },
    }
}
