use super::shutdown::shutdown_signal;
use crate::errors::handlers::not_found;
use crate::http::{cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Wraps the service routes with documentation and cross-cutting layers.
///
/// The returned router serves:
/// - `apis` at the root, state already applied by the domain routers
/// - Swagger UI at `/swagger-ui`, the OpenAPI document at `/api-docs/openapi.json`
/// - a JSON 404 for anything else
///
/// Layers: request tracing, security headers, response compression and,
/// when `server_config.cors_allowed_origins` is non-empty, CORS.
///
/// # Errors
/// Fails if a configured CORS origin is not a valid header value.
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(CompressionLayer::new());

    if let Some(cors) = cors_layer(&server_config.cors_allowed_origins)? {
        info!(origins = ?server_config.cors_allowed_origins, "CORS enabled");
        router = router.layer(cors);
    }

    Ok(router)
}

/// Serves `router` until SIGINT/SIGTERM, then runs `cleanup`.
///
/// In-flight requests are drained first; `cleanup` (closing database clients
/// and the like) is then given `server_config.shutdown_timeout` to finish.
///
/// ```ignore
/// create_production_app(router, &config.server, async move {
///     mongo_client.shutdown().await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    let timeout = server_config.shutdown_timeout;
    info!("Starting cleanup tasks (timeout: {:?})", timeout);
    match tokio::time::timeout(timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => tracing::warn!("Cleanup exceeded timeout of {:?}, forcing shutdown", timeout),
    }

    serve_result
}
