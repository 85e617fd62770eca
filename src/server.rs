use crate::store::ListingsStore;
use crate::tasks::feed_once;
use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Extension, Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "jobs-feed",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// The CSV feed endpoint (GET and POST, like the trigger it replaces).
///
/// Transform-level problems never surface here; a document that cannot be
/// decoded still renders as a header-only feed with status 200. Only a
/// failure to reach the store answers 500.
async fn jobs_csv(Extension(store): Extension<Arc<dyn ListingsStore>>) -> impl IntoResponse {
    info!("jobs feed requested");
    match feed_once(store).await {
        Ok(run) => ([(header::CONTENT_TYPE, "text/csv")], run.csv).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Create the HTTP server with all routes
pub fn create_server(store: Arc<dyn ListingsStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/jobs.csv", get(jobs_csv).post(jobs_csv))
        .layer(Extension(store))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    store: Arc<dyn ListingsStore>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_server(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP server running on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📄 CSV feed:     http://localhost:{port}/jobs.csv");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
