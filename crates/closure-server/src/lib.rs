pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use closure_core::config::Settings;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(settings: Settings) -> Router {
    let app_state = state::AppState::new(settings);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Catalog
        .route("/api/jira/labels", get(routes::catalog::list_labels))
        .route("/api/jira/components", get(routes::catalog::list_components))
        .route("/api/init-data", get(routes::catalog::init_data))
        // Ticket filters
        .route(
            "/api/jira/filter-tickets",
            post(routes::tickets::filter_tickets),
        )
        .route(
            "/api/filter-dev-released-tickets",
            post(routes::tickets::filter_dev_released),
        )
        .route(
            "/api/jira/release-version-missing",
            post(routes::tickets::release_version_missing),
        )
        // Bugs
        .route("/api/jira/found-bugs", post(routes::bugs::found_bugs))
        .route("/api/jira/previous-bugs", post(routes::bugs::previous_bugs))
        .route(
            "/api/previous-bugs-summary",
            post(routes::bugs::previous_bugs_summary),
        )
        // Summaries
        .route("/api/jira/summary", post(routes::summary::status_summary))
        .route("/api/summary", post(routes::summary::status_counts))
        .route(
            "/api/jira/tested-area",
            post(routes::summary::tested_area_digest),
        )
        // Notifications
        .route("/api/inform-dev", post(routes::notify::inform_developers))
        .route(
            "/api/jira/inform-dev",
            post(routes::notify::inform_developers_by_key),
        )
        .route(
            "/api/email-product-team",
            post(routes::notify::email_product_team),
        )
        // Closure email
        .route(
            "/api/closure-email/send",
            post(routes::closure::send_closure_email),
        )
        .route(
            "/api/closure-email/preview",
            post(routes::closure::preview_closure_email),
        )
        .route(
            "/api/generate-closure-email",
            post(routes::closure::generate_closure_email),
        )
        // Tracking issue
        .route("/api/jira/submit", post(routes::issues::submit_release))
        // Diagnostics
        .route("/api/jira/debug", get(routes::diagnostics::debug_sample))
        .route("/api/jira/test-jql", post(routes::diagnostics::test_jql))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn warn_partial_config(settings: &Settings) {
    if let Err(e) = settings.jira() {
        tracing::warn!("{e}; tracker endpoints will fail");
    }
    if let Err(e) = settings.smtp() {
        tracing::warn!("{e}; mail endpoints will fail");
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
    }
}

/// Start the closure API server on `host:port`.
pub async fn serve(settings: Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    serve_on(settings, listener).await
}

/// Start the closure API server on a pre-bound listener.
///
/// Unlike `serve`, this accepts a `TcpListener` that was already bound so the
/// caller can read the actual port before starting (useful when `port = 0` and
/// the OS picks a free port).
pub async fn serve_on(settings: Settings, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    warn_partial_config(&settings);
    let app = build_router(settings);

    tracing::info!("closure API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
