use analytics::MetricEngine;
use axum::{routing::get, Router};
use configuration::Config;
use dashboard::Dashboard;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialised by the binary, never here.

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// Only immutable configuration lives here; every request renders with its
/// own generator.
pub struct AppState {
    pub dashboard: Dashboard,
    pub engine: MetricEngine,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            dashboard: Dashboard::new(config),
            engine: MetricEngine::new(),
        }
    }
}

/// Builds the router with all API routes and middleware.
pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/panels/:topic", get(handlers::get_panel))
        .route("/api/cost", get(handlers::get_cost))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState::new(config));
    let app = app(app_state);

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let app = app(Arc::new(AppState::new(Config::stock())));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn health_check() {
        let app = app(Arc::new(AppState::new(Config::stock())));
        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn dashboard_returns_every_panel() {
        let (status, body) = get_json("/api/dashboard?seed=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seed"], 3);
        assert_eq!(body["panels"].as_array().unwrap().len(), 3);
        assert_eq!(body["panels"][0]["kind"], "trend");
        assert_eq!(body["panels"][0]["report"]["anomalies"], serde_json::json!([5, 12, 20]));
    }

    #[tokio::test]
    async fn same_seed_renders_identically() {
        let (_, a) = get_json("/api/panels/compressor_efficiency?seed=8").await;
        let (_, b) = get_json("/api/panels/compressor_efficiency?seed=8").await;
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn heatmap_filters_equipment() {
        let (status, body) = get_json("/api/panels/energy_loss?equipment=furnace,boiler").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cells"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_topic_is_not_found() {
        let (status, body) = get_json("/api/panels/weather").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("weather"));
    }

    #[tokio::test]
    async fn unknown_equipment_is_bad_request() {
        let (status, _) = get_json("/api/dashboard?equipment=turbine").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_selection_is_reported_to_the_user() {
        let (status, body) = get_json("/api/dashboard?hour_start=6&hour_end=18").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("empty series"));
    }

    #[tokio::test]
    async fn cost_endpoint_multiplies() {
        let (status, body) = get_json("/api/cost?total_loss=1000&rate=4.2").await;
        assert_eq!(status, StatusCode::OK);
        assert!((body["cost"].as_f64().unwrap() - 4200.0).abs() < 1e-9);

        let (status, _) = get_json("/api/cost?total_loss=NaN&rate=4.2").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_bad_request() {
        let (status, body) = get_json("/api/cost?total_loss=1000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("rate")));

        let (status, body) = get_json("/api/cost?total_loss=lots&rate=4.2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = get_json("/api/dashboard?seed=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
