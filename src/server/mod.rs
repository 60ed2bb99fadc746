//! Web surface — Axum server for the wagering app.
//!
//! Serves a JSON API plus two self-contained HTML pages (landing and
//! play). CORS enabled for local development.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

/// The embedded pages (compiled into the binary).
const LANDING_HTML: &str = include_str!("templates/landing.html");
const PLAY_HTML: &str = include_str!("templates/play.html");

/// Serve the app until shutdown is requested.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    info!(port, "Server starting on http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
        })
        .await
        .context("Server error")?;

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        // API routes
        .route("/api/auth/signup", post(routes::sign_up))
        .route("/api/auth/signin", post(routes::sign_in))
        .route("/api/auth/signout", post(routes::sign_out))
        .route("/api/game", get(routes::get_active_game))
        .route("/api/entries", get(routes::get_entries).post(routes::submit_entry))
        .route("/api/history", get(routes::get_history))
        .route("/health", get(routes::health))
        // HTML pages
        .route("/", get(serve_landing))
        .route("/play", get(serve_play))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded landing page.
async fn serve_landing() -> Html<&'static str> {
    Html(LANDING_HTML)
}

/// Serve the embedded play page.
async fn serve_play() -> Html<&'static str> {
    Html(PLAY_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockAuthGateway, MockWagerStore};
    use crate::server::routes::AppContext;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let mut store = MockWagerStore::new();
        store.expect_active_game().returning(|| Ok(None));
        Arc::new(AppContext {
            store: Arc::new(store),
            auth: Arc::new(MockAuthGateway::new()),
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_game_endpoint_null_when_no_game() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/api/game").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 10_000).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.is_null());
    }

    #[tokio::test]
    async fn test_history_without_token_is_unauthorized() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/api/history").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_landing_page() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("UniqueWager"));
        assert!(html.contains("Get Started"));
    }

    #[tokio::test]
    async fn test_play_page() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::builder().uri("/play").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), 100_000).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Submit Your Answer"));
    }
}
