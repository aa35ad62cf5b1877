//! Router assembly: HTTP endpoints, WebSocket upgrades, SPA page routes, static files, CORS,
//! and HTTP tracing.

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::pages::PageRoute;
use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSockets at `/ws/games` and `/ws/assessment`
/// - REST-ish API under `/api/v1/...`
/// - Named page routes, each serving the SPA's index.html
/// - Static assets from `static_dir` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_dir = Path::new(&state.config.static_dir);
    let index = static_dir.join("index.html");
    let static_service = ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(&index));

    let mut router = Router::new()
        // WebSockets
        .route("/ws/games", get(ws::ws_games_upgrade))
        .route("/ws/assessment", get(ws::ws_assessment_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/catalog", get(http::http_catalog))
        .route("/api/v1/catalog/:category/:game", get(http::http_game))
        .route("/api/v1/answer-key", get(http::http_answer_key))
        .route("/api/v1/code-checklist", get(http::http_code_checklist))
        .route("/api/v1/students", get(http::http_list_students).post(http::http_create_student))
        .route("/api/v1/students/:id", get(http::http_get_student))
        .route("/api/v1/results", get(http::http_results));

    // Pages
    for page in PageRoute::registered() {
        router = router.route_service(page.path(), ServeFile::new(&index));
    }

    router
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend assets
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::AppConfig;

    fn app(static_dir: &Path) -> Router {
        let config = AppConfig { static_dir: static_dir.display().to_string(), ..AppConfig::default() };
        build_router(Arc::new(AppState::in_memory(config).unwrap()))
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_catalog() {
        let dir = TempDir::new().unwrap();
        let app = app(dir.path());
        assert_eq!(call(&app, get_req("/api/v1/health")).await, (StatusCode::OK, json!({ "ok": true })));

        let (status, body) = call(&app, get_req("/api/v1/catalog")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 6);
        assert_eq!(body[4]["games"][0]["game_type"], "auditory_processing");

        let (status, body) = call(&app, get_req("/api/v1/catalog/5/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "bingo-bug-on-jug");
        assert_eq!(body["cards"].as_array().unwrap().len(), 2);

        let (status, body) = call(&app, get_req("/api/v1/catalog/9/0")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("category 9"));
    }

    #[tokio::test]
    async fn answer_key_and_checklist() {
        let dir = TempDir::new().unwrap();
        let app = app(dir.path());
        let (_, body) = call(&app, get_req("/api/v1/answer-key?game=ben-bun&variant=posttest")).await;
        assert_eq!(body["title"], "Ben Bun");
        assert_eq!(body["variant"], "posttest");

        let (_, body) = call(&app, get_req("/api/v1/answer-key?game=unknown")).await;
        assert_eq!(body["slug"], "fat-cat-sat");
        assert_eq!(body["variant"], "pretest");

        let (_, body) = call(&app, get_req("/api/v1/code-checklist?variant=posttest")).await;
        assert_eq!(body["total"], 50);
        assert_eq!(body["columns"][1]["items"][8]["grapheme"], "sh");
    }

    #[tokio::test]
    async fn student_crud() {
        let dir = TempDir::new().unwrap();
        let app = app(dir.path());

        let (status, body) = call(&app, post_json("/api/v1/students", json!({ "name": " ", "grade": "Grade 1" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "name is required");

        let (status, body) =
            call(&app, post_json("/api/v1/students", json!({ "name": "Maria", "grade": "Grade 2" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_u64().unwrap();

        let (status, body) = call(&app, get_req(&format!("/api/v1/students/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grade"], "Grade 2");
        assert_eq!(body["pre_test_url"], format!("/pre-test?student={}", id));
        assert_eq!(body["post_test_url"], format!("/post-test?student={}", id));

        let (_, body) = call(&app, get_req("/api/v1/students")).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, _) = call(&app, get_req("/api/v1/students/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn results_start_empty() {
        let dir = TempDir::new().unwrap();
        let app = app(dir.path());
        let (status, body) = call(&app, get_req("/api/v1/results?variant=pretest")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn page_routes_serve_the_spa_index() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>phonics</html>").unwrap();
        let app = app(dir.path());
        for path in ["/", "/pre-test", "/games/answer-key?game=ben-bun", "/tests/code/teacher?variant=posttest"] {
            let resp = app.clone().oneshot(get_req(path)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{}", path);
            let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], b"<html>phonics</html>");
        }
    }
}
