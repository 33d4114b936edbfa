// src/server/mod.rs
// =============================================================================
// A small HTTP server around the checker.
//
// Features:
// - JSON API under /api (see routes.rs)
// - Serves a built frontend from the static directory, if it exists, with
//   index.html as the fallback for client-side routes
// - CORS for the configured origin
// - Request tracing, a 1 MiB body limit, and a JSON 500 for handler panics
//
// Rust concepts:
// - axum Router: Maps paths and methods to async handler functions
// - State: Shared, cloneable application data handed to every handler
// - tower layers: Middleware wrapped around the whole router
// =============================================================================

mod routes;

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use tokio::net::TcpListener;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::checker::Checker;
use crate::config::ServerConfig;

/// Largest accepted request body
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

// Data shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub checker: Checker,
}

// Builds the application router
//
// Fails only if the configured CORS origin is not a valid header value.
pub fn create_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    // API routes first; anything under /api that is not one of them gets
    // the JSON 404 ("/api" and "/api/" are not matched by "/api/*rest")
    let mut router = Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/check", post(routes::check))
        .route("/api", any(routes::api_not_found))
        .route("/api/", any(routes::api_not_found))
        .route("/api/*rest", any(routes::api_not_found))
        .with_state(state);

    // A built frontend, if one is present
    if config.static_dir.is_dir() {
        info!(dir = %config.static_dir.display(), "serving static files");
        let index = ServeFile::new(config.static_dir.join("index.html"));
        let files = ServeDir::new(&config.static_dir).fallback(index);
        router = router.fallback(move |request: Request| frontend(files.clone(), request));
    }

    with_middleware(router, config)
}

// Wraps a router in the layers every response goes through
//
// Outermost first: panic catcher, request tracing, CORS, body limit.
fn with_middleware(router: Router, config: &ServerConfig) -> Result<Router> {
    let origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin '{}'", config.cors_origin))?;

    // Browsers on the configured origin may call GET and POST with JSON
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(router.layer(
        ServiceBuilder::new()
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)),
    ))
}

// Serves a static file, or index.html for client-side routes
//
// Paths starting with /api (including "/apix") never reach the frontend;
// they get the JSON 404 instead.
async fn frontend(files: ServeDir<ServeFile>, request: Request) -> Response {
    if request.uri().path().starts_with("/api") {
        return routes::api_not_found().await.into_response();
    }

    // ServeDir with a ServeFile fallback cannot fail (its error is Infallible)
    match files.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

// Runs the server until Ctrl-C
pub async fn serve(config: ServerConfig, checker: Checker) -> Result<()> {
    let default_timeout_ms = checker.default_timeout_ms();
    let app = create_router(AppState { checker }, &config)?;

    // Bind first so a busy port is reported before anything else happens
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        address = %addr,
        default_timeout_ms,
        "URL Health Checker server listening"
    );

    // Serve until Ctrl-C, then let in-flight checks finish
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler the server simply runs until killed
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

// Turns a panic inside a handler into the JSON 500 body
//
// The panic payload is not echoed back to the client.
fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "ok": false, "error": "Internal server error." })),
    )
        .into_response()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is a Router?
//    - A table of (path, method) -> handler
//    - .route() adds entries, .fallback() handles everything unmatched
//    - .with_state() hands AppState to handlers that ask for State<AppState>
//
// 2. What is a layer?
//    - Middleware that wraps a service and sees every request and response
//    - ServiceBuilder stacks layers; the first one listed is the outermost
//
// 3. What is oneshot?
//    - From tower::ServiceExt: waits until a service is ready, then calls it
//      once with a single request
//    - Used here to pass a request on to ServeDir, and in tests to call the
//      whole router without opening a socket
//
// 4. What is `match never {}`?
//    - Infallible has no values, so an Err(Infallible) can never exist
//    - An empty match on it proves that to the compiler without a panic
//
// 5. What is graceful shutdown?
//    - axum stops accepting new connections when the signal future finishes
//    - Requests already in flight are allowed to complete
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::DEFAULT_TIMEOUT_MS;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> ServerConfig {
        ServerConfig {
            static_dir: "definitely-not-a-directory".into(),
            ..ServerConfig::default()
        }
    }

    fn app(config: &ServerConfig) -> Router {
        let checker = Checker::new(DEFAULT_TIMEOUT_MS).unwrap();
        create_router(AppState { checker }, config).unwrap()
    }

    fn post_check(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/check")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(&test_config()), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "url-health-checker");
        assert!(body["at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_check_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let url = format!("{}/page", server.uri());

        let (status, body) = send(
            app(&test_config()),
            post_check(json!({ "url": url, "timeoutMs": 2000 })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["url"], url.as_str());
        assert_eq!(body["finalUrl"], url.as_str());
        assert_eq!(body["status"], 200);
        assert!(body["responseTimeMs"].is_u64());
        assert!(body["checkedAt"].is_string());
    }

    #[tokio::test]
    async fn test_missing_url_is_bad_request() {
        let (status, body) = send(app(&test_config()), post_check(json!({}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "ok": false, "error": "URL is required." }));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_bad_request() {
        let (status, body) =
            send(app(&test_config()), post_check(json!({ "url": "ftp://host" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only HTTP and HTTPS URLs are supported.");
    }

    #[tokio::test]
    async fn test_out_of_range_timeout_is_bad_request() {
        for timeout in [0, -10, 499, 20_001] {
            let (status, body) = send(
                app(&test_config()),
                post_check(json!({ "url": "example.com", "timeoutMs": timeout })),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "timeout {}", timeout);
            assert_eq!(body["error"], "timeoutMs must be between 500 and 20000.");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/check")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(&test_config()), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], routes::INVALID_BODY);
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
            .mount(&server)
            .await;

        let (status, body) = send(
            app(&test_config()),
            post_check(json!({ "url": server.uri(), "timeoutMs": 500 })),
        )
        .await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body, json!({ "ok": false, "error": "Request timeout." }));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_bad_gateway() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let (status, body) = send(
            app(&test_config()),
            post_check(json!({ "url": format!("http://127.0.0.1:{}", port) })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, json!({ "ok": false, "error": "Failed to check URL." }));
    }

    #[tokio::test]
    async fn test_unknown_api_path_is_not_found() {
        let request = Request::builder().uri("/api/nope").body(Body::empty()).unwrap();
        let (status, body) = send(app(&test_config()), request).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["ok"], false);
    }

    #[tokio::test]
    async fn test_static_files_and_index_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>checker</h1>").unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();
        let config = ServerConfig {
            static_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };

        for (uri, expected) in [
            ("/app.js", "console.log(1)"),
            ("/history/latest", "<h1>checker</h1>"),
        ] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app(&config).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert_eq!(&bytes[..], expected.as_bytes());
        }

        // API paths never fall through to the frontend
        for uri in ["/api", "/api/", "/api/missing", "/apix", "/api-docs/page"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, body) = send(app(&config), request).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body, json!({ "ok": false, "error": "Not found." }), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_bare_api_paths_are_json_not_found_without_frontend() {
        for uri in ["/api", "/api/"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let (status, body) = send(app(&test_config()), request).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body["ok"], false);
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let huge = "a".repeat(2 * BODY_LIMIT_BYTES);
        let (status, body) =
            send(app(&test_config()), post_check(json!({ "url": huge }))).await;

        assert!(status.is_client_error(), "got {}", status);
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], routes::INVALID_BODY);
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_json_500() {
        let router = Router::new().route("/boom", get(explode));
        let app = with_middleware(router, &test_config()).unwrap();

        let request = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "ok": false, "error": "Internal server error." }));
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app(&test_config()).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );

        // Preflight for the JSON POST a browser sends before /api/check
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/check")
            .header("origin", "http://localhost:5173")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app(&test_config()).oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_cors_never_echoes_other_origins() {
        let request = Request::builder()
            .uri("/api/health")
            .header("origin", "https://elsewhere.example")
            .body(Body::empty())
            .unwrap();
        let response = app(&test_config()).oneshot(request).await.unwrap();

        // The single allowed origin is sent back, so the browser blocks this caller
        let allowed = response.headers().get("access-control-allow-origin");
        assert_ne!(allowed.map(|v| v.as_bytes()), Some(&b"https://elsewhere.example"[..]));
    }

    #[test]
    fn test_invalid_cors_origin_is_rejected() {
        let config = ServerConfig {
            cors_origin: "bad\norigin".to_string(),
            ..test_config()
        };
        let checker = Checker::new(DEFAULT_TIMEOUT_MS).unwrap();
        assert!(create_router(AppState { checker }, &config).is_err());
    }
}
