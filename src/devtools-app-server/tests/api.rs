//! End-to-end tests driving the router in-process.

use std::fs;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use devtools_app_server::config::{AuthConfig, DenyConfig};
use devtools_app_server::{AppState, ServerConfig, create_router};

const KEY: &str = "test-key";

fn config_for(temp_dir: &TempDir, api_key: Option<&str>) -> ServerConfig {
    ServerConfig {
        root: temp_dir.path().to_path_buf(),
        auth: AuthConfig {
            api_key: api_key.map(String::from),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("private")).unwrap();
    fs::write(root.join("a/b.txt"), "hello\nworld\n").unwrap();
    fs::write(root.join("a/.env"), "TOKEN=hello").unwrap();
    fs::write(root.join("notes.md"), "version 1.2\nversion 1x2\n").unwrap();
    fs::write(root.join("private/p.txt"), "hello").unwrap();
    temp_dir
}

fn app_with(config: ServerConfig) -> Router {
    create_router(AppState::new(config).unwrap())
}

fn app(temp_dir: &TempDir) -> Router {
    app_with(config_for(temp_dir, Some(KEY)))
}

fn get(uri: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_needs_no_key() {
    let temp_dir = fixture();
    let (status, body) = send(app(&temp_dir), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = send(app_with(config_for(&temp_dir, None)), get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_directory() {
    let temp_dir = fixture();
    let (status, body) = send(app(&temp_dir), get("/list?path=a", Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"path": "a", "items": [{"name": "b.txt", "type": "file"}]})
    );
}

#[tokio::test]
async fn test_list_root_and_file() {
    let temp_dir = fixture();

    let (status, body) = send(app(&temp_dir), get("/list", Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "path": ".",
            "items": [
                {"name": "a", "type": "dir"},
                {"name": "notes.md", "type": "file"},
                {"name": "private", "type": "dir"},
            ]
        })
    );

    let (status, body) = send(app(&temp_dir), get("/list?path=a/b.txt", Some(KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"path": "a/b.txt", "type": "file"}));
}

#[tokio::test]
async fn test_list_errors() {
    let temp_dir = fixture();

    let (status, body) = send(app(&temp_dir), get("/list?path=../..", Some(KEY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = send(app(&temp_dir), get("/list?path=missing", Some(KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Not found");
}

#[tokio::test]
async fn test_denied_directory_is_forbidden() {
    let temp_dir = fixture();
    let mut config = config_for(&temp_dir, Some(KEY));
    config.deny = DenyConfig {
        dirs: vec![temp_dir.path().join("private").display().to_string()],
        ..Default::default()
    };

    let (status, body) = send(app_with(config.clone()), get("/list?path=private", Some(KEY))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Path not allowed");

    let (status, _) = send(
        app_with(config),
        post("/read", Some(KEY), json!({"path": "private/p.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bad_or_missing_key_is_unauthorized() {
    let temp_dir = fixture();

    let (status, body) = send(app(&temp_dir), get("/list?path=a", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({"error": {"code": "unauthorized", "message": "Invalid API key"}})
    );

    let (status, _) = send(app(&temp_dir), get("/list?path=a", Some("wrong"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        app(&temp_dir),
        post("/search", Some("wrong"), json!({"query": "hello"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_runs_before_path_checks_and_body_parsing() {
    let temp_dir = fixture();

    // An escaping path must not leak a 400 to an unauthenticated caller
    let (status, _) = send(app(&temp_dir), get("/list?path=../..", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/read")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let (status, _) = send(app(&temp_dir), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_secret_is_misconfigured() {
    let temp_dir = fixture();

    for secret in [None, Some("")] {
        let app = app_with(config_for(&temp_dir, secret));
        let (status, body) = send(app, get("/list?path=a", Some("anything"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "server_misconfigured");
    }
}

#[tokio::test]
async fn test_custom_key_header() {
    let temp_dir = fixture();
    let mut config = config_for(&temp_dir, Some(KEY));
    config.auth.header = "x-dev-key".to_string();

    let request = Request::builder()
        .uri("/list?path=a")
        .header("x-dev-key", KEY)
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app_with(config.clone()), request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app_with(config), get("/list?path=a", Some(KEY))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_read_line_range() {
    let temp_dir = fixture();
    let (status, body) = send(
        app(&temp_dir),
        post(
            "/read",
            Some(KEY),
            json!({"path": "a/b.txt", "start_line": 2, "end_line": 2}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "path": "a/b.txt",
            "start_line": 2,
            "end_line": 2,
            "total_lines": 2,
            "content": "world",
        })
    );
}

#[tokio::test]
async fn test_read_defaults_and_inverted_range() {
    let temp_dir = fixture();

    let (status, body) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "a/b.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "hello\nworld");
    assert_eq!(body["end_line"], 2);

    let (status, body) = send(
        app(&temp_dir),
        post(
            "/read",
            Some(KEY),
            json!({"path": "a/b.txt", "start_line": 10, "end_line": 5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "");
}

#[tokio::test]
async fn test_read_errors() {
    let temp_dir = fixture();

    let (status, body) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "a/.env"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "File not allowed");

    let (status, _) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "../outside.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "a"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "File not found");
}

#[tokio::test]
async fn test_read_too_large_reports_size() {
    let temp_dir = fixture();
    fs::write(temp_dir.path().join("big.log"), vec![b'x'; 200_001]).unwrap();

    let (status, body) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "big.log"})),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body["error"]["message"],
        "File too large (200001 bytes). Use smaller file or narrow."
    );
    assert_eq!(body["error"]["details"]["size"], 200_001);
}

#[tokio::test]
async fn test_search_is_literal_and_case_insensitive() {
    let temp_dir = fixture();

    let (status, body) = send(
        app(&temp_dir),
        post("/search", Some(KEY), json!({"query": "  WORLD "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "query": "WORLD",
            "results": [{"path": "a/b.txt", "line": 2, "match": "world"}]
        })
    );

    let (_, body) = send(
        app(&temp_dir),
        post("/search", Some(KEY), json!({"query": "1.2"})),
    )
    .await;
    assert_eq!(
        body["results"],
        json!([{"path": "notes.md", "line": 1, "match": "version 1.2"}])
    );
}

#[tokio::test]
async fn test_search_skips_denied_names_and_respects_limit() {
    let temp_dir = fixture();

    let (status, body) = send(
        app(&temp_dir),
        post("/search", Some(KEY), json!({"query": "hello", "max_results": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|hit| hit["path"] != "a/.env"));
}

#[tokio::test]
async fn test_search_empty_query_is_bad_request() {
    let temp_dir = fixture();
    let (status, body) = send(
        app(&temp_dir),
        post("/search", Some(KEY), json!({"query": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Empty query");
}

#[tokio::test]
async fn test_request_id_header() {
    let temp_dir = fixture();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app(&temp_dir).oneshot(request).await.unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    assert!(response.headers().contains_key("x-response-time"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_broken_symlink_out_of_root_is_bad_request() {
    let temp_dir = fixture();
    std::os::unix::fs::symlink("/definitely/missing.txt", temp_dir.path().join("a/out")).unwrap();

    let (status, _) = send(
        app(&temp_dir),
        post("/read", Some(KEY), json!({"path": "a/out"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
