#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use stockroom_api::config::{LogFormat, ServerConfig};
use stockroom_api::router::build_app_router;
use stockroom_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        database_max_connections: 5,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<(&str, Body)>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some((content_type, body)) => {
            builder = builder.header(header::CONTENT_TYPE, content_type);
            body
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let body = Body::from(json.to_string());
    send(app, Method::POST, uri, Some(("application/json", body))).await
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let body = Body::from(json.to_string());
    send(app, Method::PUT, uri, Some(("application/json", body))).await
}

pub async fn post_csv(app: Router, uri: &str, csv: &str) -> Response<Body> {
    let body = Body::from(csv.to_string());
    send(app, Method::POST, uri, Some(("text/csv", body))).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a resource and return the `data.id` of the response.
pub async fn create(pool: &PgPool, uri: &str, json: serde_json::Value) -> i64 {
    let response = post_json(build_test_app(pool.clone()), uri, json).await;
    assert!(
        response.status().is_success(),
        "POST {uri} failed with {}",
        response.status()
    );
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// The "Filters" category: `thread_size` (choice 10mm/12mm), `filter_type`
/// (choice Oil/Air), `length` (dec) and `pack_qty` (int).
/// Returns the category id.
pub async fn seed_filters(pool: &PgPool) -> i64 {
    let category = create(pool, "/api/v1/categories", serde_json::json!({"name": "Filters"})).await;
    let base = format!("/api/v1/categories/{category}/attributes");

    let thread = create(
        pool,
        &base,
        serde_json::json!({"name": "Thread Size", "data_type": "choice"}),
    )
    .await;
    for value in ["10mm", "12mm"] {
        let uri = format!("{base}/{thread}/choices");
        create(pool, &uri, serde_json::json!({"value": value})).await;
    }

    let filter_type = create(
        pool,
        &base,
        serde_json::json!({"name": "Filter Type", "data_type": "choice"}),
    )
    .await;
    for value in ["Oil", "Air"] {
        create(
            pool,
            &format!("{base}/{filter_type}/choices"),
            serde_json::json!({"value": value}),
        )
        .await;
    }

    create(
        pool,
        &base,
        serde_json::json!({"name": "Length", "data_type": "dec", "unit": "mm"}),
    )
    .await;
    create(
        pool,
        &base,
        serde_json::json!({"name": "Pack Qty", "data_type": "int"}),
    )
    .await;

    category
}

/// Create a part in `category_id` and return its id.
pub async fn seed_part(pool: &PgPool, part_number: &str, category_id: Option<i64>) -> i64 {
    create(
        pool,
        "/api/v1/parts",
        serde_json::json!({
            "part_number": part_number,
            "name": format!("Part {part_number}"),
            "category_id": category_id,
        }),
    )
    .await
}
