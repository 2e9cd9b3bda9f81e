//! HTTP-level tests for machine/engine/part fitment and engine supersession.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, seed_part};
use serde_json::json;
use sqlx::PgPool;

async fn seed_machine(pool: &PgPool) -> i64 {
    common::create(
        pool,
        "/api/v1/machines",
        json!({
            "make": "Deere",
            "model": "5075E",
            "year": 2019,
            "machine_type": "Tractor",
            "market_type": "Agriculture",
        }),
    )
    .await
}

async fn seed_engine(pool: &PgPool, model: &str) -> i64 {
    common::create(
        pool,
        "/api/v1/engines",
        json!({"engine_make": "Cummins", "engine_model": model}),
    )
    .await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_machine_is_409(pool: PgPool) {
    seed_machine(&pool).await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/machines",
        json!({
            "make": "Deere",
            "model": "5075E",
            "year": 2019,
            "machine_type": "Tractor",
            "market_type": "Agriculture",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_machine_engine_links(pool: PgPool) {
    let machine = seed_machine(&pool).await;
    let qsb = seed_engine(&pool, "QSB6.7").await;
    let links = format!("/api/v1/machines/{machine}/engines");

    let response = post_json(
        common::build_test_app(pool.clone()),
        &links,
        json!({"engine_id": qsb, "is_primary": true, "notes": "Factory"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["engine_model"], "QSB6.7");
    assert_eq!(json["data"]["is_primary"], true);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &links,
        json!({"engine_id": qsb}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &links,
        json!({"engine_id": 777777}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{qsb}/machines"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["machine_id"], machine);
    assert_eq!(json["data"][0]["notes"], "Factory");

    let uri = format!("{links}/{qsb}");
    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(common::build_test_app(pool), &links).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_part_fitment_from_both_sides(pool: PgPool) {
    let machine = seed_machine(&pool).await;
    let qsb = seed_engine(&pool, "QSB6.7").await;
    let part = seed_part(&pool, "LF-1", None).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/machines/{machine}/parts"),
        json!({"part_id": part, "is_primary": true}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{qsb}/parts"),
        json!({"part_id": part, "notes": "Spin-on"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["part_number"], "LF-1");

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/machines"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["model"], "5075E");
    assert_eq!(json["data"][0]["is_primary"], true);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/engines"),
    )
    .await;
    assert_eq!(body_json(response).await["data"][0]["engine_id"], qsb);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{qsb}/parts/{part}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{qsb}/parts"),
    )
    .await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/machines/{machine}/parts/{part}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool), "/api/v1/parts/777777/machines").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_engine_supersessions(pool: PgPool) {
    let isb = seed_engine(&pool, "ISB5.9").await;
    let qsb = seed_engine(&pool, "QSB6.7").await;
    let x12 = seed_engine(&pool, "X12").await;
    let uri = format!("/api/v1/engines/{qsb}/supersessions");

    let response = post_json(
        common::build_test_app(pool.clone()),
        &uri,
        json!({"older_engine_id": isb, "effective_date": "2008-01-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["from_engine_id"], isb);
    assert_eq!(json["data"]["to_engine_id"], qsb);
    assert_eq!(json["data"]["effective_date"], "2008-01-01");

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{isb}/supersessions"),
        json!({"newer_engine_id": qsb}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let newer = common::create(&pool, &uri, json!({"newer_engine_id": x12})).await;

    let response = get(common::build_test_app(pool.clone()), &uri).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["supersedes"][0]["from_engine_model"], "ISB5.9");
    assert_eq!(json["data"]["superseded_by"][0]["to_engine_model"], "X12");

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/engines/{isb}/supersessions/{newer}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/v1/engines/{x12}/supersessions/{newer}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supersession_rejects_bad_direction(pool: PgPool) {
    let isb = seed_engine(&pool, "ISB5.9").await;
    let qsb = seed_engine(&pool, "QSB6.7").await;
    let uri = format!("/api/v1/engines/{qsb}/supersessions");

    for body in [
        json!({"older_engine_id": qsb}),
        json!({}),
        json!({"older_engine_id": isb, "newer_engine_id": isb}),
    ] {
        let response = post_json(common::build_test_app(pool.clone()), &uri, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = post_json(
        common::build_test_app(pool),
        &uri,
        json!({"older_engine_id": 777777}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
