//! HTTP-level tests for parts: CRUD, search, category changes and CSV.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, body_text, delete, get, post_csv, post_json, put_json, seed_filters, seed_part,
};
use serde_json::json;
use sqlx::PgPool;

const IMPORT: &str = "/api/v1/parts/import";

async fn set_spec(pool: &PgPool, part: i64, code: &str, value: serde_json::Value) {
    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/specs/{code}"),
        json!({ "value": value }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "setting {code}");
}

fn part_numbers(json: &serde_json::Value) -> Vec<String> {
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["part_number"].as_str().unwrap().to_string())
        .collect()
}

/// A second category sharing `thread_size` (only 10mm) and redefining
/// `length` as an integer.
async fn seed_spin_on(pool: &PgPool) -> i64 {
    let category = common::create(pool, "/api/v1/categories", json!({"name": "Spin-on"})).await;
    let base = format!("/api/v1/categories/{category}/attributes");
    let thread = common::create(
        pool,
        &base,
        json!({"name": "Thread Size", "data_type": "choice"}),
    )
    .await;
    common::create(pool, &format!("{base}/{thread}/choices"), json!({"value": "10mm"})).await;
    common::create(pool, &base, json!({"name": "Length", "data_type": "int"})).await;
    category
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_get_part(pool: PgPool) {
    let filters = seed_filters(&pool).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts",
        json!({
            "part_number": "OF-100",
            "name": "Oil filter",
            "category_id": filters,
            "manufacturer": "Mann",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get(common::build_test_app(pool), &format!("/api/v1/parts/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["part_number"], "OF-100");
    assert_eq!(json["data"]["category_name"], "Filters");
    assert_eq!(json["data"]["manufacturer"], "Mann");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_part_in_unknown_category_is_404(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts",
        json!({"part_number": "X", "name": "X", "category_id": 424242}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_part_rejects_blank_part_number(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts",
        json!({"part_number": "", "name": "Nameless"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_part_number_and_name_conflicts(pool: PgPool) {
    seed_part(&pool, "P1", None).await;
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts",
        json!({"part_number": "P1", "name": "Part P1"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_part(pool: PgPool) {
    let part = seed_part(&pool, "P1", None).await;
    let uri = format!("/api/v1/parts/{part}");

    let response = put_json(
        common::build_test_app(pool.clone()),
        &uri,
        json!({"name": "Renamed", "unit": "pcs"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed");
    assert_eq!(json["data"]["unit"], "pcs");
    assert_eq!(json["data"]["part_number"], "P1");

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing & search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_sorts(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    seed_part(&pool, "B-2", Some(filters)).await;
    seed_part(&pool, "A-1", Some(filters)).await;
    seed_part(&pool, "C-3", None).await;

    let response = get(common::build_test_app(pool.clone()), "/api/v1/parts").await;
    let json = body_json(response).await;
    assert_eq!(part_numbers(&json), vec!["A-1", "B-2", "C-3"]);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["page"], 1);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts?category_id={filters}&sort=-part_number"),
    )
    .await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["B-2", "A-1"]);

    let response = get(common::build_test_app(pool.clone()), "/api/v1/parts?search=c-").await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["C-3"]);

    let response = get(common::build_test_app(pool), "/api/v1/parts?sort=price").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_by_choice_value(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let p1 = seed_part(&pool, "P1", Some(filters)).await;
    let p2 = seed_part(&pool, "P2", Some(filters)).await;
    seed_part(&pool, "P3", Some(filters)).await;
    set_spec(&pool, p1, "thread_size", json!("10mm")).await;
    set_spec(&pool, p2, "thread_size", json!("12mm")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [{"attribute": "thread_size", "op": "eq", "value": "10mm"}],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(part_numbers(&body_json(response).await), vec!["P1"]);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [{"attribute": "thread_size", "op": "in", "value": ["10mm", "12mm"]}],
        }),
    )
    .await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["P1", "P2"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_combines_clauses(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let p1 = seed_part(&pool, "P1", Some(filters)).await;
    let p2 = seed_part(&pool, "P2", Some(filters)).await;
    let p3 = seed_part(&pool, "P3", Some(filters)).await;
    set_spec(&pool, p1, "length", json!("80")).await;
    set_spec(&pool, p2, "length", json!("120.5")).await;
    set_spec(&pool, p3, "length", json!("200")).await;
    set_spec(&pool, p1, "filter_type", json!("Oil")).await;
    set_spec(&pool, p2, "filter_type", json!("Oil")).await;
    set_spec(&pool, p3, "filter_type", json!("Oil")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [
                {"attribute": "length", "op": "between", "value": ["100", "200"]},
                {"attribute": "filter_type", "op": "eq", "value": "Oil"},
            ],
        }),
    )
    .await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["P2", "P3"]);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "search": "p1",
            "clauses": [{"attribute": "length", "op": "lt", "value": 100}],
        }),
    )
    .await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["P1"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_rejects_bad_clauses(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    seed_part(&pool, "P1", Some(filters)).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [{"attribute": "thread_size", "op": "gt", "value": "10mm"}],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "UNSUPPORTED_OPERATOR");

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [{"attribute": "length", "op": "between", "value": "5"}],
        }),
    )
    .await;
    assert_eq!(body_json(response).await["code"], "MALFORMED_OPERAND");

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts/search",
        json!({"clauses": [{"attribute": "length", "op": "eq", "value": "5"}]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_unknown_attribute_matches_nothing(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    seed_part(&pool, "P1", Some(filters)).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts/search",
        json!({
            "category_id": filters,
            "clauses": [{"attribute": "bore", "op": "eq", "value": "5"}],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Category changes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_change_keeps_matching_values(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let spin_on = seed_spin_on(&pool).await;
    let part = seed_part(&pool, "P1", Some(filters)).await;
    set_spec(&pool, part, "thread_size", json!("10mm")).await;
    set_spec(&pool, part, "length", json!("10.5")).await;
    set_spec(&pool, part, "pack_qty", json!(6)).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/category-preview?category_id={spin_on}&mode=keep_matching"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["data"]["carry"].as_array().unwrap().len(), 1);
    assert_eq!(preview["data"]["drop"].as_array().unwrap().len(), 2);

    let part_uri = format!("/api/v1/parts/{part}");
    let response = get(common::build_test_app(pool.clone()), &part_uri).await;
    assert_eq!(body_json(response).await["data"]["category_id"], filters);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/category"),
        json!({"category_id": spin_on, "mode": "keep_matching"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["part"]["category_id"], spin_on);
    let reasons: Vec<&str> = json["data"]["plan"]["drop"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["reason"].as_str().unwrap())
        .collect();
    assert!(reasons.contains(&"type_changed"));
    assert!(reasons.contains(&"not_in_category"));

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/parts/{part}/specs"),
    )
    .await;
    let json = body_json(response).await;
    let specs = json["data"].as_array().unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0]["code"], "thread_size");
    assert_eq!(specs[0]["value"], "10mm");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_category_change_clears_by_default(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let spin_on = seed_spin_on(&pool).await;
    let part = seed_part(&pool, "P1", Some(filters)).await;
    set_spec(&pool, part, "thread_size", json!("10mm")).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/parts/{part}/category"),
        json!({"category_id": spin_on}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/parts/{part}/specs"),
    )
    .await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_category_change_is_atomic(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let spin_on = seed_spin_on(&pool).await;
    let p1 = seed_part(&pool, "P1", Some(filters)).await;
    let p2 = seed_part(&pool, "P2", Some(filters)).await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/bulk-category",
        json!({"part_ids": [p1, p2, 987654], "category_id": spin_on}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(common::build_test_app(pool.clone()), &format!("/api/v1/parts/{p1}")).await;
    assert_eq!(body_json(response).await["data"]["category_id"], filters);

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/parts/bulk-category",
        json!({"part_ids": [p1, p2, p1], "category_id": spin_on, "mode": "keep_matching"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["updated"], 2);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/parts?category_id={spin_on}"),
    )
    .await;
    assert_eq!(part_numbers(&body_json(response).await), vec!["P1", "P2"]);
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_includes_attribute_columns(pool: PgPool) {
    let filters = seed_filters(&pool).await;
    let part = seed_part(&pool, "P1", Some(filters)).await;
    set_spec(&pool, part, "thread_size", json!("10mm")).await;
    set_spec(&pool, part, "pack_qty", json!(6)).await;

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/parts/export",
        json!({"category_id": filters}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );

    let text = body_text(response).await;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "ID,Part Number,Name,Category,Manufacturer,Unit,Type,Manufacturer Type,Primary Vendor,\
         attr:thread_size,attr:filter_type,attr:length,attr:pack_qty"
    );
    assert_eq!(lines[1], format!("{part},P1,Part P1,Filters,,,,,,10mm,,,6"));
    assert_eq!(lines.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_creates_then_updates(pool: PgPool) {
    seed_filters(&pool).await;
    let csv = "part_number,name,category,manufacturer,attr:thread_size,attr:pack_qty\n\
               OF-1,Oil filter,filters,Mann,10mm,4\n\
               OF-2,Air filter,filters,,12mm,\n";

    let response = post_csv(common::build_test_app(pool.clone()), IMPORT, csv).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["created"], 2);
    assert_eq!(json["data"]["updated"], 0);
    assert_eq!(json["data"]["values_written"], 3);

    let csv = "part_number,name,category,attr:pack_qty\nOF-1,Oil filter,filters,8\n";
    let response = post_csv(common::build_test_app(pool.clone()), IMPORT, csv).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["created"], 0);
    assert_eq!(json["data"]["updated"], 1);

    let response = get(common::build_test_app(pool.clone()), "/api/v1/parts?search=OF-1").await;
    let json = body_json(response).await;
    let id = json["data"]["items"][0]["id"].as_i64().unwrap();
    assert!(json["data"]["items"][0]["manufacturer"].is_null());

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/parts/{id}/specs/pack_qty"),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["value"], 8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_with_bad_cell_rejects_file(pool: PgPool) {
    seed_filters(&pool).await;
    let csv = "part_number,name,category,attr:thread_size\n\
               OF-1,Oil filter,filters,10mm\n\
               OF-2,Air filter,filters,14mm\n\
               OF-3,Fuel filter,hoses,\n";

    let response = post_csv(common::build_test_app(pool.clone()), IMPORT, csv).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    let fields = json["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["field"], "attr:thread_size");
    assert_eq!(fields[0]["code"], "INVALID_CHOICE");
    assert_eq!(fields[0]["row"], 2);
    assert_eq!(fields[1]["field"], "category");
    assert_eq!(fields[1]["row"], 3);

    let response = get(common::build_test_app(pool), "/api/v1/parts").await;
    assert_eq!(body_json(response).await["data"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_import_requires_identity_columns(pool: PgPool) {
    let response = post_csv(
        common::build_test_app(pool),
        "/api/v1/parts/import",
        "name,category\nWidget,\n",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
