use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use stockroom_core::eav::filter::{ClauseInput, ClauseSet};
use stockroom_core::eav::{DataType, SchemaSnapshot, TypedValue};
use stockroom_core::types::DbId;
use stockroom_db::models::attribute::NewAttribute;
use stockroom_db::models::attribute_value::ValueWrite;
use stockroom_db::models::part::{CreatePart, PartFilter};
use stockroom_db::repositories::{
    AttributeRepo, AttributeValueRepo, CategoryRepo, ChoiceRepo, PartRepo, SchemaRepo,
};

const ORDER: &str = "p.part_number ASC, p.id ASC";

struct Seeded {
    filters: DbId,
    snapshot: SchemaSnapshot,
}

fn new_attribute(code: &str, data_type: DataType, sort_order: i32) -> NewAttribute {
    NewAttribute {
        name: code.replace('_', " "),
        code: code.to_string(),
        data_type,
        unit: None,
        is_required: false,
        sort_order,
        help_text: None,
    }
}

fn new_part(part_number: &str, category_id: DbId, manufacturer: Option<&str>) -> CreatePart {
    CreatePart {
        part_number: part_number.to_string(),
        name: format!("Part {part_number}"),
        category_id: Some(category_id),
        manufacturer: manufacturer.map(str::to_string),
        unit: None,
        part_type: None,
        manufacturer_type: None,
    }
}

async fn write(pool: &PgPool, seeded: &Seeded, part: DbId, code: &str, value: TypedValue) {
    let attribute = seeded.snapshot.attribute_by_code(seeded.filters, code).unwrap();
    let write = ValueWrite::resolve(&seeded.snapshot, attribute, Some(value)).unwrap();
    AttributeValueRepo::write_one(pool, part, &write).await.unwrap();
}

fn dec(s: &str) -> TypedValue {
    TypedValue::Decimal(s.parse::<Decimal>().unwrap())
}

/// Three filters with assorted specs, plus one bearing.
async fn seed(pool: &PgPool) -> Seeded {
    let filters = CategoryRepo::create(pool, "Filters", "filters").await.unwrap().id;
    let bearings = CategoryRepo::create(pool, "Bearings", "bearings").await.unwrap().id;

    let specs = [
        ("thread_size", DataType::Choice),
        ("filter_type", DataType::Choice),
        ("length", DataType::Decimal),
        ("notes", DataType::Text),
        ("pack_qty", DataType::Integer),
        ("in_stock", DataType::Boolean),
        ("inspected", DataType::Date),
    ];
    for (i, (code, data_type)) in specs.into_iter().enumerate() {
        let input = new_attribute(code, data_type, i as i32);
        let attribute = AttributeRepo::create(pool, filters, &input).await.unwrap();
        let options: &[&str] = match code {
            "thread_size" => &["10mm", "12mm"],
            "filter_type" => &["Oil", "Air"],
            _ => &[],
        };
        for (n, value) in options.iter().enumerate() {
            ChoiceRepo::create(pool, attribute.id, value, value, n as i32)
                .await
                .unwrap();
        }
    }
    AttributeRepo::create(pool, bearings, &new_attribute("length", DataType::Decimal, 0))
        .await
        .unwrap();

    let seeded = Seeded {
        filters,
        snapshot: SchemaRepo::load_snapshot(pool).await.unwrap(),
    };
    let day = |d| TypedValue::Date(NaiveDate::from_ymd_opt(2024, 1, d).unwrap());

    let p1 = PartRepo::create(pool, &new_part("P1", filters, None)).await.unwrap().id;
    write(pool, &seeded, p1, "thread_size", TypedValue::Choice("10mm".into())).await;
    write(pool, &seeded, p1, "filter_type", TypedValue::Choice("Oil".into())).await;
    write(pool, &seeded, p1, "length", dec("10.0")).await;
    write(pool, &seeded, p1, "notes", TypedValue::Text("Heavy Duty".into())).await;
    write(pool, &seeded, p1, "pack_qty", TypedValue::Integer(2)).await;
    write(pool, &seeded, p1, "in_stock", TypedValue::Boolean(true)).await;
    write(pool, &seeded, p1, "inspected", day(5)).await;

    let p2 = PartRepo::create(pool, &new_part("P2", filters, None)).await.unwrap().id;
    write(pool, &seeded, p2, "thread_size", TypedValue::Choice("10mm".into())).await;
    write(pool, &seeded, p2, "filter_type", TypedValue::Choice("Air".into())).await;
    write(pool, &seeded, p2, "length", dec("15.000001")).await;
    write(pool, &seeded, p2, "notes", TypedValue::Text("heavy".into())).await;
    write(pool, &seeded, p2, "pack_qty", TypedValue::Integer(12)).await;
    write(pool, &seeded, p2, "in_stock", TypedValue::Boolean(false)).await;
    write(pool, &seeded, p2, "inspected", day(20)).await;

    let p3 = PartRepo::create(pool, &new_part("P3", filters, Some("Acme")))
        .await
        .unwrap()
        .id;
    write(pool, &seeded, p3, "thread_size", TypedValue::Choice("12mm".into())).await;
    write(pool, &seeded, p3, "length", dec("5")).await;
    write(pool, &seeded, p3, "notes", TypedValue::Text("50% off".into())).await;

    PartRepo::create(pool, &new_part("B1", bearings, Some("Acme")))
        .await
        .unwrap();

    seeded
}

fn clauses(seeded: &Seeded, inputs: serde_json::Value) -> PartFilter {
    let inputs: Vec<ClauseInput> = serde_json::from_value(inputs).unwrap();
    PartFilter {
        category_id: Some(seeded.filters),
        clauses: ClauseSet::resolve(&seeded.snapshot, seeded.filters, &inputs).unwrap(),
        ..PartFilter::default()
    }
}

async fn part_numbers(pool: &PgPool, filter: &PartFilter) -> Vec<String> {
    PartRepo::search(pool, filter, ORDER, None, 0)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.part_number)
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clauses_combine_with_and(pool: PgPool) {
    let seeded = seed(&pool).await;
    let filter = clauses(
        &seeded,
        json!([
            {"attribute": "thread_size", "op": "eq", "value": "10mm"},
            {"attribute": "filter_type", "op": "eq", "value": "Oil"}
        ]),
    );
    assert_eq!(part_numbers(&pool, &filter).await, ["P1"]);
    assert_eq!(PartRepo::count(&pool, &filter).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_in_matches_any_option(pool: PgPool) {
    let seeded = seed(&pool).await;
    let filter = clauses(
        &seeded,
        json!([{"attribute": "filter_type", "op": "in", "value": ["Oil", "Air"]}]),
    );
    assert_eq!(part_numbers(&pool, &filter).await, ["P1", "P2"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_between_is_inclusive_and_exact(pool: PgPool) {
    let seeded = seed(&pool).await;
    let filter = clauses(
        &seeded,
        json!([{"attribute": "length", "op": "between", "value": [5, 15]}]),
    );
    assert_eq!(part_numbers(&pool, &filter).await, ["P1", "P3"]);

    let inverted = clauses(
        &seeded,
        json!([{"attribute": "length", "op": "between", "value": [15, 5]}]),
    );
    assert!(part_numbers(&pool, &inverted).await.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_integer_date_and_boolean_comparisons(pool: PgPool) {
    let seeded = seed(&pool).await;
    let gt = clauses(&seeded, json!([{"attribute": "pack_qty", "op": "gt", "value": 2}]));
    assert_eq!(part_numbers(&pool, &gt).await, ["P2"]);

    let before = clauses(
        &seeded,
        json!([{"attribute": "inspected", "op": "before", "value": "2024-01-10"}]),
    );
    assert_eq!(part_numbers(&pool, &before).await, ["P1"]);

    let stocked = clauses(&seeded, json!([{"attribute": "in_stock", "op": "eq", "value": false}]));
    assert_eq!(part_numbers(&pool, &stocked).await, ["P2"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_text_contains_ignores_case_and_wildcards(pool: PgPool) {
    let seeded = seed(&pool).await;
    let contains = clauses(
        &seeded,
        json!([{"attribute": "notes", "op": "contains", "value": "HEAVY"}]),
    );
    assert_eq!(part_numbers(&pool, &contains).await, ["P1", "P2"]);

    let eq = clauses(&seeded, json!([{"attribute": "notes", "op": "eq", "value": "heavy"}]));
    assert_eq!(part_numbers(&pool, &eq).await, ["P2"]);

    let percent = clauses(&seeded, json!([{"attribute": "notes", "op": "contains", "value": "%"}]));
    assert_eq!(part_numbers(&pool, &percent).await, ["P3"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_code_matches_nothing(pool: PgPool) {
    let seeded = seed(&pool).await;
    let filter = clauses(&seeded, json!([{"attribute": "bore", "op": "eq", "value": "10"}]));
    assert!(part_numbers(&pool, &filter).await.is_empty());
    assert_eq!(PartRepo::count(&pool, &filter).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_plain_filters_compose_with_clauses(pool: PgPool) {
    let seeded = seed(&pool).await;

    let acme = PartFilter {
        manufacturer: Some("acm".into()),
        ..PartFilter::default()
    };
    assert_eq!(part_numbers(&pool, &acme).await, ["B1", "P3"]);

    let mut filter = clauses(
        &seeded,
        json!([{"attribute": "thread_size", "op": "eq", "value": "10mm"}]),
    );
    filter.search = Some("part p2".into());
    assert_eq!(part_numbers(&pool, &filter).await, ["P2"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_limit_and_offset_cut_one_page(pool: PgPool) {
    seed(&pool).await;
    let all = PartFilter::default();
    assert_eq!(PartRepo::count(&pool, &all).await.unwrap(), 4);

    let page: Vec<String> = PartRepo::search(&pool, &all, ORDER, Some(2), 2)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.part_number)
        .collect();
    assert_eq!(page, ["P2", "P3"]);
}
