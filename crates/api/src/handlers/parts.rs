//! Handlers for parts: CRUD, filtered search, CSV export/import and
//! category changes with value reconciliation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use stockroom_core::eav::filter::ClauseSet;
use stockroom_core::eav::reconcile::{plan_category_change, ReconcilePlan};
use stockroom_core::eav::value::parse_input;
use stockroom_core::eav::{FieldViolation, SchemaSnapshot, TypedValue};
use stockroom_core::error::CoreError;
use stockroom_core::listing::{Page, PageWindow, SortSpec, PAGE_SIZE};
use stockroom_core::types::DbId;
use stockroom_db::models::attribute_value::ValueWrite;
use stockroom_db::models::part::{
    BulkCategoryChange, CategoryParam, ChangeCategory, CreatePart, Part, PartFilter,
    PartImportRow, PartListParams, PartSearchRequest, PartSummary, UpdatePart,
    PART_DEFAULT_SORT, PART_SORT_FIELDS,
};
use stockroom_db::repositories::{AttributeValueRepo, PartRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::specs::{load_part, stored_values};
use crate::response::DataResponse;
use crate::state::AppState;

/// Prefix of CSV columns holding spec values.
const ATTR_COLUMN_PREFIX: &str = "attr:";

/// Fixed CSV export columns, before the `attr:<code>` columns.
const EXPORT_HEADERS: [&str; 9] = [
    "ID",
    "Part Number",
    "Name",
    "Category",
    "Manufacturer",
    "Unit",
    "Type",
    "Manufacturer Type",
    "Primary Vendor",
];

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Validate a search request and resolve its attribute clauses.
fn part_filter(snapshot: &SchemaSnapshot, request: &PartSearchRequest) -> AppResult<PartFilter> {
    if let Some(category_id) = request.category_id {
        if snapshot.category(category_id).is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }));
        }
    }

    let clauses = if request.clauses.is_empty() {
        ClauseSet::default()
    } else {
        let category_id = request.category_id.ok_or_else(|| {
            AppError::BadRequest("Attribute clauses require a category_id".into())
        })?;
        ClauseSet::resolve(snapshot, category_id, &request.clauses)?
    };

    Ok(PartFilter {
        category_id: request.category_id,
        search: request.search.clone(),
        manufacturer: request.manufacturer.clone(),
        clauses,
    })
}

/// Run a search request and return the requested page.
async fn search_page(
    state: &AppState,
    request: &PartSearchRequest,
) -> AppResult<Page<PartSummary>> {
    let sort = SortSpec::parse(request.sort.as_deref(), PART_SORT_FIELDS, PART_DEFAULT_SORT)?;
    let snapshot = state.snapshot().await?;
    let filter = part_filter(&snapshot, request)?;

    let total = PartRepo::count(&state.pool, &filter).await?;
    let window = PageWindow::new(total.max(0) as usize, request.page, PAGE_SIZE);
    let parts = PartRepo::search(
        &state.pool,
        &filter,
        &sort.to_sql("p.id"),
        Some(window.limit()),
        window.offset(),
    )
    .await?;

    Ok(window.with_items(parts))
}

// ---------------------------------------------------------------------------
// Listing & search
// ---------------------------------------------------------------------------

/// GET /api/v1/parts
///
/// Plain-field filters, sort and page via query parameters.
pub async fn list_parts(
    State(state): State<AppState>,
    Query(params): Query<PartListParams>,
) -> AppResult<impl IntoResponse> {
    let request = PartSearchRequest::from(params);
    let page = search_page(&state, &request).await?;

    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/parts/search
///
/// Like the list, plus attribute clauses within `category_id`.
pub async fn search_parts(
    State(state): State<AppState>,
    Json(request): Json<PartSearchRequest>,
) -> AppResult<impl IntoResponse> {
    let page = search_page(&state, &request).await?;

    tracing::debug!(
        category_id = ?request.category_id,
        clauses = request.clauses.len(),
        matches = page.total,
        "Part search"
    );

    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/parts
pub async fn create_part(
    State(state): State<AppState>,
    Json(input): Json<CreatePart>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(category_id) = input.category_id {
        let snapshot = state.snapshot().await?;
        if snapshot.category(category_id).is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }));
        }
    }

    let part = PartRepo::create(&state.pool, &input).await?;

    tracing::info!(part_id = part.id, part_number = %part.part_number, "Part created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: part })))
}

/// GET /api/v1/parts/{id}
pub async fn get_part(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let part = PartRepo::find_summary(&state.pool, part_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Part",
            id: part_id,
        }))?;

    Ok(Json(DataResponse { data: part }))
}

/// PUT /api/v1/parts/{id}
///
/// Update plain fields. The category is changed via `POST /parts/{id}/category`.
pub async fn update_part(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Json(input): Json<UpdatePart>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let part = PartRepo::update(&state.pool, part_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Part",
            id: part_id,
        }))?;

    tracing::info!(part_id, "Part updated");

    Ok(Json(DataResponse { data: part }))
}

/// DELETE /api/v1/parts/{id}
///
/// Spec values and vendor offers are removed with the part.
pub async fn delete_part(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !PartRepo::delete(&state.pool, part_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Part",
            id: part_id,
        }));
    }

    tracing::info!(part_id, "Part deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Category changes
// ---------------------------------------------------------------------------

/// Result of applying a category change.
#[derive(Debug, Serialize)]
pub struct CategoryChangeResult {
    pub part: Part,
    pub plan: ReconcilePlan,
}

/// Result of a bulk category change.
#[derive(Debug, Serialize)]
pub struct BulkCategoryResult {
    pub updated: usize,
    pub carried: usize,
    pub dropped: usize,
}

fn ensure_category(snapshot: &SchemaSnapshot, category_id: Option<DbId>) -> AppResult<()> {
    match category_id {
        Some(id) if snapshot.category(id).is_none() => {
            Err(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id,
            }))
        }
        _ => Ok(()),
    }
}

/// Writes re-creating the carried values under the target attributes.
fn carried_writes(snapshot: &SchemaSnapshot, plan: &ReconcilePlan) -> AppResult<Vec<ValueWrite>> {
    plan.carry
        .iter()
        .map(|carried| {
            let attribute = snapshot.attribute(carried.to_attribute_id).ok_or_else(|| {
                AppError::Core(CoreError::Internal(format!(
                    "attribute {} missing from schema",
                    carried.to_attribute_id
                )))
            })?;
            Ok(ValueWrite::resolve(
                snapshot,
                attribute,
                Some(carried.value.clone()),
            )?)
        })
        .collect()
}

/// GET /api/v1/parts/{id}/category-preview?category_id=&mode=
///
/// Which values a category change would carry over or drop. Nothing is saved.
pub async fn preview_category_change(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Query(params): Query<CategoryParam>,
) -> AppResult<impl IntoResponse> {
    load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    ensure_category(&snapshot, params.category_id)?;

    let current = stored_values(&state.pool, part_id).await?;
    let plan = plan_category_change(&snapshot, &current, params.category_id, params.mode);

    Ok(Json(DataResponse { data: plan }))
}

/// POST /api/v1/parts/{id}/category
///
/// Move the part to another category (or none). With `keep_matching`,
/// values whose code and type exist in the new category are carried over;
/// everything else is dropped.
pub async fn change_category(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Json(input): Json<ChangeCategory>,
) -> AppResult<impl IntoResponse> {
    load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    ensure_category(&snapshot, input.category_id)?;

    let current = stored_values(&state.pool, part_id).await?;
    let plan = plan_category_change(&snapshot, &current, input.category_id, input.mode);
    let writes = carried_writes(&snapshot, &plan)?;

    let part = PartRepo::change_category(&state.pool, part_id, input.category_id, &writes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Part",
            id: part_id,
        }))?;

    tracing::info!(
        part_id,
        category_id = ?input.category_id,
        carried = plan.carry.len(),
        dropped = plan.drop.len(),
        "Part category changed"
    );

    Ok(Json(DataResponse {
        data: CategoryChangeResult { part, plan },
    }))
}

/// POST /api/v1/parts/bulk-category
///
/// Move several parts in one transaction; an unknown part id aborts all.
pub async fn bulk_change_category(
    State(state): State<AppState>,
    Json(input): Json<BulkCategoryChange>,
) -> AppResult<impl IntoResponse> {
    if input.part_ids.is_empty() {
        return Err(AppError::BadRequest("part_ids must not be empty".into()));
    }
    let snapshot = state.snapshot().await?;
    ensure_category(&snapshot, input.category_id)?;

    let mut seen = HashSet::new();
    let mut moves = Vec::with_capacity(input.part_ids.len());
    let (mut carried, mut dropped) = (0, 0);
    for &part_id in input.part_ids.iter().filter(|id| seen.insert(**id)) {
        let current = stored_values(&state.pool, part_id).await?;
        let plan = plan_category_change(&snapshot, &current, input.category_id, input.mode);
        carried += plan.carry.len();
        dropped += plan.drop.len();
        moves.push((part_id, carried_writes(&snapshot, &plan)?));
    }

    let parts = PartRepo::bulk_change_category(&state.pool, input.category_id, &moves).await?;

    tracing::info!(
        category_id = ?input.category_id,
        updated = parts.len(),
        carried,
        dropped,
        "Bulk category change"
    );

    Ok(Json(DataResponse {
        data: BulkCategoryResult {
            updated: parts.len(),
            carried,
            dropped,
        },
    }))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_error(err: impl std::fmt::Display) -> AppError {
    AppError::InternalError(format!("CSV write failed: {err}"))
}

/// POST /api/v1/parts/export
///
/// The matching parts as CSV (same body as search, all pages). With a
/// `category_id`, each attribute of the category gets an `attr:<code>` column.
pub async fn export_parts(
    State(state): State<AppState>,
    Json(request): Json<PartSearchRequest>,
) -> AppResult<impl IntoResponse> {
    let sort = SortSpec::parse(request.sort.as_deref(), PART_SORT_FIELDS, PART_DEFAULT_SORT)?;
    let snapshot = state.snapshot().await?;
    let filter = part_filter(&snapshot, &request)?;
    let parts = PartRepo::search(&state.pool, &filter, &sort.to_sql("p.id"), None, 0).await?;

    let attributes = request
        .category_id
        .map(|id| snapshot.list_attributes(id))
        .unwrap_or_default();
    let part_ids: Vec<DbId> = parts.iter().map(|p| p.id).collect();
    let attribute_ids: Vec<DbId> = attributes.iter().map(|a| a.id).collect();
    let mut values: HashMap<(DbId, DbId), TypedValue> = HashMap::new();
    for row in AttributeValueRepo::list_for_parts(&state.pool, &part_ids, &attribute_ids).await? {
        let (part_id, attribute_id, value) = row.into_typed()?;
        values.insert((part_id, attribute_id), value);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    let headers = EXPORT_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(
            attributes
                .iter()
                .map(|a| format!("{ATTR_COLUMN_PREFIX}{}", a.code)),
        );
    writer.write_record(headers).map_err(csv_error)?;

    for part in &parts {
        let fixed = [
            part.id.to_string(),
            part.part_number.clone(),
            part.name.clone(),
            part.category_name.clone().unwrap_or_default(),
            part.manufacturer.clone().unwrap_or_default(),
            part.unit.clone().unwrap_or_default(),
            part.part_type.clone().unwrap_or_default(),
            part.manufacturer_type.clone().unwrap_or_default(),
            part.primary_vendor_name.clone().unwrap_or_default(),
        ];
        let specs = attributes.iter().map(|a| {
            values
                .get(&(part.id, a.id))
                .map(TypedValue::to_raw)
                .unwrap_or_default()
        });
        writer
            .write_record(fixed.into_iter().chain(specs))
            .map_err(csv_error)?;
    }
    let body = writer.into_inner().map_err(csv_error)?;

    tracing::info!(
        rows = parts.len(),
        columns = EXPORT_HEADERS.len() + attributes.len(),
        "Parts exported"
    );

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"parts.csv\""),
        ],
        body,
    ))
}

/// Column positions of a parsed CSV header row.
struct ImportColumns {
    part_number: usize,
    name: usize,
    category: Option<usize>,
    manufacturer: Option<usize>,
    unit: Option<usize>,
    part_type: Option<usize>,
    manufacturer_type: Option<usize>,
    /// `(column index, attribute code)` for every `attr:<code>` column.
    attributes: Vec<(usize, String)>,
}

impl ImportColumns {
    fn from_headers(headers: &csv::StringRecord) -> AppResult<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| {
            position(name).ok_or_else(|| {
                AppError::BadRequest(format!("CSV is missing the '{name}' column"))
            })
        };
        let attributes = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| {
                h.trim()
                    .strip_prefix(ATTR_COLUMN_PREFIX)
                    .map(|code| (i, code.trim().to_string()))
            })
            .collect();
        Ok(Self {
            part_number: required("part_number")?,
            name: required("name")?,
            category: position("category"),
            manufacturer: position("manufacturer"),
            unit: position("unit"),
            part_type: position("type"),
            manufacturer_type: position("manufacturer_type"),
            attributes,
        })
    }
}

fn cell(record: &csv::StringRecord, index: usize) -> &str {
    record.get(index).map(str::trim).unwrap_or_default()
}

fn optional_cell(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .map(|i| cell(record, i))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate one CSV data row into an import row, collecting violations.
fn import_row(
    snapshot: &SchemaSnapshot,
    columns: &ImportColumns,
    record: &csv::StringRecord,
    row: usize,
    violations: &mut Vec<FieldViolation>,
) -> Option<PartImportRow> {
    let before = violations.len();

    let category_id = match optional_cell(record, columns.category) {
        Some(slug) => match snapshot.category_by_slug(&slug) {
            Some(category) => Some(category.id),
            None => {
                violations.push(
                    FieldViolation::new(
                        "category",
                        "UNKNOWN_CATEGORY",
                        format!("Unknown category '{slug}'"),
                    )
                    .at_row(row),
                );
                None
            }
        },
        None => None,
    };

    let part = CreatePart {
        part_number: cell(record, columns.part_number).to_string(),
        name: cell(record, columns.name).to_string(),
        category_id,
        manufacturer: optional_cell(record, columns.manufacturer),
        unit: optional_cell(record, columns.unit),
        part_type: optional_cell(record, columns.part_type),
        manufacturer_type: optional_cell(record, columns.manufacturer_type),
    };
    if let Err(errors) = part.validate() {
        for (field, _) in errors.field_errors() {
            violations.push(
                FieldViolation::new(
                    field.to_string(),
                    "VALIDATION_ERROR",
                    format!("Invalid value for '{field}'"),
                )
                .at_row(row),
            );
        }
    }

    let mut values = Vec::new();
    for (index, code) in &columns.attributes {
        let raw = cell(record, *index);
        let column = format!("{ATTR_COLUMN_PREFIX}{code}");
        let Some(attribute) = category_id.and_then(|c| snapshot.attribute_by_code(c, code)) else {
            if !raw.is_empty() {
                violations.push(
                    FieldViolation::new(
                        column,
                        "UNKNOWN_ATTRIBUTE",
                        format!("'{code}' is not an attribute of this row's category"),
                    )
                    .at_row(row),
                );
            }
            continue;
        };
        match parse_input(attribute, snapshot.choices_for(attribute.id), raw) {
            Ok(value) => match ValueWrite::resolve(snapshot, attribute, value) {
                Ok(write) => values.push(write),
                Err(err) => violations.push(
                    FieldViolation::new(column, "INTERNAL_ERROR", err.to_string()).at_row(row),
                ),
            },
            Err(err) => {
                let mut violation = FieldViolation::from(&err).at_row(row);
                violation.field = column;
                violations.push(violation);
            }
        }
    }

    (violations.len() == before).then_some(PartImportRow { part, values })
}

/// POST /api/v1/parts/import
///
/// Upsert parts from a CSV body by `(part_number, name)`. Every cell is
/// validated first; any violation rejects the whole file with per-row,
/// per-column errors.
pub async fn import_parts(
    State(state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let snapshot: Arc<SchemaSnapshot> = state.snapshot().await?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| AppError::BadRequest(format!("Invalid CSV header: {e}")))?
        .clone();
    let columns = ImportColumns::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut violations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record =
            record.map_err(|e| AppError::BadRequest(format!("Invalid CSV at row {row}: {e}")))?;
        if let Some(parsed) = import_row(&snapshot, &columns, &record, row, &mut violations) {
            rows.push(parsed);
        }
    }
    if !violations.is_empty() {
        tracing::info!(violations = violations.len(), "Part import rejected");
        return Err(AppError::FieldErrors(violations));
    }

    let summary = PartRepo::import(&state.pool, &rows).await?;

    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        values = summary.values_written,
        "Parts imported"
    );

    Ok(Json(DataResponse { data: summary }))
}
