//! Handlers for a part's spec values (the custom-field value store) and the
//! spec form projection.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::eav::form::build_form;
use stockroom_core::eav::reconcile::{plan_category_change, Reconciliation};
use stockroom_core::eav::value::{parse_input, raw_from_json};
use stockroom_core::eav::{AttributeDef, EavError, FieldViolation, SchemaSnapshot, TypedValue};
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::attribute_value::{
    BatchSpecValues, SetSpecValue, SpecValue, ValueWrite,
};
use stockroom_db::models::part::Part;
use stockroom_db::repositories::{AttributeValueRepo, PartRepo};
use stockroom_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::query::FormParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub(crate) async fn load_part(pool: &DbPool, part_id: DbId) -> AppResult<Part> {
    PartRepo::find_by_id(pool, part_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Part",
            id: part_id,
        }))
}

/// Every stored value of a part as `(attribute id, value)`.
pub(crate) async fn stored_values(
    pool: &DbPool,
    part_id: DbId,
) -> AppResult<Vec<(DbId, TypedValue)>> {
    let rows = AttributeValueRepo::list_for_part(pool, part_id).await?;
    rows.into_iter()
        .map(|row| -> AppResult<(DbId, TypedValue)> {
            let (_, attribute_id, value) = row.into_typed()?;
            Ok((attribute_id, value))
        })
        .collect()
}

/// The part's category, or a validation error when it has none.
fn require_category(part: &Part) -> AppResult<DbId> {
    part.category_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Part {} has no category, so it has no spec fields",
            part.id
        )))
    })
}

/// Look up `code` among the attributes of the part's category.
fn part_attribute<'s>(
    snapshot: &'s SchemaSnapshot,
    part: &Part,
    code: &str,
) -> AppResult<&'s AttributeDef> {
    let category_id = require_category(part)?;
    snapshot
        .attribute_by_code(category_id, code)
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Unknown attribute '{code}' for category {category_id}"
            )))
        })
}

/// Parse one raw JSON input for `attribute` into a write.
fn parse_write(
    snapshot: &SchemaSnapshot,
    attribute: &AttributeDef,
    input: &serde_json::Value,
) -> AppResult<ValueWrite> {
    let raw = raw_from_json(input).ok_or_else(|| {
        AppError::Eav(EavError::TypeMismatch {
            code: attribute.code.clone(),
            expected: attribute.data_type,
            input: input.to_string(),
        })
    })?;
    let value = parse_input(attribute, snapshot.choices_for(attribute.id), &raw)?;
    Ok(ValueWrite::resolve(snapshot, attribute, value)?)
}

/// Current values of a part in the category's attribute order.
async fn spec_values(
    pool: &DbPool,
    snapshot: &SchemaSnapshot,
    part: &Part,
) -> AppResult<Vec<SpecValue>> {
    let Some(category_id) = part.category_id else {
        return Ok(Vec::new());
    };
    let mut values: HashMap<DbId, TypedValue> =
        stored_values(pool, part.id).await?.into_iter().collect();
    Ok(snapshot
        .list_attributes(category_id)
        .into_iter()
        .filter_map(|attribute| {
            values
                .remove(&attribute.id)
                .map(|value| SpecValue::new(attribute, value))
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// GET /api/v1/parts/{id}/specs
///
/// Stored values of the part, in the category's attribute order.
pub async fn list_specs(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let specs = spec_values(&state.pool, &snapshot, &part).await?;

    Ok(Json(DataResponse { data: specs }))
}

/// PUT /api/v1/parts/{id}/specs
///
/// Write several values at once. Every field is validated first and all
/// violations are reported together; nothing is written unless all pass.
pub async fn set_specs(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Json(input): Json<BatchSpecValues>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let category_id = require_category(&part)?;

    let mut writes = Vec::with_capacity(input.values.len());
    let mut violations = Vec::new();
    for (code, raw) in &input.values {
        let Some(attribute) = snapshot.attribute_by_code(category_id, code) else {
            violations.push(FieldViolation::new(
                code.as_str(),
                "UNKNOWN_ATTRIBUTE",
                format!("Unknown attribute '{code}' for category {category_id}"),
            ));
            continue;
        };
        match parse_write(&snapshot, attribute, raw) {
            Ok(write) => writes.push(write),
            Err(AppError::Eav(err)) => violations.push(FieldViolation::from(&err)),
            Err(other) => return Err(other),
        }
    }
    if !violations.is_empty() {
        return Err(AppError::FieldErrors(violations));
    }

    AttributeValueRepo::write_batch(&state.pool, part_id, &writes).await?;

    tracing::info!(part_id, fields = writes.len(), "Spec values written");

    let specs = spec_values(&state.pool, &snapshot, &part).await?;
    Ok(Json(DataResponse { data: specs }))
}

/// GET /api/v1/parts/{id}/specs/{code}
///
/// The value of one attribute, `null` when absent.
pub async fn get_spec(
    State(state): State<AppState>,
    Path((part_id, code)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let attribute = part_attribute(&snapshot, &part, &code)?;

    let value = match AttributeValueRepo::get(&state.pool, part_id, attribute.id).await? {
        Some(row) => {
            let (_, _, value) = row.into_typed()?;
            Some(SpecValue::new(attribute, value))
        }
        None => None,
    };

    Ok(Json(DataResponse { data: value }))
}

/// PUT /api/v1/parts/{id}/specs/{code}
///
/// Parse and store one value. Empty input clears an optional attribute and
/// is rejected for a required one.
pub async fn set_spec(
    State(state): State<AppState>,
    Path((part_id, code)): Path<(DbId, String)>,
    Json(input): Json<SetSpecValue>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let attribute = part_attribute(&snapshot, &part, &code)?;

    let write = parse_write(&snapshot, attribute, &input.value)?;
    AttributeValueRepo::write_one(&state.pool, part_id, &write).await?;

    tracing::info!(
        part_id,
        code = %attribute.code,
        cleared = write.value.is_none(),
        "Spec value set"
    );

    let value = write.value.map(|value| SpecValue::new(attribute, value));
    Ok(Json(DataResponse { data: value }))
}

/// DELETE /api/v1/parts/{id}/specs/{code}
///
/// Clear one value. Required attributes cannot be cleared.
pub async fn clear_spec(
    State(state): State<AppState>,
    Path((part_id, code)): Path<(DbId, String)>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let attribute = part_attribute(&snapshot, &part, &code)?;
    if attribute.is_required {
        return Err(AppError::Eav(EavError::RequiredFieldMissing {
            code: attribute.code.clone(),
        }));
    }

    AttributeValueRepo::delete(&state.pool, part_id, attribute.id).await?;

    tracing::info!(part_id, code = %attribute.code, "Spec value cleared");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// GET /api/v1/parts/{id}/specs/form?category_id=
///
/// Editable fields of the part's category with current values. With a
/// different `category_id`, preview the form after a category change: values
/// that would be carried over are filled in, nothing is saved.
pub async fn spec_form(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Query(params): Query<FormParams>,
) -> AppResult<impl IntoResponse> {
    let part = load_part(&state.pool, part_id).await?;
    let snapshot = state.snapshot().await?;
    let current = stored_values(&state.pool, part_id).await?;

    let target = params.category_id.or(part.category_id);
    if let Some(category_id) = target {
        if snapshot.category(category_id).is_none() {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "Category",
                id: category_id,
            }));
        }
    }

    let values: HashMap<DbId, TypedValue> = if target == part.category_id {
        current.into_iter().collect()
    } else {
        plan_category_change(&snapshot, &current, target, Reconciliation::KeepMatching)
            .carry
            .into_iter()
            .map(|carried| (carried.to_attribute_id, carried.value))
            .collect()
    };

    let form = build_form(&snapshot, target, &values);
    Ok(Json(DataResponse { data: form }))
}
