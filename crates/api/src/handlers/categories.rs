//! Handlers for categories, attribute definitions and choice options.
//!
//! Every mutation here bumps the schema revision, so the next request picks
//! up a fresh snapshot.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::eav::{AttributeDef, DataType, EavError, SchemaSnapshot};
use stockroom_core::error::CoreError;
use stockroom_core::naming::{attribute_code, slugify, unique_slug, validate_slug};
use stockroom_core::types::DbId;
use stockroom_db::models::attribute::{CreateAttribute, NewAttribute, UpdateAttribute};
use stockroom_db::models::category::{CreateCategory, UpdateCategory};
use stockroom_db::models::choice::{CreateChoice, UpdateChoice};
use stockroom_db::repositories::{AttributeRepo, CategoryRepo, ChoiceRepo};
use validator::Validate;

use crate::error::{AppError, AppResult, ATTRIBUTE_CODE_CONSTRAINT};
use crate::query::DeleteParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up an attribute and check it belongs to `category_id`.
fn category_attribute(
    snapshot: &SchemaSnapshot,
    category_id: DbId,
    attr_id: DbId,
) -> AppResult<AttributeDef> {
    if snapshot.category(category_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    snapshot
        .attribute(attr_id)
        .filter(|a| a.category_id == category_id)
        .cloned()
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attribute",
            id: attr_id,
        }))
}

/// A concurrent writer can claim `code` between the snapshot check and the
/// insert; report that the same way as the snapshot check does.
fn duplicate_code(err: sqlx::Error, code: &str) -> AppError {
    AppError::from(err).on_unique_violation(ATTRIBUTE_CODE_CONSTRAINT, || {
        EavError::DuplicateCode {
            code: code.to_string(),
        }
        .into()
    })
}

/// Next `sort_order` after the last existing entry.
fn next_sort_order(orders: impl Iterator<Item = i32>) -> i32 {
    orders.max().map_or(0, |max| max + 1)
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/categories
///
/// List categories with their field and part counts.
pub async fn list_categories(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list_with_counts(&state.pool).await?;

    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/categories
///
/// Create a category. Without an explicit slug one is derived from the name,
/// suffixed `-1`, `-2`, ... on collision.
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let name = input.name.trim();

    let slug = match trimmed(input.slug.as_deref()) {
        Some(slug) => {
            validate_slug(slug)?;
            slug.to_string()
        }
        None => {
            let base = slugify(name);
            if base.is_empty() {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Cannot derive a slug from '{name}'"
                ))));
            }
            let taken: HashSet<String> = CategoryRepo::slugs_like(&state.pool, &base)
                .await?
                .into_iter()
                .collect();
            unique_slug(&base, |candidate| taken.contains(candidate))
        }
    };

    let category = CategoryRepo::create(&state.pool, name, &slug).await?;

    tracing::info!(category_id = category.id, slug = %category.slug, "Category created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    Ok(Json(DataResponse { data: category }))
}

/// GET /api/v1/categories/{id}/schema
///
/// Attributes of the category in display order, each with its options, plus
/// the schema revision the answer was read at.
pub async fn get_schema(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.snapshot().await?;
    let schema = snapshot
        .category_schema(category_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;

    Ok(Json(DataResponse { data: schema }))
}

/// PUT /api/v1/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let slug = trimmed(input.slug.as_deref());
    if let Some(slug) = slug {
        validate_slug(slug)?;
    }

    let category = CategoryRepo::update(
        &state.pool,
        category_id,
        trimmed(input.name.as_deref()),
        slug,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Category",
        id: category_id,
    }))?;

    tracing::info!(category_id, "Category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}?cascade=
///
/// Refused with 409 while parts are assigned, unless `cascade=true`: then
/// the parts are unassigned and their values for this category removed.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let deleted = if params.cascade {
        CategoryRepo::delete_cascade(&state.pool, category_id).await?
    } else {
        let parts = CategoryRepo::count_parts(&state.pool, category_id).await?;
        if parts > 0 {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Category {category_id} is assigned to {parts} part(s); \
                 delete with cascade=true to unassign them"
            ))));
        }
        CategoryRepo::delete(&state.pool, category_id).await?
    };

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }

    tracing::info!(category_id, cascade = params.cascade, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// GET /api/v1/categories/{id}/attributes
pub async fn list_attributes(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.snapshot().await?;
    if snapshot.category(category_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    let attributes: Vec<AttributeDef> = snapshot
        .list_attributes(category_id)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(DataResponse { data: attributes }))
}

/// POST /api/v1/categories/{id}/attributes
///
/// Create an attribute. The code defaults to the name in snake case and must
/// be unique within the category.
pub async fn create_attribute(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
    Json(input): Json<CreateAttribute>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let snapshot = state.snapshot().await?;
    if snapshot.category(category_id).is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }

    let name = input.name.trim().to_string();
    let code = match trimmed(input.code.as_deref()) {
        Some(code) => code.to_string(),
        None => attribute_code(&name),
    };
    validate_slug(&code)?;
    snapshot.ensure_code_available(category_id, &code, None)?;

    let sort_order = input.sort_order.unwrap_or_else(|| {
        next_sort_order(
            snapshot
                .list_attributes(category_id)
                .into_iter()
                .map(|a| a.sort_order),
        )
    });

    let new = NewAttribute {
        name,
        code,
        data_type: input.data_type,
        unit: trimmed(input.unit.as_deref()).map(str::to_string),
        is_required: input.is_required,
        sort_order,
        help_text: trimmed(input.help_text.as_deref()).map(str::to_string),
    };
    let attribute = AttributeRepo::create(&state.pool, category_id, &new)
        .await
        .map_err(|err| duplicate_code(err, &new.code))?;

    tracing::info!(
        category_id,
        attribute_id = attribute.id,
        code = %attribute.code,
        data_type = %attribute.data_type,
        "Attribute created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: attribute })))
}

/// PUT /api/v1/categories/{id}/attributes/{attr_id}
///
/// Update an attribute. The data type cannot change once created.
pub async fn update_attribute(
    State(state): State<AppState>,
    Path((category_id, attr_id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateAttribute>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let snapshot = state.snapshot().await?;
    category_attribute(&snapshot, category_id, attr_id)?;

    if let Some(code) = trimmed(input.code.as_deref()).map(str::to_string) {
        validate_slug(&code)?;
        snapshot.ensure_code_available(category_id, &code, Some(attr_id))?;
        input.code = Some(code);
    } else {
        input.code = None;
    }

    let attribute = AttributeRepo::update(&state.pool, attr_id, &input)
        .await
        .map_err(|err| match input.code.as_deref() {
            Some(code) => duplicate_code(err, code),
            None => err.into(),
        })?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Attribute",
            id: attr_id,
        }))?;

    tracing::info!(category_id, attribute_id = attr_id, "Attribute updated");

    Ok(Json(DataResponse { data: attribute }))
}

/// DELETE /api/v1/categories/{id}/attributes/{attr_id}?cascade=
///
/// Refused with 409 while parts hold values for the attribute, unless
/// `cascade=true`.
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path((category_id, attr_id)): Path<(DbId, DbId)>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.snapshot().await?;
    let attribute = category_attribute(&snapshot, category_id, attr_id)?;

    if !params.cascade {
        let values = AttributeRepo::count_values(&state.pool, attr_id).await?;
        if values > 0 {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Attribute '{}' has {values} stored value(s); \
                 delete with cascade=true to remove them",
                attribute.code
            ))));
        }
    }

    if !AttributeRepo::delete(&state.pool, attr_id, params.cascade).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Attribute",
            id: attr_id,
        }));
    }

    tracing::info!(
        category_id,
        attribute_id = attr_id,
        cascade = params.cascade,
        "Attribute deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Choices
// ---------------------------------------------------------------------------

/// GET /api/v1/categories/{id}/attributes/{attr_id}/choices
pub async fn list_choices(
    State(state): State<AppState>,
    Path((category_id, attr_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.snapshot().await?;
    let attribute = category_attribute(&snapshot, category_id, attr_id)?;
    let choices = snapshot.list_choices(&attribute)?.to_vec();

    Ok(Json(DataResponse { data: choices }))
}

/// POST /api/v1/categories/{id}/attributes/{attr_id}/choices
///
/// Add an option to a choice attribute. The label defaults to the value.
pub async fn create_choice(
    State(state): State<AppState>,
    Path((category_id, attr_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateChoice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let snapshot = state.snapshot().await?;
    let attribute = category_attribute(&snapshot, category_id, attr_id)?;
    let existing = snapshot.list_choices(&attribute)?;

    let value = input.value.trim();
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Choice value must not be empty".into(),
        )));
    }
    let label = trimmed(input.label.as_deref()).unwrap_or(value);
    let sort_order = input
        .sort_order
        .unwrap_or_else(|| next_sort_order(existing.iter().map(|c| c.sort_order)));

    let choice = ChoiceRepo::create(&state.pool, attr_id, value, label, sort_order).await?;

    tracing::info!(attribute_id = attr_id, choice_id = choice.id, "Choice created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: choice })))
}

/// PUT /api/v1/categories/{id}/attributes/{attr_id}/choices/{choice_id}
pub async fn update_choice(
    State(state): State<AppState>,
    Path((category_id, attr_id, choice_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateChoice>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let snapshot = state.snapshot().await?;
    let attribute = category_attribute(&snapshot, category_id, attr_id)?;
    if !snapshot
        .list_choices(&attribute)?
        .iter()
        .any(|c| c.id == choice_id)
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Choice",
            id: choice_id,
        }));
    }

    let choice = ChoiceRepo::update(
        &state.pool,
        choice_id,
        trimmed(input.value.as_deref()),
        trimmed(input.label.as_deref()),
        input.sort_order,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Choice",
        id: choice_id,
    }))?;

    tracing::info!(attribute_id = attr_id, choice_id, "Choice updated");

    Ok(Json(DataResponse { data: choice }))
}

/// DELETE /api/v1/categories/{id}/attributes/{attr_id}/choices/{choice_id}?cascade=
///
/// Refused with 409 while parts select the option, unless `cascade=true`.
pub async fn delete_choice(
    State(state): State<AppState>,
    Path((category_id, attr_id, choice_id)): Path<(DbId, DbId, DbId)>,
    Query(params): Query<DeleteParams>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state.snapshot().await?;
    let attribute = category_attribute(&snapshot, category_id, attr_id)?;
    if attribute.data_type != DataType::Choice
        || !snapshot.choices_for(attr_id).iter().any(|c| c.id == choice_id)
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Choice",
            id: choice_id,
        }));
    }

    if !params.cascade {
        let values = ChoiceRepo::count_values(&state.pool, choice_id).await?;
        if values > 0 {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Choice {choice_id} is selected by {values} part(s); \
                 delete with cascade=true to clear them"
            ))));
        }
    }

    if !ChoiceRepo::delete(&state.pool, choice_id, params.cascade).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Choice",
            id: choice_id,
        }));
    }

    tracing::info!(attribute_id = attr_id, choice_id, cascade = params.cascade, "Choice deleted");

    Ok(StatusCode::NO_CONTENT)
}
