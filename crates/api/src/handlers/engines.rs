//! Handlers for engines.
//!
//! Engines are tracked individually by serial number alongside their
//! CPL/AR numbers and asking price.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::engine::{CreateEngine, EngineListParams, UpdateEngine};
use stockroom_db::repositories::EngineRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/engines
///
/// List engines; `search` matches make, model or serial number.
pub async fn list_engines(
    State(state): State<AppState>,
    Query(params): Query<EngineListParams>,
) -> AppResult<impl IntoResponse> {
    let engines = EngineRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: engines }))
}

/// POST /api/v1/engines
pub async fn create_engine(
    State(state): State<AppState>,
    Json(input): Json<CreateEngine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let engine = EngineRepo::create(&state.pool, &input).await?;

    tracing::info!(engine_id = engine.id, "Engine created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: engine })))
}

/// GET /api/v1/engines/{id}
pub async fn get_engine(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let engine = EngineRepo::find_by_id(&state.pool, engine_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Engine",
            id: engine_id,
        }))?;

    Ok(Json(DataResponse { data: engine }))
}

/// PUT /api/v1/engines/{id}
pub async fn update_engine(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
    Json(input): Json<UpdateEngine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let engine = EngineRepo::update(&state.pool, engine_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Engine",
            id: engine_id,
        }))?;

    tracing::info!(engine_id, "Engine updated");

    Ok(Json(DataResponse { data: engine }))
}

/// DELETE /api/v1/engines/{id}
pub async fn delete_engine(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !EngineRepo::delete(&state.pool, engine_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Engine",
            id: engine_id,
        }));
    }

    tracing::info!(engine_id, "Engine deleted");

    Ok(StatusCode::NO_CONTENT)
}
