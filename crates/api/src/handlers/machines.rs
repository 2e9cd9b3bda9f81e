//! Handlers for machines (make, model, year and market).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::machine::{CreateMachine, MachineListParams, UpdateMachine};
use stockroom_db::repositories::MachineRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/machines
///
/// List machines; `search` matches make, model or machine type.
pub async fn list_machines(
    State(state): State<AppState>,
    Query(params): Query<MachineListParams>,
) -> AppResult<impl IntoResponse> {
    let machines = MachineRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: machines }))
}

/// POST /api/v1/machines
pub async fn create_machine(
    State(state): State<AppState>,
    Json(input): Json<CreateMachine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let machine = MachineRepo::create(&state.pool, &input).await?;

    tracing::info!(
        machine_id = machine.id,
        make = %machine.make,
        model = %machine.model,
        year = machine.year,
        "Machine created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: machine })))
}

/// GET /api/v1/machines/{id}
pub async fn get_machine(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let machine = MachineRepo::find_by_id(&state.pool, machine_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id: machine_id,
        }))?;

    Ok(Json(DataResponse { data: machine }))
}

/// PUT /api/v1/machines/{id}
pub async fn update_machine(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
    Json(input): Json<UpdateMachine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let machine = MachineRepo::update(&state.pool, machine_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id: machine_id,
        }))?;

    tracing::info!(machine_id, "Machine updated");

    Ok(Json(DataResponse { data: machine }))
}

/// DELETE /api/v1/machines/{id}
pub async fn delete_machine(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !MachineRepo::delete(&state.pool, machine_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Machine",
            id: machine_id,
        }));
    }

    tracing::info!(machine_id, "Machine deleted");

    Ok(StatusCode::NO_CONTENT)
}
