//! Handlers for fitment links between machines, engines and parts, and for
//! engine supersession.
//!
//! Both ends of a link must exist (404 otherwise). Linking the same pair
//! twice is a conflict.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::engine::Engine;
use stockroom_db::models::fitment::{CreateSupersession, LinkEngine, LinkPart};
use stockroom_db::models::machine::Machine;
use stockroom_db::repositories::{EngineFitmentRepo, EngineRepo, MachineFitmentRepo, MachineRepo};
use stockroom_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::specs::load_part;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

async fn load_machine(pool: &DbPool, machine_id: DbId) -> AppResult<Machine> {
    MachineRepo::find_by_id(pool, machine_id)
        .await?
        .ok_or_else(|| not_found("Machine", machine_id))
}

async fn load_engine(pool: &DbPool, engine_id: DbId) -> AppResult<Engine> {
    EngineRepo::find_by_id(pool, engine_id)
        .await?
        .ok_or_else(|| not_found("Engine", engine_id))
}

// ---------------------------------------------------------------------------
// Machine side
// ---------------------------------------------------------------------------

/// GET /api/v1/machines/{id}/engines
pub async fn list_machine_engines(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_machine(&state.pool, machine_id).await?;
    let links = MachineFitmentRepo::engines_for_machine(&state.pool, machine_id).await?;

    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/machines/{id}/engines
///
/// `is_primary: true` takes the primary flag from the machine's other engine.
pub async fn link_machine_engine(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
    Json(input): Json<LinkEngine>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    load_machine(&state.pool, machine_id).await?;
    load_engine(&state.pool, input.engine_id).await?;

    let link = MachineFitmentRepo::link_engine(&state.pool, machine_id, &input).await?;

    tracing::info!(
        machine_id,
        engine_id = input.engine_id,
        is_primary = input.is_primary,
        "Engine linked to machine"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/machines/{id}/engines/{engine_id}
pub async fn unlink_machine_engine(
    State(state): State<AppState>,
    Path((machine_id, engine_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !MachineFitmentRepo::unlink_engine(&state.pool, machine_id, engine_id).await? {
        return Err(not_found("MachineEngine", engine_id));
    }

    tracing::info!(machine_id, engine_id, "Engine unlinked from machine");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/machines/{id}/parts
pub async fn list_machine_parts(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_machine(&state.pool, machine_id).await?;
    let links = MachineFitmentRepo::parts_for_machine(&state.pool, machine_id).await?;

    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/machines/{id}/parts
pub async fn link_machine_part(
    State(state): State<AppState>,
    Path(machine_id): Path<DbId>,
    Json(input): Json<LinkPart>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    load_machine(&state.pool, machine_id).await?;
    load_part(&state.pool, input.part_id).await?;

    let link = MachineFitmentRepo::link_part(&state.pool, machine_id, &input).await?;

    tracing::info!(machine_id, part_id = input.part_id, "Part linked to machine");

    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/machines/{id}/parts/{part_id}
pub async fn unlink_machine_part(
    State(state): State<AppState>,
    Path((machine_id, part_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !MachineFitmentRepo::unlink_part(&state.pool, machine_id, part_id).await? {
        return Err(not_found("MachinePart", part_id));
    }

    tracing::info!(machine_id, part_id, "Part unlinked from machine");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Engine side
// ---------------------------------------------------------------------------

/// GET /api/v1/engines/{id}/machines
pub async fn list_engine_machines(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_engine(&state.pool, engine_id).await?;
    let links = MachineFitmentRepo::machines_for_engine(&state.pool, engine_id).await?;

    Ok(Json(DataResponse { data: links }))
}

/// GET /api/v1/engines/{id}/parts
pub async fn list_engine_parts(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_engine(&state.pool, engine_id).await?;
    let links = EngineFitmentRepo::parts_for_engine(&state.pool, engine_id).await?;

    Ok(Json(DataResponse { data: links }))
}

/// POST /api/v1/engines/{id}/parts
pub async fn link_engine_part(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
    Json(input): Json<LinkPart>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    load_engine(&state.pool, engine_id).await?;
    load_part(&state.pool, input.part_id).await?;

    let link = EngineFitmentRepo::link_part(&state.pool, engine_id, &input).await?;

    tracing::info!(engine_id, part_id = input.part_id, "Part linked to engine");

    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/engines/{id}/parts/{part_id}
pub async fn unlink_engine_part(
    State(state): State<AppState>,
    Path((engine_id, part_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !EngineFitmentRepo::unlink_part(&state.pool, engine_id, part_id).await? {
        return Err(not_found("EnginePart", part_id));
    }

    tracing::info!(engine_id, part_id, "Part unlinked from engine");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/engines/{id}/supersessions
pub async fn list_supersessions(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_engine(&state.pool, engine_id).await?;
    let history = EngineFitmentRepo::supersessions(&state.pool, engine_id).await?;

    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/engines/{id}/supersessions
///
/// `older_engine_id` records that this engine replaces an older one;
/// `newer_engine_id` records that a newer one replaces this engine.
pub async fn add_supersession(
    State(state): State<AppState>,
    Path(engine_id): Path<DbId>,
    Json(input): Json<CreateSupersession>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let (from_engine_id, to_engine_id, other) =
        match (input.older_engine_id, input.newer_engine_id) {
            (Some(older), None) => (older, engine_id, older),
            (None, Some(newer)) => (engine_id, newer, newer),
            _ => {
                return Err(AppError::BadRequest(
                    "Exactly one of older_engine_id and newer_engine_id is required".into(),
                ))
            }
        };
    if other == engine_id {
        return Err(AppError::BadRequest("An engine cannot supersede itself".into()));
    }
    load_engine(&state.pool, engine_id).await?;
    load_engine(&state.pool, other).await?;

    let supersession = EngineFitmentRepo::create_supersession(
        &state.pool,
        from_engine_id,
        to_engine_id,
        input.notes.as_deref(),
        input.effective_date,
    )
    .await?;

    tracing::info!(from_engine_id, to_engine_id, "Engine supersession recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: supersession })))
}

/// DELETE /api/v1/engines/{id}/supersessions/{supersession_id}
///
/// The record must involve this engine on one side.
pub async fn remove_supersession(
    State(state): State<AppState>,
    Path((engine_id, supersession_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !EngineFitmentRepo::delete_supersession(&state.pool, engine_id, supersession_id).await? {
        return Err(not_found("EngineSupersession", supersession_id));
    }

    tracing::info!(engine_id, supersession_id, "Engine supersession removed");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Part side
// ---------------------------------------------------------------------------

/// GET /api/v1/parts/{id}/machines
pub async fn list_part_machines(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_part(&state.pool, part_id).await?;
    let links = MachineFitmentRepo::machines_for_part(&state.pool, part_id).await?;

    Ok(Json(DataResponse { data: links }))
}

/// GET /api/v1/parts/{id}/engines
pub async fn list_part_engines(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_part(&state.pool, part_id).await?;
    let links = EngineFitmentRepo::engines_for_part(&state.pool, part_id).await?;

    Ok(Json(DataResponse { data: links }))
}
