//! Handlers for the vendors offering a part and its primary vendor.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::part_vendor::{CreatePartVendor, UpdatePartVendor};
use stockroom_db::repositories::{PartVendorRepo, VendorRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::specs::load_part;
use crate::response::DataResponse;
use crate::state::AppState;

fn offer_not_found(vendor_id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PartVendor",
        id: vendor_id,
    })
}

/// GET /api/v1/parts/{id}/vendors
///
/// Offers for the part, primary vendor first, then cheapest.
pub async fn list_offers(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_part(&state.pool, part_id).await?;
    let offers = PartVendorRepo::list_for_part(&state.pool, part_id).await?;

    Ok(Json(DataResponse { data: offers }))
}

/// POST /api/v1/parts/{id}/vendors
///
/// Add a vendor offer. One offer per vendor; a second one is a conflict.
pub async fn add_offer(
    State(state): State<AppState>,
    Path(part_id): Path<DbId>,
    Json(input): Json<CreatePartVendor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    load_part(&state.pool, part_id).await?;
    VendorRepo::find_by_id(&state.pool, input.vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: input.vendor_id,
        }))?;

    let offer = PartVendorRepo::create(&state.pool, part_id, &input).await?;

    tracing::info!(part_id, vendor_id = input.vendor_id, "Vendor offer added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: offer })))
}

/// PUT /api/v1/parts/{id}/vendors/{vendor_id}
pub async fn update_offer(
    State(state): State<AppState>,
    Path((part_id, vendor_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdatePartVendor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let offer = PartVendorRepo::update(&state.pool, part_id, vendor_id, &input)
        .await?
        .ok_or_else(|| offer_not_found(vendor_id))?;

    tracing::info!(part_id, vendor_id, "Vendor offer updated");

    Ok(Json(DataResponse { data: offer }))
}

/// DELETE /api/v1/parts/{id}/vendors/{vendor_id}
///
/// Removing the primary vendor's offer leaves the part without one.
pub async fn remove_offer(
    State(state): State<AppState>,
    Path((part_id, vendor_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !PartVendorRepo::delete(&state.pool, part_id, vendor_id).await? {
        return Err(offer_not_found(vendor_id));
    }

    tracing::info!(part_id, vendor_id, "Vendor offer removed");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/parts/{id}/vendors/{vendor_id}/primary
///
/// Make an existing offer's vendor the part's primary vendor.
pub async fn set_primary_vendor(
    State(state): State<AppState>,
    Path((part_id, vendor_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !PartVendorRepo::set_primary(&state.pool, part_id, vendor_id).await? {
        return Err(offer_not_found(vendor_id));
    }
    let offer = PartVendorRepo::find(&state.pool, part_id, vendor_id)
        .await?
        .ok_or_else(|| offer_not_found(vendor_id))?;

    tracing::info!(part_id, vendor_id, "Primary vendor set");

    Ok(Json(DataResponse { data: offer }))
}
