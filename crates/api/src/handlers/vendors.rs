//! Handlers for vendors.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::error::CoreError;
use stockroom_core::types::DbId;
use stockroom_db::models::vendor::{CreateVendor, UpdateVendor, VendorListParams};
use stockroom_db::repositories::VendorRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/vendors
///
/// List vendors by name; `search` matches name, contact or email.
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(params): Query<VendorListParams>,
) -> AppResult<impl IntoResponse> {
    let vendors = VendorRepo::list(&state.pool, &params).await?;

    Ok(Json(DataResponse { data: vendors }))
}

/// POST /api/v1/vendors
pub async fn create_vendor(
    State(state): State<AppState>,
    Json(input): Json<CreateVendor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let vendor = VendorRepo::create(&state.pool, &input).await?;

    tracing::info!(vendor_id = vendor.id, name = %vendor.name, "Vendor created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: vendor })))
}

/// GET /api/v1/vendors/{id}
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let vendor = VendorRepo::find_by_id(&state.pool, vendor_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    Ok(Json(DataResponse { data: vendor }))
}

/// PUT /api/v1/vendors/{id}
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
    Json(input): Json<UpdateVendor>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let vendor = VendorRepo::update(&state.pool, vendor_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }))?;

    tracing::info!(vendor_id, "Vendor updated");

    Ok(Json(DataResponse { data: vendor }))
}

/// DELETE /api/v1/vendors/{id}
///
/// The vendor's offers go with it; parts that had it as primary vendor are
/// left without one.
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !VendorRepo::delete(&state.pool, vendor_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Vendor",
            id: vendor_id,
        }));
    }

    tracing::info!(vendor_id, "Vendor deleted");

    Ok(StatusCode::NO_CONTENT)
}
