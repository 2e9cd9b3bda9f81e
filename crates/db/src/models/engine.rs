//! Engine models and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `engines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Engine {
    pub id: DbId,
    pub engine_make: String,
    pub engine_model: String,
    pub serial_number: Option<String>,
    pub cpl_number: Option<String>,
    pub ar_number: Option<String>,
    pub cylinder: Option<i32>,
    pub compression_ratio: Option<Decimal>,
    pub price: Option<Decimal>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEngine {
    #[validate(length(min = 1, max = 100))]
    pub engine_make: String,
    #[validate(length(min = 1, max = 100))]
    pub engine_model: String,
    #[validate(length(max = 120))]
    pub serial_number: Option<String>,
    #[validate(length(max = 50))]
    pub cpl_number: Option<String>,
    #[validate(length(max = 50))]
    pub ar_number: Option<String>,
    #[validate(range(min = 0))]
    pub cylinder: Option<i32>,
    pub compression_ratio: Option<Decimal>,
    pub price: Option<Decimal>,
    #[validate(length(max = 100))]
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEngine {
    #[validate(length(min = 1, max = 100))]
    pub engine_make: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub engine_model: Option<String>,
    #[validate(length(max = 120))]
    pub serial_number: Option<String>,
    #[validate(length(max = 50))]
    pub cpl_number: Option<String>,
    #[validate(length(max = 50))]
    pub ar_number: Option<String>,
    #[validate(range(min = 0))]
    pub cylinder: Option<i32>,
    pub compression_ratio: Option<Decimal>,
    pub price: Option<Decimal>,
    #[validate(length(max = 100))]
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// Query parameters for `GET /api/v1/engines`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineListParams {
    /// Case-insensitive match on make, model or serial number.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
