//! Machine models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `machines` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Machine {
    pub id: DbId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub machine_type: String,
    pub market_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMachine {
    #[validate(length(min = 1, max = 100))]
    pub make: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
    #[validate(length(min = 1, max = 100))]
    pub machine_type: String,
    #[validate(length(min = 1, max = 100))]
    pub market_type: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateMachine {
    #[validate(length(min = 1, max = 100))]
    pub make: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100))]
    pub year: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub machine_type: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub market_type: Option<String>,
}

/// Query parameters for `GET /api/v1/machines`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MachineListParams {
    /// Case-insensitive match on make, model or type.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
