//! Part-vendor offer models and DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A `part_vendors` row joined with the vendor name and primary flag.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartVendorOffer {
    pub id: DbId,
    pub part_id: DbId,
    pub vendor_id: DbId,
    pub vendor_name: String,
    pub vendor_sku: Option<String>,
    pub cost: Option<Decimal>,
    pub stock_qty: Option<i32>,
    pub lead_time_days: Option<i32>,
    pub notes: Option<String>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePartVendor {
    pub vendor_id: DbId,
    #[validate(length(max = 120))]
    pub vendor_sku: Option<String>,
    pub cost: Option<Decimal>,
    pub stock_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub lead_time_days: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePartVendor {
    #[validate(length(max = 120))]
    pub vendor_sku: Option<String>,
    pub cost: Option<Decimal>,
    pub stock_qty: Option<i32>,
    #[validate(range(min = 0))]
    pub lead_time_days: Option<i32>,
    pub notes: Option<String>,
}
