//! Attribute definition models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::eav::{AttributeDef, DataType};
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `part_attributes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartAttribute {
    pub id: DbId,
    pub category_id: DbId,
    pub name: String,
    pub code: String,
    #[sqlx(try_from = "String")]
    pub data_type: DataType,
    pub unit: Option<String>,
    pub is_required: bool,
    pub sort_order: i32,
    pub help_text: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PartAttribute> for AttributeDef {
    fn from(row: PartAttribute) -> Self {
        AttributeDef {
            id: row.id,
            category_id: row.category_id,
            name: row.name,
            code: row.code,
            data_type: row.data_type,
            unit: row.unit,
            is_required: row.is_required,
            sort_order: row.sort_order,
            help_text: row.help_text,
        }
    }
}

/// DTO for creating an attribute. `code` defaults to the slugified name.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAttribute {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 140))]
    pub code: Option<String>,
    pub data_type: DataType,
    #[validate(length(max = 40))]
    pub unit: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    pub sort_order: Option<i32>,
    #[validate(length(max = 200))]
    pub help_text: Option<String>,
}

/// DTO for updating an attribute. The data type is fixed once created.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAttribute {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 140))]
    pub code: Option<String>,
    #[validate(length(max = 40))]
    pub unit: Option<String>,
    pub is_required: Option<bool>,
    pub sort_order: Option<i32>,
    #[validate(length(max = 200))]
    pub help_text: Option<String>,
}

/// Attribute fields after code resolution, as written by the repository.
#[derive(Debug, Clone)]
pub struct NewAttribute {
    pub name: String,
    pub code: String,
    pub data_type: DataType,
    pub unit: Option<String>,
    pub is_required: bool,
    pub sort_order: i32,
    pub help_text: Option<String>,
}
