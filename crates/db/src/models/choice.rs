//! Choice option models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::eav::ChoiceOption;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `part_attribute_choices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartAttributeChoice {
    pub id: DbId,
    pub attribute_id: DbId,
    pub value: String,
    pub label: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PartAttributeChoice> for ChoiceOption {
    fn from(row: PartAttributeChoice) -> Self {
        ChoiceOption {
            id: row.id,
            attribute_id: row.attribute_id,
            value: row.value,
            label: row.label,
            sort_order: row.sort_order,
        }
    }
}

/// DTO for adding a choice. `label` defaults to the value.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChoice {
    #[validate(length(min = 1, max = 120))]
    pub value: String,
    #[validate(length(min = 1, max = 120))]
    pub label: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateChoice {
    #[validate(length(min = 1, max = 120))]
    pub value: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub label: Option<String>,
    pub sort_order: Option<i32>,
}
