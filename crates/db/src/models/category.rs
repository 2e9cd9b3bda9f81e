//! Part category models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::eav::Category;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from the `part_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartCategory {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PartCategory> for Category {
    fn from(row: PartCategory) -> Self {
        Category {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

/// Category list entry with field and part counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCounts {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub field_count: i64,
    pub part_count: i64,
}

/// DTO for creating a category. The slug is derived from the name when
/// omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 140))]
    pub slug: Option<String>,
}

/// DTO for renaming a category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 140))]
    pub slug: Option<String>,
}
