//! Part models, DTOs and listing parameters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::eav::filter::{ClauseInput, ClauseSet};
use stockroom_core::eav::reconcile::Reconciliation;
use stockroom_core::listing::SortField;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

use crate::models::attribute_value::ValueWrite;

/// Sortable part list fields and the columns they order by.
pub const PART_SORT_FIELDS: &[SortField] = &[
    ("part_number", "p.part_number"),
    ("name", "p.name"),
    ("category", "c.name"),
    ("manufacturer", "p.manufacturer"),
    ("type", "p.part_type"),
    ("updated_at", "p.updated_at"),
];

/// Default part list order.
pub const PART_DEFAULT_SORT: &str = "part_number";

/// A row from the `parts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Part {
    pub id: DbId,
    pub part_number: String,
    pub name: String,
    pub category_id: Option<DbId>,
    pub manufacturer: Option<String>,
    pub unit: Option<String>,
    pub part_type: Option<String>,
    pub manufacturer_type: Option<String>,
    pub primary_vendor_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A part joined with its category and primary vendor names, as listed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PartSummary {
    pub id: DbId,
    pub part_number: String,
    pub name: String,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub manufacturer: Option<String>,
    pub unit: Option<String>,
    pub part_type: Option<String>,
    pub manufacturer_type: Option<String>,
    pub primary_vendor_id: Option<DbId>,
    pub primary_vendor_name: Option<String>,
    pub updated_at: Timestamp,
}

/// DTO for creating a part. Also used for CSV import rows.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePart {
    #[validate(length(min = 1, max = 100))]
    pub part_number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category_id: Option<DbId>,
    #[validate(length(max = 100))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(length(max = 100))]
    pub part_type: Option<String>,
    #[validate(length(max = 100))]
    pub manufacturer_type: Option<String>,
}

/// DTO for updating a part's plain fields. The category is changed through
/// the reconciling category endpoint instead.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePart {
    #[validate(length(min = 1, max = 100))]
    pub part_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(length(max = 100))]
    pub part_type: Option<String>,
    #[validate(length(max = 100))]
    pub manufacturer_type: Option<String>,
}

/// Query parameters for `GET /api/v1/parts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartListParams {
    /// Case-insensitive match on part number or name.
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    pub manufacturer: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

/// Body of `POST /parts/search` and `POST /parts/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartSearchRequest {
    pub category_id: Option<DbId>,
    pub search: Option<String>,
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub clauses: Vec<ClauseInput>,
    pub sort: Option<String>,
    pub page: Option<usize>,
}

impl From<PartListParams> for PartSearchRequest {
    fn from(params: PartListParams) -> Self {
        Self {
            category_id: params.category_id,
            search: params.search,
            manufacturer: params.manufacturer,
            clauses: Vec::new(),
            sort: params.sort,
            page: params.page,
        }
    }
}

/// A part search with attribute clauses already resolved against the schema.
#[derive(Debug, Clone, Default)]
pub struct PartFilter {
    pub category_id: Option<DbId>,
    /// Case-insensitive substring of part number or name.
    pub search: Option<String>,
    pub manufacturer: Option<String>,
    pub clauses: ClauseSet,
}

/// Body of `POST /parts/{id}/category`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangeCategory {
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub mode: Reconciliation,
}

/// Body of `POST /parts/bulk-category`.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkCategoryChange {
    pub part_ids: Vec<DbId>,
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub mode: Reconciliation,
}

/// Query parameters carrying an optional target category
/// (`/specs/form`, `/category-preview`).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryParam {
    pub category_id: Option<DbId>,
    #[serde(default)]
    pub mode: Reconciliation,
}

/// One validated CSV row: plain fields plus resolved spec writes.
#[derive(Debug, Clone)]
pub struct PartImportRow {
    pub part: CreatePart,
    pub values: Vec<ValueWrite>,
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub values_written: usize,
}
