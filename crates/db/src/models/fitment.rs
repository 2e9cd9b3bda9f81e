//! Fitment links: which engines and parts go with which machines, which
//! parts go with which engines, and which engines replace older ones.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stockroom_core::types::{DbId, Timestamp};
use validator::Validate;

/// A `machine_engines` row joined with both ends' display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MachineEngineLink {
    pub id: DbId,
    pub machine_id: DbId,
    pub engine_id: DbId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub engine_make: String,
    pub engine_model: String,
    pub serial_number: Option<String>,
    pub notes: Option<String>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `machine_parts` row joined with both ends' display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MachinePartLink {
    pub id: DbId,
    pub machine_id: DbId,
    pub part_id: DbId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub part_number: String,
    pub part_name: String,
    pub notes: Option<String>,
    pub is_primary: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An `engine_parts` row joined with both ends' display fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnginePartLink {
    pub id: DbId,
    pub engine_id: DbId,
    pub part_id: DbId,
    pub engine_make: String,
    pub engine_model: String,
    pub serial_number: Option<String>,
    pub part_number: String,
    pub part_name: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An `engine_supersessions` row. `from_engine_id` is replaced by
/// `to_engine_id`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EngineSupersession {
    pub id: DbId,
    pub from_engine_id: DbId,
    pub from_engine_make: String,
    pub from_engine_model: String,
    pub to_engine_id: DbId,
    pub to_engine_make: String,
    pub to_engine_model: String,
    pub notes: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Both directions of an engine's supersession history.
#[derive(Debug, Clone, Serialize)]
pub struct SupersessionHistory {
    /// Older engines this one replaces.
    pub supersedes: Vec<EngineSupersession>,
    /// Newer engines replacing this one.
    pub superseded_by: Vec<EngineSupersession>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkEngine {
    pub engine_id: DbId,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LinkPart {
    pub part_id: DbId,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Ignored for engine-part links, which have no primary flag.
    #[serde(default)]
    pub is_primary: bool,
}

/// Body of `POST /engines/{id}/supersessions`. Exactly one of the two ids
/// names the other engine.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSupersession {
    /// The path engine supersedes this older engine.
    pub older_engine_id: Option<DbId>,
    /// This newer engine supersedes the path engine.
    pub newer_engine_id: Option<DbId>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub effective_date: Option<NaiveDate>,
}
