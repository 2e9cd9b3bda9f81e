//! Shared query parameter types for API handlers.

use serde::Deserialize;
use stockroom_core::types::DbId;

/// `?cascade=` flag on guarded deletes. Without it, deleting something still
/// referenced is rejected with 409.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub cascade: bool,
}

/// `?category_id=` on the spec form: preview the form of another category.
#[derive(Debug, Default, Deserialize)]
pub struct FormParams {
    pub category_id: Option<DbId>,
}
