pub mod categories;
pub mod engines;
pub mod health;
pub mod machines;
pub mod parts;
pub mod vendors;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /categories            category schema administration
/// /parts                 parts, spec values, filtering, CSV, vendor offers, fitment
/// /vendors               vendor CRUD
/// /machines              machine CRUD, fitted engines and parts
/// /engines               engine CRUD, fitted parts, supersession
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/parts", parts::router())
        .nest("/vendors", vendors::router())
        .nest("/machines", machines::router())
        .nest("/engines", engines::router())
}
