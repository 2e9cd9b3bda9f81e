use axum::routing::get;
use axum::Router;

use crate::handlers::vendors;
use crate::state::AppState;

/// Vendor routes mounted at `/vendors`.
///
/// ```text
/// GET    /        -> list_vendors
/// POST   /        -> create_vendor
/// GET    /{id}    -> get_vendor
/// PUT    /{id}    -> update_vendor
/// DELETE /{id}    -> delete_vendor
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::list_vendors).post(vendors::create_vendor))
        .route(
            "/{id}",
            get(vendors::get_vendor)
                .put(vendors::update_vendor)
                .delete(vendors::delete_vendor),
        )
}
