//! Route definitions for parts, their spec values, vendor offers and fitment.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{fitment, part_vendors, parts, specs};
use crate::state::AppState;

/// Part routes mounted at `/parts`.
///
/// ```text
/// GET    /                                 -> list_parts
/// POST   /                                 -> create_part
/// POST   /search                           -> search_parts
/// POST   /export                           -> export_parts (text/csv)
/// POST   /import                           -> import_parts (text/csv body)
/// POST   /bulk-category                    -> bulk_change_category
/// GET    /{id}                             -> get_part
/// PUT    /{id}                             -> update_part
/// DELETE /{id}                             -> delete_part
/// GET    /{id}/category-preview            -> preview_category_change
/// POST   /{id}/category                    -> change_category
///
/// GET    /{id}/specs                       -> list_specs
/// PUT    /{id}/specs                       -> set_specs
/// GET    /{id}/specs/form?category_id=     -> spec_form
/// GET    /{id}/specs/{code}                -> get_spec
/// PUT    /{id}/specs/{code}                -> set_spec
/// DELETE /{id}/specs/{code}                -> clear_spec
///
/// GET    /{id}/vendors                     -> list_offers
/// POST   /{id}/vendors                     -> add_offer
/// PUT    /{id}/vendors/{vendor_id}         -> update_offer
/// DELETE /{id}/vendors/{vendor_id}         -> remove_offer
/// POST   /{id}/vendors/{vendor_id}/primary -> set_primary_vendor
///
/// GET    /{id}/machines                    -> list_part_machines
/// GET    /{id}/engines                     -> list_part_engines
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(parts::list_parts).post(parts::create_part))
        .route("/search", post(parts::search_parts))
        .route("/export", post(parts::export_parts))
        .route("/import", post(parts::import_parts))
        .route("/bulk-category", post(parts::bulk_change_category))
        .route(
            "/{id}",
            get(parts::get_part)
                .put(parts::update_part)
                .delete(parts::delete_part),
        )
        .route("/{id}/category-preview", get(parts::preview_category_change))
        .route("/{id}/category", post(parts::change_category))
        .route("/{id}/specs", get(specs::list_specs).put(specs::set_specs))
        .route("/{id}/specs/form", get(specs::spec_form))
        .route(
            "/{id}/specs/{code}",
            get(specs::get_spec)
                .put(specs::set_spec)
                .delete(specs::clear_spec),
        )
        .route(
            "/{id}/vendors",
            get(part_vendors::list_offers).post(part_vendors::add_offer),
        )
        .route(
            "/{id}/vendors/{vendor_id}",
            put(part_vendors::update_offer).delete(part_vendors::remove_offer),
        )
        .route(
            "/{id}/vendors/{vendor_id}/primary",
            post(part_vendors::set_primary_vendor),
        )
        .route("/{id}/machines", get(fitment::list_part_machines))
        .route("/{id}/engines", get(fitment::list_part_engines))
}
