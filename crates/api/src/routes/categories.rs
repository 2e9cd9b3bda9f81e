//! Route definitions for categories and their attribute schema.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::categories;
use crate::state::AppState;

/// Category routes mounted at `/categories`.
///
/// ```text
/// GET    /                                                -> list_categories
/// POST   /                                                -> create_category
/// GET    /{id}                                            -> get_category
/// PUT    /{id}                                            -> update_category
/// DELETE /{id}?cascade=                                   -> delete_category
/// GET    /{id}/schema                                     -> get_schema
/// GET    /{id}/attributes                                 -> list_attributes
/// POST   /{id}/attributes                                 -> create_attribute
/// PUT    /{id}/attributes/{attr_id}                       -> update_attribute
/// DELETE /{id}/attributes/{attr_id}?cascade=              -> delete_attribute
/// GET    /{id}/attributes/{attr_id}/choices               -> list_choices
/// POST   /{id}/attributes/{attr_id}/choices               -> create_choice
/// PUT    /{id}/attributes/{attr_id}/choices/{choice_id}   -> update_choice
/// DELETE /{id}/attributes/{attr_id}/choices/{choice_id}   -> delete_choice
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/{id}/schema", get(categories::get_schema))
        .route(
            "/{id}/attributes",
            get(categories::list_attributes).post(categories::create_attribute),
        )
        .route(
            "/{id}/attributes/{attr_id}",
            put(categories::update_attribute).delete(categories::delete_attribute),
        )
        .route(
            "/{id}/attributes/{attr_id}/choices",
            get(categories::list_choices).post(categories::create_choice),
        )
        .route(
            "/{id}/attributes/{attr_id}/choices/{choice_id}",
            put(categories::update_choice).delete(categories::delete_choice),
        )
}
