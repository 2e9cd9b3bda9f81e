use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{engines, fitment};
use crate::state::AppState;

/// Engine routes mounted at `/engines`.
///
/// ```text
/// GET    /                                       -> list_engines
/// POST   /                                       -> create_engine
/// GET    /{id}                                   -> get_engine
/// PUT    /{id}                                   -> update_engine
/// DELETE /{id}                                   -> delete_engine
///
/// GET    /{id}/machines                          -> list_engine_machines
/// GET    /{id}/parts                             -> list_engine_parts
/// POST   /{id}/parts                             -> link_engine_part
/// DELETE /{id}/parts/{part_id}                   -> unlink_engine_part
/// GET    /{id}/supersessions                     -> list_supersessions
/// POST   /{id}/supersessions                     -> add_supersession
/// DELETE /{id}/supersessions/{supersession_id}   -> remove_supersession
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(engines::list_engines).post(engines::create_engine))
        .route(
            "/{id}",
            get(engines::get_engine)
                .put(engines::update_engine)
                .delete(engines::delete_engine),
        )
        .route("/{id}/machines", get(fitment::list_engine_machines))
        .route(
            "/{id}/parts",
            get(fitment::list_engine_parts).post(fitment::link_engine_part),
        )
        .route("/{id}/parts/{part_id}", delete(fitment::unlink_engine_part))
        .route(
            "/{id}/supersessions",
            get(fitment::list_supersessions).post(fitment::add_supersession),
        )
        .route(
            "/{id}/supersessions/{supersession_id}",
            delete(fitment::remove_supersession),
        )
}
