use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::{fitment, machines};
use crate::state::AppState;

/// Machine routes mounted at `/machines`.
///
/// ```text
/// GET    /                          -> list_machines
/// POST   /                          -> create_machine
/// GET    /{id}                      -> get_machine
/// PUT    /{id}                      -> update_machine
/// DELETE /{id}                      -> delete_machine
///
/// GET    /{id}/engines              -> list_machine_engines
/// POST   /{id}/engines              -> link_machine_engine
/// DELETE /{id}/engines/{engine_id}  -> unlink_machine_engine
/// GET    /{id}/parts                -> list_machine_parts
/// POST   /{id}/parts                -> link_machine_part
/// DELETE /{id}/parts/{part_id}      -> unlink_machine_part
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(machines::list_machines).post(machines::create_machine))
        .route(
            "/{id}",
            get(machines::get_machine)
                .put(machines::update_machine)
                .delete(machines::delete_machine),
        )
        .route(
            "/{id}/engines",
            get(fitment::list_machine_engines).post(fitment::link_machine_engine),
        )
        .route(
            "/{id}/engines/{engine_id}",
            delete(fitment::unlink_machine_engine),
        )
        .route(
            "/{id}/parts",
            get(fitment::list_machine_parts).post(fitment::link_machine_part),
        )
        .route("/{id}/parts/{part_id}", delete(fitment::unlink_machine_part))
}
