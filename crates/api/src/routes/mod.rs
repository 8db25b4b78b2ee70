pub mod collection;
pub mod favorite_actors;
pub mod history;

use actix_web::web;

/// Mount all `/api/v1` routes
///
/// Favorite actors and history are registered first so their paths are never
/// taken for a collection kind.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(favorite_actors::configure)
            .configure(history::configure)
            .configure(collection::configure),
    );
}
