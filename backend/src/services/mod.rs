pub mod catalog;
pub mod jobs;
pub mod publish;
pub mod templates;

mod response;

use actix_web::web;

/// Registers every API scope. App data (stores, job state, config) is added
/// by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(catalog::configure_routes())
        .service(templates::configure_routes())
        .service(publish::configure_routes())
        .service(jobs::configure_routes());
}
