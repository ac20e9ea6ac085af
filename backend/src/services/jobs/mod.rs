mod get_status;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/jobs";

/// `GET /api/jobs/{job_id}` polls a delivery job started by a publish commit.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/{job_id}", get().to(get_status::process))
}
