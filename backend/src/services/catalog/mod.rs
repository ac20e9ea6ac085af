//! Read-mostly catalog routes under `/api/catalog`: the block types an editor
//! can add and the variables it can insert.

mod blocks;
mod variables;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/catalog";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/blocks", get().to(blocks::process))
        .route("/variables", get().to(variables::suggest))
        .route("/variables", post().to(variables::register))
        .route("/variables/sanitize", post().to(variables::sanitize))
}
