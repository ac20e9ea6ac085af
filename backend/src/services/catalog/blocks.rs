use actix_web::{HttpResponse, Responder};
use report_common::model::block::BlockType;

/// Every block type with its default config, predefined types first.
pub(crate) async fn process() -> impl Responder {
    HttpResponse::Ok().json(BlockType::catalog())
}
