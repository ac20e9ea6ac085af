use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};
use report_common::requests::CreateTemplateRequest;

/// `POST /api/templates`. A blank name is refused with `400`.
pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    payload: web::Json<CreateTemplateRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    editor_response(
        store
            .create(&req.name, &req.description, req.tags, req.layout_type)
            .await,
    )
}
