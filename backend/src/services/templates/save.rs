use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};

/// `POST /api/templates/{template_id}/save`: stamps `lastEditedAt` and marks
/// the current content as saved.
pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(store.save(&template_id).await)
}
