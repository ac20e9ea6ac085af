use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};

/// `POST /api/templates/{template_id}/duplicate`: a copy named `"<name> (Copy)"`
/// with fresh template and block ids.
pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(store.duplicate(&template_id).await)
}
