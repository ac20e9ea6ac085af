//! # Template Retrieval Service
//!
//! `GET /api/templates/{template_id}` returns the editor view of one template:
//! the template itself, the selected block, whether it has unsaved changes
//! and whether undo/redo are available. Unknown ids answer `404`.

use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};

pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(store.get(&template_id).await)
}
