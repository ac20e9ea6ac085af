use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};
use report_common::model::editor::EditorAction;

/// Undo with nothing to undo answers the unchanged view.
pub(crate) async fn undo(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(store.apply(&template_id, EditorAction::Undo).await)
}

pub(crate) async fn redo(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(store.apply(&template_id, EditorAction::Redo).await)
}
