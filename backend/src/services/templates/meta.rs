use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};
use report_common::model::editor::EditorAction;
use report_common::requests::UpdateMetaRequest;

/// `PUT /api/templates/{template_id}/meta`. Only the fields present in the
/// body change; a blank name refuses the whole update.
pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
    payload: web::Json<UpdateMetaRequest>,
) -> impl Responder {
    editor_response(store.apply_all(&template_id, meta_actions(payload.into_inner())).await)
}

fn meta_actions(req: UpdateMetaRequest) -> Vec<EditorAction> {
    let mut actions = Vec::new();
    if let Some(name) = req.name {
        actions.push(EditorAction::Rename { name });
    }
    if let Some(description) = req.description {
        actions.push(EditorAction::SetDescription { description });
    }
    if let Some(tags) = req.tags {
        actions.push(EditorAction::SetTags { tags });
    }
    if let Some(layout_type) = req.layout_type {
        actions.push(EditorAction::SetLayout { layout_type });
    }
    actions
}
