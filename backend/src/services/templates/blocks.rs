//! Block-level edits. Each handler maps to one `EditorAction`, so every change
//! lands in the template's undo history.

use super::editor_response;
use crate::store::TemplateStore;
use actix_web::{web, Responder};
use report_common::model::editor::EditorAction;
use report_common::requests::{
    AddBlockRequest, PatchConfigRequest, PromoteSelectionRequest, ReorderBlocksRequest,
};

/// Appends a default block after the highest order and selects it.
pub(crate) async fn add(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
    payload: web::Json<AddBlockRequest>,
) -> impl Responder {
    let action = EditorAction::AddBlock {
        block_type: payload.block_type,
    };
    editor_response(store.apply(&template_id, action).await)
}

/// Shallow-merges the patch into the block config. Unknown keys or values of
/// the wrong type answer `400` and change nothing.
pub(crate) async fn update_config(
    store: web::Data<TemplateStore>,
    path: web::Path<(String, String)>,
    payload: web::Json<PatchConfigRequest>,
) -> impl Responder {
    let (template_id, block_id) = path.into_inner();
    let action = EditorAction::UpdateConfig {
        block_id,
        patch: payload.into_inner().patch,
    };
    editor_response(store.apply(&template_id, action).await)
}

pub(crate) async fn remove(
    store: web::Data<TemplateStore>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (template_id, block_id) = path.into_inner();
    editor_response(
        store
            .apply(&template_id, EditorAction::RemoveBlock { block_id })
            .await,
    )
}

pub(crate) async fn duplicate(
    store: web::Data<TemplateStore>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (template_id, block_id) = path.into_inner();
    editor_response(
        store
            .apply(&template_id, EditorAction::DuplicateBlock { block_id })
            .await,
    )
}

/// The body must list every block id once; orders become `0..n`.
pub(crate) async fn reorder(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
    payload: web::Json<ReorderBlocksRequest>,
) -> impl Responder {
    let action = EditorAction::Reorder {
        block_ids: payload.into_inner().block_ids,
    };
    editor_response(store.apply(&template_id, action).await)
}

pub(crate) async fn select(
    store: web::Data<TemplateStore>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (template_id, block_id) = path.into_inner();
    let action = EditorAction::SelectBlock {
        block_id: Some(block_id),
    };
    editor_response(store.apply(&template_id, action).await)
}

pub(crate) async fn clear_selection(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    editor_response(
        store
            .apply(&template_id, EditorAction::SelectBlock { block_id: None })
            .await,
    )
}

/// Wraps a selected range of one text field in a variable token.
pub(crate) async fn promote(
    store: web::Data<TemplateStore>,
    path: web::Path<(String, String)>,
    payload: web::Json<PromoteSelectionRequest>,
) -> impl Responder {
    let (template_id, block_id) = path.into_inner();
    let req = payload.into_inner();
    let action = EditorAction::PromoteSelection {
        block_id,
        field: req.field,
        index: req.index,
        start: req.start,
        end: req.end,
        name: req.name,
    };
    editor_response(store.apply(&template_id, action).await)
}
