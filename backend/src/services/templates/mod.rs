//! # Template Service Module
//!
//! Routes under `/api/templates`. Every handler that changes a template runs
//! one editor action against the [`TemplateStore`](crate::store::TemplateStore)
//! and answers with the resulting editor view (template, selection, dirty
//! flag, undo/redo availability).
//!
//! ## Sub-modules:
//! - `list`, `get`, `create`, `delete`, `duplicate`: the template collection.
//! - `save`: stamps `lastEditedAt` and clears the unsaved-changes marker.
//! - `meta`: name, description, tags and layout.
//! - `history`: undo and redo.
//! - `blocks`: add, patch, duplicate, remove, reorder, select and promote.
//! - `variables`: variables referenced by the template, with catalog labels.

mod blocks;
mod create;
mod delete;
mod duplicate;
mod get;
mod history;
mod list;
mod meta;
mod save;
mod variables;

use actix_web::web::{delete, get, patch, post, put, scope};
use actix_web::Scope;

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Configures and returns the Actix `Scope` for all template-related routes.
///
/// # Registered Routes:
///
/// * `GET /` and `POST /`: list templates (most recently edited first) and
///   create one from a `CreateTemplateRequest`.
/// * `GET /{template_id}` and `DELETE /{template_id}`.
/// * `POST /{template_id}/save`, `POST /{template_id}/duplicate`.
/// * `PUT /{template_id}/meta`: partial metadata update.
/// * `POST /{template_id}/undo`, `POST /{template_id}/redo`.
/// * `GET /{template_id}/variables`.
/// * `DELETE /{template_id}/selection`: clears the selected block.
/// * `POST /{template_id}/blocks`, `PUT /{template_id}/blocks/order`.
/// * `PATCH /{template_id}/blocks/{block_id}`, `DELETE /{template_id}/blocks/{block_id}`.
/// * `POST /{template_id}/blocks/{block_id}/duplicate`, `.../select`, `.../promote`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/{template_id}", get().to(get::process))
        .route("/{template_id}", delete().to(delete::process))
        .route("/{template_id}/save", post().to(save::process))
        .route("/{template_id}/duplicate", post().to(duplicate::process))
        .route("/{template_id}/meta", put().to(meta::process))
        .route("/{template_id}/undo", post().to(history::undo))
        .route("/{template_id}/redo", post().to(history::redo))
        .route("/{template_id}/variables", get().to(variables::process))
        .route("/{template_id}/selection", delete().to(blocks::clear_selection))
        .route("/{template_id}/blocks", post().to(blocks::add))
        .route("/{template_id}/blocks/order", put().to(blocks::reorder))
        .route("/{template_id}/blocks/{block_id}", patch().to(blocks::update_config))
        .route("/{template_id}/blocks/{block_id}", delete().to(blocks::remove))
        .route("/{template_id}/blocks/{block_id}/duplicate", post().to(blocks::duplicate))
        .route("/{template_id}/blocks/{block_id}/select", post().to(blocks::select))
        .route("/{template_id}/blocks/{block_id}/promote", post().to(blocks::promote))
}

/// Answers with the editor view of `result`, or the mapped error.
pub(crate) fn editor_response(
    result: report_common::Result<report_common::model::editor::EditorState>,
) -> actix_web::HttpResponse {
    match result {
        Ok(state) => actix_web::HttpResponse::Ok().json(state.view()),
        Err(e) => super::response::error_response(&e),
    }
}
