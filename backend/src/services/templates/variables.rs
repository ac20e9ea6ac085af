use crate::services::response::error_response;
use crate::store::{TemplateStore, VariableCatalog};
use actix_web::{web, HttpResponse, Responder};
use report_common::model::publish::extract_variables;
use report_common::model::variable::format_variable;
use serde::Serialize;

/// A variable used by a template. `label` is absent for ids the catalog does
/// not know; those are still valid tokens.
#[derive(Serialize)]
struct TemplateVariable {
    id: String,
    placeholder: String,
    label: Option<String>,
}

/// `GET /api/templates/{template_id}/variables`, in order of first use.
pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    catalog: web::Data<VariableCatalog>,
    template_id: web::Path<String>,
) -> impl Responder {
    let state = match store.get(&template_id).await {
        Ok(state) => state,
        Err(e) => return error_response(&e),
    };
    let mut variables = Vec::new();
    for id in extract_variables(&state.template) {
        variables.push(TemplateVariable {
            placeholder: format_variable(&id),
            label: catalog.label_for(&id).await,
            id,
        });
    }
    HttpResponse::Ok().json(variables)
}
