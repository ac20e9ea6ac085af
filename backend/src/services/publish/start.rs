use crate::services::response::error_response;
use crate::store::{SessionStore, TemplateStore};
use actix_web::{web, HttpResponse, Responder};
use log::info;
use report_common::model::publish::PublishSession;
use report_common::requests::StartPublishRequest;

/// Opens a session on the template as it is right now. Later edits to the
/// template do not affect it.
pub(crate) async fn process(
    templates: web::Data<TemplateStore>,
    sessions: web::Data<SessionStore>,
    payload: web::Json<StartPublishRequest>,
) -> impl Responder {
    let state = match templates.get(&payload.template_id).await {
        Ok(state) => state,
        Err(e) => return error_response(&e),
    };
    let session = PublishSession::new(state.template);
    info!(
        "publish {} opened for template {} ({} variables)",
        session.id(),
        payload.template_id,
        session.variables().len()
    );
    HttpResponse::Created().json(sessions.insert(session).await)
}
