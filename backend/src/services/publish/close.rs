use crate::services::response::error_response;
use crate::store::SessionStore;
use actix_web::{web, HttpResponse, Responder};

/// `DELETE /api/publish/{session_id}`: the operator closed the publish
/// dialog. Running delivery jobs keep their own copy of the data.
pub(crate) async fn process(
    sessions: web::Data<SessionStore>,
    session_id: web::Path<String>,
) -> impl Responder {
    match sessions.remove(&session_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}
