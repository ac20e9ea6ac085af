use crate::services::response::error_response;
use crate::store::SessionStore;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(
    sessions: web::Data<SessionStore>,
    session_id: web::Path<String>,
) -> impl Responder {
    match sessions.view(&session_id).await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}
