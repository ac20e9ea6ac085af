use super::session_response;
use crate::store::SessionStore;
use actix_web::{web, Responder};

pub(crate) async fn next(
    sessions: web::Data<SessionStore>,
    session_id: web::Path<String>,
) -> impl Responder {
    let result = sessions.update(&session_id, |s| s.advance().map(|_| ())).await;
    session_response(&sessions, &session_id, result).await
}

pub(crate) async fn back(
    sessions: web::Data<SessionStore>,
    session_id: web::Path<String>,
) -> impl Responder {
    let result = sessions.update(&session_id, |s| s.back().map(|_| ())).await;
    session_response(&sessions, &session_id, result).await
}
