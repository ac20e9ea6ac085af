use super::session_response;
use crate::store::SessionStore;
use actix_web::{web, Responder};
use report_common::requests::MappingRequest;

/// Manual override. The column must be one of the uploaded headers; an empty
/// column clears the variable.
pub(crate) async fn process(
    sessions: web::Data<SessionStore>,
    session_id: web::Path<String>,
    payload: web::Json<MappingRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let result = sessions
        .update(&session_id, |s| s.set_mapping(&req.variable, &req.column))
        .await;
    session_response(&sessions, &session_id, result).await
}
