//! Turns model errors into HTTP responses.

use actix_web::HttpResponse;
use log::warn;
use report_common::ReportError;
use serde_json::json;

pub(crate) fn error_response(err: &ReportError) -> HttpResponse {
    let body = match err {
        ReportError::UnmappedVariables(ids) => json!({ "error": err.to_string(), "unmapped": ids }),
        _ => json!({ "error": err.to_string() }),
    };
    match err {
        ReportError::TemplateNotFound(_)
        | ReportError::BlockNotFound(_)
        | ReportError::SessionNotFound(_) => HttpResponse::NotFound().json(body),
        ReportError::UnmappedVariables(_) => HttpResponse::UnprocessableEntity().json(body),
        ReportError::InvalidTransition { .. } | ReportError::DuplicateVariable(_) => {
            HttpResponse::Conflict().json(body)
        }
        ReportError::Io(_) | ReportError::Json(_) => {
            warn!("internal error: {}", err);
            HttpResponse::InternalServerError().json(body)
        }
        ReportError::Parse(_)
        | ReportError::Csv(_)
        | ReportError::MissingField(_)
        | ReportError::InvalidConfig { .. }
        | ReportError::InvalidReorder(_)
        | ReportError::UnknownColumn(_)
        | ReportError::UnknownVariable(_) => HttpResponse::BadRequest().json(body),
    }
}
