use crate::services::response::error_response;
use crate::store::TemplateStore;
use actix_web::{web, HttpResponse, Responder};

pub(crate) async fn process(
    store: web::Data<TemplateStore>,
    template_id: web::Path<String>,
) -> impl Responder {
    match store.delete(&template_id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}
