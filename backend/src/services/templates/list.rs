use crate::store::TemplateStore;
use actix_web::{web, HttpResponse, Responder};

/// `GET /api/templates`: every template, most recently edited first.
pub(crate) async fn process(store: web::Data<TemplateStore>) -> impl Responder {
    HttpResponse::Ok().json(store.list().await)
}
