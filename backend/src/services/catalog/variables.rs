use crate::services::response::error_response;
use crate::store::VariableCatalog;
use actix_web::{web, HttpResponse, Responder};
use report_common::model::sanitize::sanitize_variable_name;
use report_common::model::variable::format_variable;
use report_common::requests::{RegisterVariableRequest, SanitizeRequest, VariableQuery};
use serde_json::json;

/// `GET /api/catalog/variables?q=`: autocomplete, prefix matches first.
pub(crate) async fn suggest(
    catalog: web::Data<VariableCatalog>,
    query: web::Query<VariableQuery>,
) -> impl Responder {
    HttpResponse::Ok().json(catalog.suggest(&query.q).await)
}

/// `POST /api/catalog/variables`: mints a variable from a label.
pub(crate) async fn register(
    catalog: web::Data<VariableCatalog>,
    payload: web::Json<RegisterVariableRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    match catalog.register(&req.label, req.prefix.as_deref()).await {
        Ok(variable) => HttpResponse::Created().json(variable),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/catalog/variables/sanitize`: the id a label would become,
/// without registering it.
pub(crate) async fn sanitize(payload: web::Json<SanitizeRequest>) -> impl Responder {
    let id = sanitize_variable_name(&payload.raw, payload.prefix.as_deref());
    HttpResponse::Ok().json(json!({ "placeholder": format_variable(&id), "id": id }))
}

#[cfg(test)]
mod tests {
    use crate::services;
    use crate::store::VariableCatalog;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn catalog_routes() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(VariableCatalog::default()))
                .service(services::catalog::configure_routes()),
        )
        .await;

        let blocks: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/catalog/blocks").to_request(),
        )
        .await;
        assert_eq!(blocks.as_array().unwrap().len(), 11);

        let hits: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri("/api/catalog/variables?q=weight")
                .to_request(),
        )
        .await;
        assert_eq!(hits[0]["id"], "current_weight");

        let sanitized: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/catalog/variables/sanitize")
                .set_json(json!({ "raw": "basic_info_Name", "prefix": "basic_info" }))
                .to_request(),
        )
        .await;
        assert_eq!(sanitized["id"], "basic_info_name");
        assert_eq!(sanitized["placeholder"], "{{basic_info_name}}");

        let register = || {
            test::TestRequest::post()
                .uri("/api/catalog/variables")
                .set_json(json!({ "label": "Shoe size" }))
                .to_request()
        };
        assert_eq!(test::call_service(&app, register()).await.status(), 201);
        assert_eq!(test::call_service(&app, register()).await.status(), 409);
    }
}
