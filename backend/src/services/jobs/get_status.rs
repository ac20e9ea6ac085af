use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(json!({ "error": format!("Job not found: {}", job_id) })),
    }
}

#[cfg(test)]
mod tests {
    use crate::job_controller::state::JobsState;
    use crate::services;
    use actix_web::{test, web, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn reports_pending_and_unknown_jobs() {
        let (state, _rx) = JobsState::new(4);
        state.register("job-7").await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(services::jobs::configure_routes()),
        )
        .await;

        let status: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/jobs/job-7").to_request(),
        )
        .await;
        assert_eq!(status, "Pending");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/jobs/nope").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 404);
    }
}
