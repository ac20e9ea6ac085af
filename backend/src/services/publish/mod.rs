//! # Publish Service Module
//!
//! Routes under `/api/publish` drive one publish attempt through
//! `upload -> mapping -> preview -> success`:
//!
//! 1. `POST /` with a `template_id` snapshots the template and opens a session.
//! 2. `POST /{session_id}/upload` takes a multipart `file` (`.csv`), parses it
//!    and auto-maps template variables to its headers.
//! 3. `POST /{session_id}/next` and `/back` move between steps.
//! 4. `PUT /{session_id}/mapping` overrides one variable's column.
//! 5. `POST /{session_id}/commit` refuses with `422` and the unmapped ids until
//!    the mapping is total, then schedules a delivery job and returns its id.
//!
//! `GET /{session_id}` returns the session view, including the first row's
//! rendered preview once in the preview step. `DELETE /{session_id}` closes
//! the session and frees its table.

mod close;
mod commit;
mod get;
mod mapping;
mod navigate;
mod start;
mod upload;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/publish";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(start::process))
        .route("/{session_id}", get().to(get::process))
        .route("/{session_id}", delete().to(close::process))
        .route("/{session_id}/upload", post().to(upload::process))
        .route("/{session_id}/mapping", put().to(mapping::process))
        .route("/{session_id}/next", post().to(navigate::next))
        .route("/{session_id}/back", post().to(navigate::back))
        .route("/{session_id}/commit", post().to(commit::process))
}

/// Answers with the session view, or the mapped error.
pub(crate) async fn session_response(
    sessions: &crate::store::SessionStore,
    session_id: &str,
    result: report_common::Result<()>,
) -> actix_web::HttpResponse {
    let view = match result {
        Ok(()) => sessions.view(session_id).await,
        Err(e) => Err(e),
    };
    match view {
        Ok(view) => actix_web::HttpResponse::Ok().json(view),
        Err(e) => super::response::error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::job_controller::state::JobsState;
    use crate::services;
    use crate::store::{SessionStore, TemplateStore, VariableCatalog};
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::{test, web, App};
    use report_common::model::block::BlockType;
    use report_common::model::editor::EditorAction;
    use serde_json::{json, Value};

    const BOUNDARY: &str = "report-boundary";

    fn multipart(file_name: &str, content: &str) -> (String, String) {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = file_name,
            c = content
        );
        (format!("multipart/form-data; boundary={}", BOUNDARY), body)
    }

    async fn template_with_tokens(store: &TemplateStore) -> String {
        let id = store.create("Monthly", "", vec![], None).await.unwrap().template.id;
        let state = store
            .apply(&id, EditorAction::AddBlock { block_type: BlockType::CustomText })
            .await
            .unwrap();
        let block_id = state.selected_block_id.unwrap();
        let patch = json!({ "heading": "Hello {{name}}", "bodyText": "BMI {{bmi}}" });
        store
            .apply(
                &id,
                EditorAction::UpdateConfig {
                    block_id,
                    patch: patch.as_object().unwrap().clone(),
                },
            )
            .await
            .unwrap();
        id
    }

    #[actix_web::test]
    async fn upload_map_preview_and_commit() {
        let outbox = tempfile::tempdir().unwrap();
        let templates = TemplateStore::default();
        let template_id = template_with_tokens(&templates).await;
        let (jobs, _rx) = JobsState::new(100);
        let config = ServerConfig {
            outbox_dir: outbox.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(templates.clone()))
                .app_data(web::Data::new(SessionStore::default()))
                .app_data(web::Data::new(VariableCatalog::default()))
                .app_data(web::Data::new(jobs))
                .app_data(web::Data::new(config))
                .configure(services::configure),
        )
        .await;

        let session: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/publish")
                .set_json(json!({ "template_id": template_id }))
                .to_request(),
        )
        .await;
        let sid = session["id"].as_str().unwrap().to_string();
        assert_eq!(session["step"], "upload");
        assert_eq!(session["variables"], json!(["name", "bmi"]));

        let (content_type, body) = multipart("notes.txt", "name\nAna");
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/publish/{}/upload", sid))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);

        let (content_type, body) =
            multipart("patients.csv", "patient_id,Name,col_x\n1,Ana,22.5\n2,Luis,27");
        let uploaded: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/publish/{}/upload", sid))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(uploaded["row_count"], 2);
        assert_eq!(uploaded["mapping"]["name"], "Name");
        assert_eq!(uploaded["unmapped"], json!(["bmi"]));

        let post = |path: &str| {
            test::TestRequest::post()
                .uri(&format!("/api/publish/{}/{}", sid, path))
                .to_request()
        };
        test::call_service(&app, post("next")).await;
        test::call_service(&app, post("next")).await;

        let refused = test::call_service(&app, post("commit")).await;
        assert_eq!(refused.status(), 422);
        let refused: Value = test::read_body_json(refused).await;
        assert_eq!(refused["unmapped"], json!(["bmi"]));
        assert_eq!(refused["error"], "Please map all variables: {{bmi}}");

        let wrong_step = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/publish/{}/mapping", sid))
                .set_json(json!({ "variable": "bmi", "column": "col_x" }))
                .to_request(),
        )
        .await;
        assert_eq!(wrong_step.status(), 409);

        test::call_service(&app, post("back")).await;
        let mapped: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/publish/{}/mapping", sid))
                .set_json(json!({ "variable": "bmi", "column": "col_x" }))
                .to_request(),
        )
        .await;
        assert_eq!(mapped["unmapped"], json!([]));

        let preview: Value = test::call_and_read_body_json(&app, post("next")).await;
        assert_eq!(preview["step"], "preview");
        assert_eq!(
            preview["preview"]["blocks"][0]["config"]["heading"],
            "Hello Ana"
        );

        let committed = test::call_service(&app, post("commit")).await;
        assert_eq!(committed.status(), 202);
        let committed: Value = test::read_body_json(committed).await;
        assert_eq!(committed["row_count"], 2);
        assert!(committed["job_id"].is_string());

        let done: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/publish/{}", sid))
                .to_request(),
        )
        .await;
        assert_eq!(done["step"], "success");

        let closed = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/publish/{}", sid))
                .to_request(),
        )
        .await;
        assert_eq!(closed.status(), 204);
        let gone = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/publish/{}", sid))
                .to_request(),
        )
        .await;
        assert_eq!(gone.status(), 404);
    }

    #[actix_web::test]
    async fn oversized_upload_is_refused() {
        let templates = TemplateStore::default();
        let template_id = template_with_tokens(&templates).await;
        let sessions = SessionStore::default();
        let config = ServerConfig {
            upload_limit: 16,
            ..ServerConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(templates))
                .app_data(web::Data::new(sessions.clone()))
                .app_data(web::Data::new(config))
                .configure(services::configure),
        )
        .await;

        let session: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::post()
                .uri("/api/publish")
                .set_json(json!({ "template_id": template_id }))
                .to_request(),
        )
        .await;
        let sid = session["id"].as_str().unwrap().to_string();

        let (content_type, body) = multipart("big.csv", "name,bmi
Anastasia,22.5
Luis,27");
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/publish/{}/upload", sid))
                .insert_header((CONTENT_TYPE, content_type))
                .set_payload(body)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("upload limit"));
        assert_eq!(sessions.view(&sid).await.unwrap().row_count, 0);
    }

    #[actix_web::test]
    async fn unknown_template_or_session_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TemplateStore::default()))
                .app_data(web::Data::new(SessionStore::default()))
                .configure(services::configure),
        )
        .await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/publish")
                .set_json(json!({ "template_id": "missing" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 404);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/publish/missing").to_request(),
        )
        .await;
        assert_eq!(resp.status(), 404);
    }
}
