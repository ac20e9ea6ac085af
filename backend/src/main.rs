mod config;
mod job_controller;
mod services;
mod store;

use crate::config::ServerConfig;
use crate::job_controller::state::JobsState;
use crate::store::{SessionStore, TemplateStore, VariableCatalog};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let dotenv = dotenvy::dotenv();
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!("ignoring .env: {}", e);
        }
    }

    let config =
        ServerConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let (host, port) = config.bind_addr();

    let (jobs_state, rx) = JobsState::new(100);
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let templates = TemplateStore::default();
    let sessions = SessionStore::default();
    let catalog = VariableCatalog::default();
    let json_limit = config.json_limit;
    let config = web::Data::new(config);

    info!(
        "Server running at http://{}:{} (outbox {}, {} tables)",
        host,
        port,
        config.outbox_dir.display(),
        config.table_dialect
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(templates.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .app_data(web::Data::new(catalog.clone()))
            .app_data(config.clone())
            .configure(services::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
