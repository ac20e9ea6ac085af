//! # Publish Commit and Delivery
//!
//! `POST /api/publish/{session_id}/commit` closes a publish attempt and hands
//! the validated (template, mapping, table) to a background delivery job.
//!
//! ## Workflow:
//!
//! 1.  **Validation gate**: the session refuses to commit outside the preview
//!     step (`409`) or while any variable is unmapped (`422`, with the list of
//!     unmapped ids). Nothing is scheduled in either case.
//!
//! 2.  **Job scheduling**: `schedule_delivery_job` registers a `Pending` job
//!     and returns its id at once so the client can poll `/api/jobs/{job_id}`.
//!
//! 3.  **Background processing**: `deliver_blocking` runs under
//!     `spawn_blocking`. Rows are rendered in parallel with rayon, then written
//!     one JSON document per recipient to `{outbox}/{job_id}_{row}.json`.
//!
//! 4.  **Progress reporting**: the worker sends `DeliveryUpdate`s to a
//!     per-job listener, which turns them into percent progress for the job
//!     controller. The final `Completed`/`Failed` status is sent only after
//!     the listener has drained, so it is never overwritten by a late
//!     progress update.

use crate::config::ServerConfig;
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::services::response::error_response;
use crate::store::SessionStore;
use actix_web::{web, HttpResponse, Responder};
use log::{debug, info};
use rayon::prelude::*;
use report_common::jobs::{percent, JobStatus};
use report_common::model::publish::PublishHandoff;
use report_common::model::render::RenderedDocument;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Progress sent from the blocking worker to its listener.
#[derive(Debug)]
pub enum DeliveryUpdate {
    Job(JobStatus),
    Row { written: usize, total: usize },
}

/// One outbox file: who it is for and what they receive.
#[derive(Serialize)]
struct OutboxMessage<'a> {
    job_id: &'a str,
    session_id: &'a str,
    recipient: BTreeMap<&'a str, &'a str>,
    message: String,
    document: &'a RenderedDocument,
}

pub(crate) async fn process(
    sessions: web::Data<SessionStore>,
    jobs: web::Data<JobsState>,
    config: web::Data<ServerConfig>,
    session_id: web::Path<String>,
) -> impl Responder {
    let handoff = match sessions.update(&session_id, |s| s.commit()).await {
        Ok(handoff) => handoff,
        Err(e) => return error_response(&e),
    };
    let row_count = handoff.row_count();
    let job_id = schedule_delivery_job(&jobs, handoff, config.outbox_dir.clone()).await;
    HttpResponse::Accepted().json(json!({
        "job_id": job_id,
        "row_count": row_count,
        "message": "Publishing initiated. Delivery is handled in the background.",
    }))
}

/// Registers the job and starts it in the background. Returns the job id.
pub(crate) async fn schedule_delivery_job(
    jobs: &JobsState,
    handoff: PublishHandoff,
    outbox: PathBuf,
) -> String {
    let job_id = Uuid::new_v4().to_string();
    jobs.register(&job_id).await;
    info!(
        "delivery {} scheduled: {} rows from session {}",
        job_id,
        handoff.row_count(),
        handoff.session_id
    );

    let tx = jobs.tx.clone();
    let job_id_clone = job_id.clone();
    tokio::spawn(async move {
        let (delivery_tx, mut delivery_rx) = mpsc::channel::<DeliveryUpdate>(100);

        let listener_tx = tx.clone();
        let listener_job_id = job_id_clone.clone();
        let listener = tokio::spawn(async move {
            while let Some(update) = delivery_rx.recv().await {
                let status = match update {
                    DeliveryUpdate::Job(status) => status,
                    DeliveryUpdate::Row { written, total } => {
                        JobStatus::InProgress(percent(written, total))
                    }
                };
                let _ = listener_tx
                    .send(JobUpdate {
                        job_id: listener_job_id.clone(),
                        status,
                    })
                    .await;
            }
        });

        let job_id_for_blocking = job_id_clone.clone();
        let handle = tokio::task::spawn_blocking(move || {
            deliver_blocking(delivery_tx, &job_id_for_blocking, &handoff, &outbox)
                .map(|written| (written, outbox))
        });
        let outcome = handle.await;
        let _ = listener.await;

        let status = match outcome {
            Ok(Ok((written, outbox))) => JobStatus::Completed(format!(
                "Delivered {} documents to {}",
                written,
                outbox.display()
            )),
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(e) => JobStatus::Failed(format!("Task join error: {}", e)),
        };
        let _ = tx
            .send(JobUpdate {
                job_id: job_id_clone,
                status,
            })
            .await;
    });

    job_id
}

/// Renders every row and writes it to the outbox. Returns the number of
/// documents written.
fn deliver_blocking(
    tx: mpsc::Sender<DeliveryUpdate>,
    job_id: &str,
    handoff: &PublishHandoff,
    outbox: &Path,
) -> Result<usize, String> {
    let _ = tx.blocking_send(DeliveryUpdate::Job(JobStatus::InProgress(0)));
    fs::create_dir_all(outbox)
        .map_err(|e| format!("cannot create outbox {}: {}", outbox.display(), e))?;

    let total = handoff.row_count();
    let documents: Vec<RenderedDocument> = (0..total)
        .into_par_iter()
        .map(|row| handoff.render_row(row))
        .collect();

    let headers = handoff.table.headers();
    for (written, document) in documents.iter().enumerate() {
        let recipient = headers
            .iter()
            .enumerate()
            .map(|(col, header)| (header.as_str(), handoff.table.cell(document.row_index, col)))
            .collect();
        let message = OutboxMessage {
            job_id,
            session_id: &handoff.session_id,
            recipient,
            message: document.to_message(),
            document,
        };
        let path = outbox.join(format!("{}_{}.json", job_id, document.row_index));
        write_message(&path, &message)
            .map_err(|e| format!("Failed to write row {}: {}", document.row_index + 1, e))?;
        debug!("delivery {}: wrote {}", job_id, path.display());

        let _ = tx.blocking_send(DeliveryUpdate::Row {
            written: written + 1,
            total,
        });
    }

    Ok(total)
}

fn write_message(path: &Path, message: &OutboxMessage<'_>) -> std::io::Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, message)?;
    Ok(())
}
