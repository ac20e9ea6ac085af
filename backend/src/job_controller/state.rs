//! Shared status of background delivery jobs.
//!
//! Workers never touch the map directly: they push [`JobUpdate`]s into the
//! channel held by [`JobsState`], and [`start_job_updater`] applies them in
//! arrival order. Handlers only read.

use log::{debug, error, info};
use report_common::jobs::JobStatus;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, RwLock};

/// Clonable handle injected into the app as `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    pub jobs: Arc<RwLock<HashMap<String, JobStatus>>>,
    pub tx: mpsc::Sender<JobUpdate>,
}

#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) status: JobStatus,
}

impl JobsState {
    /// A new state and the receiver to hand to [`start_job_updater`].
    pub fn new(capacity: usize) -> (JobsState, mpsc::Receiver<JobUpdate>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = JobsState {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            tx,
        };
        (state, rx)
    }

    /// Records `job_id` as pending before any worker can report on it.
    pub async fn register(&self, job_id: &str) {
        self.jobs
            .write()
            .await
            .insert(job_id.to_string(), JobStatus::Pending);
    }

    pub async fn status(&self, job_id: &str) -> Option<JobStatus> {
        self.jobs.read().await.get(job_id).cloned()
    }
}

/// Applies updates until every sender is dropped.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        match &update.status {
            JobStatus::Completed(msg) => info!("job {} completed: {}", update.job_id, msg),
            JobStatus::Failed(msg) => error!("job {} failed: {}", update.job_id, msg),
            status => debug!("job {}: {:?}", update.job_id, status),
        }
        let mut jobs = state.jobs.write().await;
        jobs.insert(update.job_id, update.status);
    }
}
