//! Background execution.
//!
//! An [`ActionJob`] wraps exactly one `(action, context)` pair.  Queues
//! deduplicate on [`ActionJob::unique_id`]: a submission is dropped while a
//! job with the same fingerprint is still pending.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use aa_domain::config::ActionConfig;
use aa_domain::error::{Error, Result};
use aa_domain::trace::TraceEvent;
use aa_domain::{ActionContext, ActionId, ActionResult, AgentExecutionError};

use crate::action::AgentAction;
use crate::dispatcher::ActionRunner;

/// Default channel capacity of a [`LocalQueue`].
const LOCAL_QUEUE_CAPACITY: usize = 256;

/// Deterministic dedup key: `<action id>:<hex sha256 of the JSON context>`.
pub fn fingerprint(action: &ActionId, context: &ActionContext) -> Result<String> {
    let serialized = serde_json::to_vec(context)?;
    let digest = Sha256::digest(&serialized);
    Ok(format!("{action}:{}", hex::encode(digest)))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ActionJob
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct ActionJob {
    id: Uuid,
    action: Arc<dyn AgentAction>,
    context: ActionContext,
    queue: String,
    created_at: DateTime<Utc>,
}

impl ActionJob {
    /// A job on the configured default queue.
    pub fn new(
        action: Arc<dyn AgentAction>,
        context: ActionContext,
        config: &ActionConfig,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            context,
            queue: config.queue.clone(),
            created_at: Utc::now(),
        }
    }

    /// Route the job to another queue.
    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn action_id(&self) -> ActionId {
        self.action.action_id()
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn unique_id(&self) -> Result<String> {
        fingerprint(&self.action_id(), &self.context)
    }

    /// Execute the wrapped pair once.
    pub async fn run(
        &self,
        runner: &dyn ActionRunner,
    ) -> std::result::Result<ActionResult, AgentExecutionError> {
        runner.execute(self.action.as_ref(), &self.context).await
    }
}

impl std::fmt::Debug for ActionJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionJob")
            .field("id", &self.id)
            .field("action", &self.action_id())
            .field("queue", &self.queue)
            .field("created_at", &self.created_at)
            .finish()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// JobQueue
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Queued { unique_id: String },
    /// An identical job is still pending; this one was dropped.
    Duplicate { unique_id: String },
}

#[async_trait::async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(&self, job: ActionJob) -> Result<SubmitOutcome>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LocalQueue (in-process worker)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A named in-process queue with a single worker task.
///
/// Jobs run one at a time in submission order.  A fingerprint stays pending
/// from submission until its job has finished running.
pub struct LocalQueue {
    name: String,
    tx: mpsc::Sender<(String, ActionJob)>,
    pending: Arc<Mutex<HashSet<String>>>,
    worker: JoinHandle<()>,
}

impl LocalQueue {
    /// Spawn the worker.  Must be called inside a tokio runtime.
    pub fn start(name: impl Into<String>, runner: Arc<dyn ActionRunner>) -> Self {
        let name = name.into();
        let (tx, rx) = mpsc::channel(LOCAL_QUEUE_CAPACITY);
        let pending = Arc::new(Mutex::new(HashSet::new()));
        let worker = tokio::spawn(work(name.clone(), rx, runner, pending.clone()));
        tracing::info!(queue = %name, "local queue started");
        Self {
            name,
            tx,
            pending,
            worker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of submitted jobs that have not finished yet.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_pending(&self, unique_id: &str) -> bool {
        self.pending.lock().contains(unique_id)
    }

    /// Stop accepting jobs and wait for the worker to drain what is queued.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            tracing::error!(queue = %self.name, error = %e, "queue worker panicked");
        }
    }
}

#[async_trait::async_trait]
impl JobQueue for LocalQueue {
    async fn submit(&self, job: ActionJob) -> Result<SubmitOutcome> {
        if job.queue() != self.name {
            return Err(Error::Queue(format!(
                "job targets queue '{}' but was submitted to '{}'",
                job.queue(),
                self.name
            )));
        }

        let unique_id = job.unique_id()?;
        let agent = job.action_id().to_string();

        if !self.pending.lock().insert(unique_id.clone()) {
            TraceEvent::JobDeduplicated {
                agent,
                queue: self.name.clone(),
                unique_id: unique_id.clone(),
            }
            .emit();
            return Ok(SubmitOutcome::Duplicate { unique_id });
        }

        if self.tx.send((unique_id.clone(), job)).await.is_err() {
            self.pending.lock().remove(&unique_id);
            return Err(Error::Queue(format!("queue '{}' worker has stopped", self.name)));
        }

        TraceEvent::JobQueued {
            agent,
            queue: self.name.clone(),
            unique_id: unique_id.clone(),
        }
        .emit();
        Ok(SubmitOutcome::Queued { unique_id })
    }
}

async fn work(
    queue: String,
    mut rx: mpsc::Receiver<(String, ActionJob)>,
    runner: Arc<dyn ActionRunner>,
    pending: Arc<Mutex<HashSet<String>>>,
) {
    while let Some((unique_id, job)) = rx.recv().await {
        match job.run(runner.as_ref()).await {
            Ok(result) => tracing::info!(
                queue = %queue,
                job_id = %job.id(),
                action = %job.action_id(),
                output_tokens = result.output_tokens(),
                "job completed"
            ),
            Err(e) => tracing::warn!(
                queue = %queue,
                job_id = %job.id(),
                action = %e.action(),
                error = %e,
                "job failed"
            ),
        }
        pending.lock().remove(&unique_id);
    }
    tracing::info!(queue = %queue, "local queue stopped");
}
