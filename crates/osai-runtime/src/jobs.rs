//! Job registry: job id → cancellation token.
//!
//! The map lock is only ever held across a map operation. Tokens are cloned
//! out before they are cancelled so no waker runs under the lock.

use std::collections::HashMap;
use std::sync::Arc;

use osai_core::JobId;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Concurrency-safe registry of in-flight jobs.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, CancellationToken>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `token` under `id`. A colliding id is overwritten.
    pub fn register(&self, id: JobId, token: CancellationToken) {
        debug!(job_id = %id, "job registered");
        let _ = self.jobs.lock().insert(id, token);
    }

    /// Flag the job's token. Returns whether a live job was found.
    pub fn cancel(&self, id: &str) -> bool {
        let token = self.jobs.lock().get(id).cloned();
        match token {
            Some(token) => {
                token.cancel();
                debug!(job_id = id, "job cancelled");
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `id`, if any.
    pub fn remove(&self, id: &str) {
        if self.jobs.lock().remove(id).is_some() {
            debug!(job_id = id, "job removed");
        }
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.jobs.lock().contains_key(id)
    }

    /// Number of live jobs.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Whether no job is live.
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Cancel every live job. Returns how many were flagged.
    pub fn cancel_all(&self) -> usize {
        let tokens: Vec<CancellationToken> = self.jobs.lock().values().cloned().collect();
        for token in &tokens {
            token.cancel();
        }
        tokens.len()
    }
}

/// Removes a job from its registry when dropped.
#[must_use = "the job is removed as soon as the guard is dropped"]
pub struct JobGuard {
    registry: Arc<JobRegistry>,
    id: JobId,
}

impl JobGuard {
    /// Guard an already-registered job.
    pub fn new(registry: Arc<JobRegistry>, id: JobId) -> Self {
        Self { registry, id }
    }

    /// The guarded job id.
    pub fn id(&self) -> &JobId {
        &self.id
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
