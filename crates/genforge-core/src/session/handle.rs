use std::sync::Arc;

use tokio::sync::{Notify, RwLock};

use crate::config::Config;
use crate::session::state::Session;
use crate::session::types::{GenerationRequest, SubmitError, TaskId, TaskRecord, Tier, ViewerTarget};

/// Cloneable, thread-safe handle to the session.
///
/// Wraps the single [`Session`] writer in a `tokio::sync::RwLock` so many
/// readers can observe state concurrently while every mutation stays
/// serialized through one logical writer — the cooperative, event-driven
/// model the session assumes.  A successful submit wakes the progress
/// driver parked on the shared [`Notify`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    wake: Arc<Notify>,
}

impl SessionHandle {
    pub fn new(config: Config) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Session::new(config))),
            wake: Arc::new(Notify::new()),
        }
    }

    // ── Dispatcher ───────────────────────────────────────────────────────────

    /// Submit a generation request; on success the progress driver is woken.
    pub async fn submit(&self, request: GenerationRequest) -> Result<TaskId, SubmitError> {
        let result = self.inner.write().await.submit(request);
        if result.is_ok() {
            self.wake.notify_one();
        }
        result
    }

    // ── Account lifecycle ────────────────────────────────────────────────────

    pub async fn sign_in(&self) {
        self.inner.write().await.sign_in();
    }

    pub async fn sign_out(&self) {
        self.inner.write().await.sign_out();
    }

    pub async fn top_up(&self, amount: u32) {
        self.inner.write().await.top_up(amount);
    }

    pub async fn upgrade(&self, tier: Tier) {
        self.inner.write().await.upgrade(tier);
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub async fn signed_in(&self) -> bool {
        self.inner.read().await.signed_in()
    }

    pub async fn credits(&self) -> u32 {
        self.inner.read().await.credits()
    }

    pub async fn tier(&self) -> Tier {
        self.inner.read().await.tier()
    }

    pub async fn processing_count(&self) -> usize {
        self.inner.read().await.queue().processing_count()
    }

    /// Snapshot of the queue, newest first.
    pub async fn tasks(&self) -> Vec<TaskRecord> {
        self.inner.read().await.queue().tasks().to_vec()
    }

    pub async fn find_task(&self, id: &str) -> Option<TaskRecord> {
        self.inner.read().await.queue().find(id).cloned()
    }

    pub async fn open_task(&self, id: &str) -> Option<ViewerTarget> {
        self.inner.read().await.open_task(id)
    }

    // ── Driver integration ───────────────────────────────────────────────────

    /// Apply one tick of progress; returns the number of records still
    /// processing afterwards.
    pub(crate) async fn tick(&self) -> usize {
        let mut session = self.inner.write().await;
        session.tick();
        session.queue().processing_count()
    }

    /// Resolve once a submit has signalled new work.
    pub(crate) async fn work_available(&self) {
        self.wake.notified().await;
    }
}
