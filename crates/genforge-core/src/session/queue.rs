use tracing::debug;

use crate::session::types::{TaskRecord, TaskStatus};

/// Ordered collection of task records, newest first.
///
/// Pure bookkeeping: insertion and ticking cannot fail.  The tick cadence
/// is owned by the progress driver; this type only applies one tick's worth
/// of progress when asked.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    records: Vec<TaskRecord>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front of the ordered sequence.  Always succeeds.
    pub fn enqueue(&mut self, record: TaskRecord) {
        self.records.insert(0, record);
    }

    /// Advance every `Processing` record's progress by `increment`
    /// percentage points, completing records that cross 100.
    ///
    /// Produces no separate event; callers observe the mutated queue.
    pub fn tick(&mut self, increment: f32) {
        for record in &mut self.records {
            if record.is_completed() {
                continue;
            }
            record.advance(increment);
            if record.is_completed() {
                debug!(task_id = %record.id, title = %record.title, "task completed");
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn processing_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.status == TaskStatus::Processing)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Snapshot accessor, newest first.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.records
    }

    /// Drop every record (session boundary).
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
