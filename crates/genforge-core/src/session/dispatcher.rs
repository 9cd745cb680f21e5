//! The single entry point for a generation request.
//!
//! `Session::submit` coordinates validation, admission, and spending in a
//! fixed order: every check runs before the debit, and the debit before the
//! enqueue, so each failure path leaves the session exactly as it found it —
//! no partial debit, no orphaned task.

use tracing::info;

use crate::session::admission;
use crate::session::state::Session;
use crate::session::types::{
    GenerationRequest, LedgerError, SubmitError, TaskId, TaskKind, TaskRecord,
};

/// Display label for image-to-3D tasks (text-to-image tasks take their title
/// from the prompt instead).
const MODEL_TASK_TITLE: &str = "3D Model";

/// Character cap when deriving a task title from prompt text.
const PROMPT_TITLE_MAX_CHARS: usize = 15;

/// Thumbnails used when the request carries no reference image.
const MODEL_PLACEHOLDER_THUMBNAIL: &str = "placeholders/model.png";
const IMAGE_PLACEHOLDER_THUMBNAIL: &str = "placeholders/image.png";

impl Session {
    /// Validate a generation request and, on success, debit its cost and
    /// enqueue a fresh `Processing` record, returning the record's id.
    ///
    /// Failure order: sign-in gate, input validity, admission cap, ledger
    /// balance.  No state is mutated on any failure path.
    pub fn submit(&mut self, request: GenerationRequest) -> Result<TaskId, SubmitError> {
        if !self.signed_in {
            return Err(SubmitError::NotSignedIn);
        }

        match request.kind {
            TaskKind::Model if request.reference_image.is_none() => {
                return Err(SubmitError::MissingReference);
            }
            TaskKind::Image if is_blank(request.prompt.as_deref()) => {
                return Err(SubmitError::MissingPrompt);
            }
            _ => {}
        }

        admission::admit(self.tier, self.queue.processing_count())?;

        let cost = match request.kind {
            TaskKind::Model => self.config.model_cost,
            TaskKind::Image => self.config.image_cost,
        };
        if let Err(LedgerError::InsufficientFunds {
            required,
            available,
        }) = self.ledger.debit(cost)
        {
            return Err(SubmitError::InsufficientCredits {
                required,
                available,
            });
        }

        let title = derive_title(request.kind, request.prompt.as_deref());
        let thumbnail = request.reference_image.unwrap_or_else(|| {
            match request.kind {
                TaskKind::Model => MODEL_PLACEHOLDER_THUMBNAIL,
                TaskKind::Image => IMAGE_PLACEHOLDER_THUMBNAIL,
            }
            .to_owned()
        });

        let record = TaskRecord::new(request.kind, title, thumbnail);
        let id = record.id.clone();
        info!(
            task_id = %id,
            kind = %request.kind,
            cost,
            balance = self.ledger.balance(),
            "generation task admitted"
        );
        self.queue.enqueue(record);
        Ok(id)
    }
}

fn is_blank(prompt: Option<&str>) -> bool {
    prompt.is_none_or(|p| p.trim().is_empty())
}

/// Short display label for a new record: fixed for image-to-3D, derived from
/// the prompt (char-boundary-safe truncation) for text-to-image.
pub(crate) fn derive_title(kind: TaskKind, prompt: Option<&str>) -> String {
    match kind {
        TaskKind::Model => MODEL_TASK_TITLE.to_owned(),
        TaskKind::Image => prompt
            .unwrap_or_default()
            .trim()
            .chars()
            .take(PROMPT_TITLE_MAX_CHARS)
            .collect(),
    }
}
