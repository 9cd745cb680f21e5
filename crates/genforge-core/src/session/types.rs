use chrono::Local;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a submitted generation task.
pub type TaskId = String;

/// What a generation request produces, and which downstream viewer a
/// completed record opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    /// Image-to-3D: a reference image becomes a 3D model.
    Model,
    /// Text-to-image.
    Image,
}

/// Lifecycle state of a task.
///
/// The transition is one-directional: `Processing` → `Completed`.  A record
/// never leaves `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Processing,
    Completed,
}

/// Subscription level of the current session.
///
/// Upgrades replace the value outright; the per-tier constants live in the
/// limits table next to the admission gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    Free,
    Pro,
    Studio,
}

/// One generation request's tracked lifecycle entry.
///
/// `id`, `kind`, `thumbnail`, `title`, and `created_at` are fixed at
/// creation.  `progress` is monotonically non-decreasing while
/// `Processing` and pinned to exactly `100.0` once `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub progress: f32,
    pub thumbnail: String,
    pub title: String,
    /// Display-formatted local time of creation, e.g. `10:45 AM`.
    pub created_at: String,
}

impl TaskRecord {
    /// Build a fresh `Processing` record with a random id and the current
    /// local time as its display timestamp.
    pub fn new(kind: TaskKind, title: impl Into<String>, thumbnail: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            status: TaskStatus::Processing,
            progress: 0.0,
            thumbnail: thumbnail.into(),
            title: title.into(),
            created_at: Local::now().format("%I:%M %p").to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// Advance progress by `increment` percentage points.
    ///
    /// No-op on completed records.  Crossing 100 clamps progress to exactly
    /// `100.0` and flips the status, so `progress == 100.0` and
    /// `status == Completed` always agree.
    pub(crate) fn advance(&mut self, increment: f32) {
        if self.is_completed() {
            return;
        }
        self.progress = (self.progress + increment).min(100.0);
        if self.progress >= 100.0 {
            self.progress = 100.0;
            self.status = TaskStatus::Completed;
        }
    }
}

/// Input for one generation request, as collected by the create screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub kind: TaskKind,
    pub prompt: Option<String>,
    pub reference_image: Option<String>,
}

impl GenerationRequest {
    /// Image-to-3D request from a reference image.
    pub fn model(reference_image: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Model,
            prompt: None,
            reference_image: Some(reference_image.into()),
        }
    }

    /// Text-to-image request from a prompt.
    pub fn image(prompt: impl Into<String>) -> Self {
        Self {
            kind: TaskKind::Image,
            prompt: Some(prompt.into()),
            reference_image: None,
        }
    }

    /// Image-to-3D request with no source image attached.
    ///
    /// Rejected by the dispatcher; exists so callers can represent the
    /// empty upload slot the create screen starts with.
    pub fn model_without_reference() -> Self {
        Self {
            kind: TaskKind::Model,
            prompt: None,
            reference_image: None,
        }
    }

    /// Attach an optional guidance image (used by text-to-image requests).
    pub fn with_reference(mut self, reference_image: impl Into<String>) -> Self {
        self.reference_image = Some(reference_image.into());
        self
    }
}

/// Handoff payload for the (out-of-scope) viewer component.
///
/// The viewer renders; it has no write access to session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "viewer")]
pub enum ViewerTarget {
    Model {
        id: TaskId,
        title: String,
        thumbnail: String,
    },
    Image {
        url: String,
        title: String,
    },
}

/// Refusals produced by the credit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The balance cannot cover the requested debit; nothing was spent.
    #[error("insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u32, available: u32 },
}

/// All expected, user-facing reasons a submission can be rejected.
///
/// Every variant is detected before any state mutation, so a failed
/// `submit` leaves the queue and the ledger untouched.  Each variant
/// reaches the UI as a distinct signal (shake an input, open the paywall,
/// open the sign-in sheet), never as a generic failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The session is signed out; generation is gated on sign-in.
    #[error("not signed in")]
    NotSignedIn,

    /// Image-to-3D request submitted without a source image.
    #[error("image-to-3d request has no reference image")]
    MissingReference,

    /// Text-to-image request submitted with an empty prompt.
    #[error("image request has an empty prompt")]
    MissingPrompt,

    /// The tier's cap on concurrently processing tasks is already reached.
    #[error("queue full: {tier} tier allows {max_processing} concurrent tasks")]
    QueueFull { tier: Tier, max_processing: usize },

    /// The ledger balance is below the request's cost.
    #[error("insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: u32, available: u32 },
}
