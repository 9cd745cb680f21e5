use crate::session::types::{SubmitError, Tier};

/// Per-tier constants: concurrency cap, retry allowance, export permission,
/// and the credit grant applied when upgrading into the tier.
///
/// One row per tier, read through [`Tier::limits`].  The admission gate is
/// the sole consumer of `max_processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    /// Maximum number of concurrently `Processing` tasks.
    pub max_processing: usize,
    /// Free retries per task.
    pub retry_allowance: u32,
    /// Whether the export sheet is available.
    pub can_export: bool,
    /// Credits granted on upgrade into this tier.
    pub subscription_grant: u32,
}

const FREE_LIMITS: TierLimits = TierLimits {
    max_processing: 1,
    retry_allowance: 0,
    can_export: false,
    subscription_grant: 0,
};

const PRO_LIMITS: TierLimits = TierLimits {
    max_processing: 10,
    retry_allowance: 4,
    can_export: true,
    subscription_grant: 1000,
};

const STUDIO_LIMITS: TierLimits = TierLimits {
    max_processing: 20,
    retry_allowance: 8,
    can_export: true,
    subscription_grant: 4000,
};

impl Tier {
    pub fn limits(&self) -> &'static TierLimits {
        match self {
            Tier::Free => &FREE_LIMITS,
            Tier::Pro => &PRO_LIMITS,
            Tier::Studio => &STUDIO_LIMITS,
        }
    }
}

/// Decide whether a new task may enter the queue.
///
/// Pure function of the tier and the current `Processing` count; owns no
/// state and mutates nothing.  Denial means the caller must not enqueue
/// and must not touch the ledger.
pub fn admit(tier: Tier, processing_count: usize) -> Result<(), SubmitError> {
    let limits = tier.limits();
    if processing_count >= limits.max_processing {
        return Err(SubmitError::QueueFull {
            tier,
            max_processing: limits.max_processing,
        });
    }
    Ok(())
}
