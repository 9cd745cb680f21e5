pub mod config;
pub mod hints;
mod session;

pub use config::Config;
pub use hints::{HintStore, HintStoreError};
pub use session::admission::TierLimits;
pub use session::driver::ProgressDriver;
pub use session::handle::SessionHandle;
pub use session::ledger::CreditLedger;
pub use session::queue::TaskQueue;
pub use session::state::Session;
pub use session::types::{
    GenerationRequest, LedgerError, SubmitError, TaskId, TaskKind, TaskRecord, TaskStatus, Tier,
    ViewerTarget,
};
