//! Durable "has the user seen the viewer usage hint" flag.
//!
//! The single piece of state that outlives the session.  Everything else —
//! credits, tier, the task queue — is memory-only and is discarded on
//! sign-out or reload.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum HintStoreError {
    #[error("hint store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hint store encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The platform reports no local data directory.
    #[error("no local data directory available")]
    NoDataDir,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HintFlags {
    has_seen_viewer_hint: bool,
}

/// File-backed store for the viewer usage hint flag.
///
/// Reads treat a missing or unreadable file as "not seen"; only writes
/// surface errors, and callers may treat even those as non-fatal.
#[derive(Debug, Clone)]
pub struct HintStore {
    path: PathBuf,
}

impl HintStore {
    /// Store under the platform's local data directory
    /// (e.g. `~/.local/share/genforge/hints.json`).
    pub fn open_default() -> Result<Self, HintStoreError> {
        let dir = dirs_next::data_local_dir().ok_or(HintStoreError::NoDataDir)?;
        Ok(Self {
            path: dir.join("genforge").join("hints.json"),
        })
    }

    /// Store at an explicit path (tests, portable installs).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn has_seen_viewer_hint(&self) -> bool {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(_) => return false,
        };
        match serde_json::from_slice::<HintFlags>(&raw) {
            Ok(flags) => flags.has_seen_viewer_hint,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable hint file; treating as unseen");
                false
            }
        }
    }

    /// Persist that the hint was shown.  Idempotent.
    pub fn mark_viewer_hint_seen(&self) -> Result<(), HintStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let flags = HintFlags {
            has_seen_viewer_hint: true,
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&flags)?)?;
        Ok(())
    }
}
