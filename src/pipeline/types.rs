//! Shared pipeline types.

use serde::Serialize;
use uuid::Uuid;

/// Where a run currently is. Strictly linear; `Error` is reachable
/// from every non-terminal stage and only `reset` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    LoadingDecryptor,
    Decrypting,
    Extracting,
    Uploading,
    Done,
    Error,
}

impl Stage {
    /// Terminal stages accept no further steps.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Done | Stage::Error)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::LoadingDecryptor => write!(f, "loading decryptor"),
            Self::Decrypting => write!(f, "decrypting"),
            Self::Extracting => write!(f, "extracting"),
            Self::Uploading => write!(f, "uploading"),
            Self::Done => write!(f, "done"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One bulk submission: deduplicated serials in discovery order plus
/// the provenance tag recorded alongside each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialBatch {
    pub serials: Vec<String>,
    pub source: String,
}

/// Accounting for one bulk submission. `total` is counted locally;
/// `succeeded` and `failed` are whatever the service reported; the
/// remote is authoritative and the split is not re-checked here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub total: usize,
    pub succeeded: u64,
    pub failed: u64,
}

/// Observable snapshot of the current run, for progress rendering.
/// Carries the run id so a caller can discard snapshots that arrive
/// after a reset.
#[derive(Debug, Clone, Serialize)]
pub struct RunSnapshot {
    pub run_id: Option<Uuid>,
    pub stage: Stage,
    pub file_name: Option<String>,
    /// Known once extraction has succeeded; survives an upload failure
    /// so the progress line keeps its context.
    pub serial_count: Option<usize>,
    pub outcome: Option<UploadOutcome>,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_done_and_error_are_terminal() {
        assert!(Stage::Done.is_terminal());
        assert!(Stage::Error.is_terminal());
        for stage in [
            Stage::Idle,
            Stage::LoadingDecryptor,
            Stage::Decrypting,
            Stage::Extracting,
            Stage::Uploading,
        ] {
            assert!(!stage.is_terminal(), "{stage} must not be terminal");
        }
    }
}
