//! Pipeline error taxonomy.
//!
//! One variant per failure point, each carrying the single user-facing
//! message the presentation layer shows in place of the progress line.
//! Every failure is terminal for the run; nothing here is retried.

use thiserror::Error;

use crate::client::ClientError;
use crate::crypto::SavError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Decryption module unavailable: {0}")]
    CapabilityLoad(String),

    #[error("Decryption failed. Check your account id and ensure this is a valid save file.")]
    Decryption(#[source] SavError),

    #[error("Failed to parse save data")]
    Parse(#[source] serde_yaml::Error),

    #[error("No items found in this save file")]
    NoItems,

    #[error("Failed to upload items to database")]
    Upload(#[source] ClientError),

    // start() preconditions
    #[error("Account id must not be empty")]
    EmptyAccountKey,

    #[error("An upload is already in progress")]
    RunInFlight,
}
