//! sav-uplink: save-file ingestion for the community item database.
//!
//! Decrypts a user's `.sav` with account-derived key material, walks
//! the known save-document shapes for item serials, and submits them
//! as one batch to the item service. Also carries the service's read
//! path (listing, decoding, single submission) used by the CLI.

pub mod cli;
pub mod client;
pub mod config;
pub mod crypto;
pub mod pipeline;

pub use client::ItemsClient;
pub use pipeline::{PipelineController, PipelineError, RunSnapshot, Stage, UploadOutcome};
