//! Save-file ingestion pipeline.
//!
//! Linear staged flow: load decryptor → decrypt → parse + extract →
//! bulk upload. Every external dependency (decryption, parsing, the
//! network) sits behind a trait so the whole pipeline runs against
//! mocks in tests. The controller in `runner` owns the state machine;
//! `extract` and `upload` are the pure stage functions.

pub mod error;
pub mod extract;
pub mod runner;
pub mod traits;
pub mod types;
pub mod upload;

pub use error::PipelineError;
pub use runner::PipelineController;
pub use types::{RunSnapshot, SerialBatch, Stage, UploadOutcome};
