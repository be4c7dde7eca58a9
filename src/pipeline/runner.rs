//! Pipeline controller.
//!
//! Explicit state machine over one run at a time. Each `step()`
//! performs the current stage's single fallible operation and moves
//! the run forward (or into `Error`); the presentation layer reads a
//! `RunSnapshot` between steps to render progress. Nothing here does
//! I/O directly; all of it is delegated to the injected capabilities.

use tracing::{error, info};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::config;
use crate::pipeline::error::PipelineError;
use crate::pipeline::extract::extract_serials;
use crate::pipeline::traits::{
    BuiltinDecryptorProvider, DecryptorProvider, DocumentParser, SaveDecryptor, SerialSink,
    YamlParser,
};
use crate::pipeline::types::{RunSnapshot, Stage, UploadOutcome};
use crate::pipeline::upload::upload_serials;

/// State for one ingestion run. Discarded wholesale on reset; the
/// account key is zeroed the moment decryption no longer needs it.
struct PipelineRun {
    id: Uuid,
    file_name: String,
    data: Vec<u8>,
    account_key: Zeroizing<String>,
    stage: Stage,
    decryptor: Option<Box<dyn SaveDecryptor>>,
    plaintext: Option<Vec<u8>>,
    document: Option<serde_yaml::Value>,
    serials: Vec<String>,
    outcome: Option<UploadOutcome>,
    error: Option<PipelineError>,
}

/// Sequences: load decryptor → decrypt → parse + extract → upload.
///
/// Not reentrant: `start` while a run exists is rejected, never
/// queued; `reset` is the only way back to `Idle`.
pub struct PipelineController {
    provider: Box<dyn DecryptorProvider>,
    parser: Box<dyn DocumentParser>,
    sink: Box<dyn SerialSink>,
    run: Option<PipelineRun>,
}

impl PipelineController {
    pub fn new(
        provider: Box<dyn DecryptorProvider>,
        parser: Box<dyn DocumentParser>,
        sink: Box<dyn SerialSink>,
    ) -> Self {
        Self {
            provider,
            parser,
            sink,
            run: None,
        }
    }

    /// Controller with the built-in decryptor and YAML parser; only
    /// the submission endpoint varies in production use.
    pub fn with_sink(sink: Box<dyn SerialSink>) -> Self {
        Self::new(Box::new(BuiltinDecryptorProvider), Box::new(YamlParser), sink)
    }

    /// Begin a run over one selected file. Requires a non-empty
    /// account key and no existing run (finished or not: a finished
    /// run holds its result until `reset`).
    pub fn start(
        &mut self,
        file_name: &str,
        data: Vec<u8>,
        account_key: &str,
    ) -> Result<Uuid, PipelineError> {
        if self.run.is_some() {
            return Err(PipelineError::RunInFlight);
        }
        if account_key.trim().is_empty() {
            return Err(PipelineError::EmptyAccountKey);
        }

        let id = Uuid::new_v4();
        info!(run = %id, file = %file_name, "starting save ingestion");
        self.run = Some(PipelineRun {
            id,
            file_name: file_name.to_string(),
            data,
            account_key: Zeroizing::new(account_key.trim().to_string()),
            stage: Stage::LoadingDecryptor,
            decryptor: None,
            plaintext: None,
            document: None,
            serials: Vec::new(),
            outcome: None,
            error: None,
        });
        Ok(id)
    }

    /// Perform the current stage's operation and advance. A no-op at
    /// `Idle` and in terminal stages.
    pub fn step(&mut self) -> Stage {
        let Some(run) = self.run.as_mut() else {
            return Stage::Idle;
        };

        match run.stage {
            Stage::LoadingDecryptor => match self.provider.load() {
                Ok(decryptor) => {
                    run.decryptor = Some(decryptor);
                    run.stage = Stage::Decrypting;
                }
                Err(e) => fail(run, PipelineError::CapabilityLoad(e.to_string())),
            },

            Stage::Decrypting => {
                let decryptor = run
                    .decryptor
                    .as_ref()
                    .expect("decryptor set when entering Decrypting");
                match decryptor.decrypt(&run.data, &run.account_key) {
                    Ok(plaintext) => {
                        run.plaintext = Some(plaintext);
                        // Key material is only needed for this stage.
                        run.account_key = Zeroizing::new(String::new());
                        run.stage = Stage::Extracting;
                    }
                    Err(e) => fail(run, PipelineError::Decryption(e)),
                }
            }

            Stage::Extracting => {
                let plaintext = run
                    .plaintext
                    .take()
                    .expect("plaintext set when entering Extracting");
                match self.parser.parse(&plaintext) {
                    Ok(document) => {
                        let serials = extract_serials(&document);
                        if serials.is_empty() {
                            fail(run, PipelineError::NoItems);
                        } else {
                            info!(run = %run.id, count = serials.len(), "serials extracted");
                            run.document = Some(document);
                            run.serials = serials;
                            run.stage = Stage::Uploading;
                        }
                    }
                    Err(e) => fail(run, PipelineError::Parse(e)),
                }
            }

            Stage::Uploading => {
                match upload_serials(&run.serials, config::SAVE_UPLOAD_SOURCE, self.sink.as_ref())
                {
                    Ok(outcome) => {
                        run.outcome = Some(outcome);
                        run.stage = Stage::Done;
                        info!(run = %run.id, total = outcome.total, "ingestion complete");
                    }
                    // Serials stay visible for progress context.
                    Err(e) => fail(run, PipelineError::Upload(e)),
                }
            }

            Stage::Idle | Stage::Done | Stage::Error => {}
        }

        run.stage
    }

    /// Drive the run to a terminal stage.
    pub fn run_to_end(&mut self) -> Stage {
        loop {
            let stage = self.step();
            if stage.is_terminal() || self.run.is_none() {
                return stage;
            }
        }
    }

    /// Discard the run entirely, returning to `Idle`. Late results
    /// from the discarded run are identifiable by its id and must be
    /// ignored by observers.
    pub fn reset(&mut self) {
        if let Some(run) = self.run.take() {
            info!(run = %run.id, "run discarded");
        }
    }

    pub fn stage(&self) -> Stage {
        self.run.as_ref().map_or(Stage::Idle, |r| r.stage)
    }

    pub fn run_id(&self) -> Option<Uuid> {
        self.run.as_ref().map(|r| r.id)
    }

    /// Serial count, once extraction has succeeded.
    pub fn serial_count(&self) -> Option<usize> {
        self.run
            .as_ref()
            .filter(|r| !r.serials.is_empty())
            .map(|r| r.serials.len())
    }

    pub fn outcome(&self) -> Option<&UploadOutcome> {
        self.run.as_ref().and_then(|r| r.outcome.as_ref())
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.run.as_ref().and_then(|r| r.error.as_ref())
    }

    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            run_id: self.run_id(),
            stage: self.stage(),
            file_name: self.run.as_ref().map(|r| r.file_name.clone()),
            serial_count: self.serial_count(),
            outcome: self.outcome().copied(),
            error: self.error().map(|e| e.to_string()),
        }
    }
}

fn fail(run: &mut PipelineRun, err: PipelineError) {
    error!(run = %run.id, stage = %run.stage, %err, "pipeline stage failed");
    run.account_key = Zeroizing::new(String::new());
    run.error = Some(err);
    run.stage = Stage::Error;
}
