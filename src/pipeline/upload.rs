//! Bulk submission of extracted serials.
//!
//! One request carries the whole batch; no chunking, no retry, no
//! partial re-send. The remote's accept/duplicate split is passed
//! through verbatim; only `total` is computed locally.

use tracing::info;

use crate::client::ClientError;
use crate::pipeline::traits::SerialSink;
use crate::pipeline::types::{SerialBatch, UploadOutcome};

/// Submit `serials` as a single batch tagged with `source`.
///
/// Callers must guarantee a non-empty batch; the extraction stage
/// routes empty results to an error before this point.
pub fn upload_serials(
    serials: &[String],
    source: &str,
    sink: &dyn SerialSink,
) -> Result<UploadOutcome, ClientError> {
    debug_assert!(!serials.is_empty(), "empty batch is a caller bug");

    let batch = SerialBatch {
        serials: serials.to_vec(),
        source: source.to_string(),
    };

    let counts = sink.submit_batch(&batch)?;
    info!(
        total = serials.len(),
        succeeded = counts.succeeded,
        failed = counts.failed,
        "bulk upload accepted"
    );

    Ok(UploadOutcome {
        total: serials.len(),
        succeeded: counts.succeeded,
        failed: counts.failed,
    })
}
