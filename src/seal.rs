// Seal pipeline: hash the file, register the digest, record the result.
//
// Steps run in order and the first failure ends the run. The log entry
// is written only after the service has handed back a retrieval id, so
// every row in the seal log corresponds to exactly one successful
// registration.

use std::path::Path;

use crate::api::SealClient;
use crate::digest::Digest;
use crate::error::SealError;
use crate::seal_log::{SealLog, SealLogEntry};

/// Everything known about one completed seal.
#[derive(Debug, Clone)]
pub struct SealReceipt {
    pub digest: Digest,
    pub retrieval_id: String,
    pub entry: SealLogEntry,
}

pub fn seal_file(client: &SealClient, log: &SealLog, file: &Path) -> Result<SealReceipt, SealError> {
    let filename = file
        .to_str()
        .ok_or_else(|| SealError::NonUtf8Path(file.to_path_buf()))?;

    let digest = Digest::from_file(file)?;
    tracing::info!(file = filename, %digest, "computed digest");

    let registration = client.register(&digest)?;
    tracing::info!(retrieval_id = %registration.retrieval_id, "registered digest");

    let entry = SealLogEntry::now(registration.retrieval_id.clone(), filename);
    log.record(&entry).map_err(|e| match e {
        SealError::Io { path, source } => SealError::LogAppend {
            retrieval_id: registration.retrieval_id.clone(),
            path,
            source,
        },
        other => other,
    })?;

    Ok(SealReceipt {
        digest,
        retrieval_id: registration.retrieval_id,
        entry,
    })
}
