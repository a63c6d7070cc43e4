// Error taxonomy shared by every stage of the sealing pipeline.
//
// Each stage returns a `SealError`; the pipeline stops at the first one.
// Configuration problems have their own enum so the loader can report
// exactly which key is wrong.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors produced while hashing, registering or logging a seal.
#[derive(Debug, thiserror::Error)]
pub enum SealError {
    /// Reading the input file or appending to the seal log failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with anything other than 200 OK.
    #[error("seal service responded with unexpected status code {status}")]
    Status { status: u16 },

    #[error("unable to decode seal service response: {0}")]
    Decode(String),

    /// The response decoded fine but carried no document records.
    #[error("seal service returned no documents")]
    NoDocuments,

    #[error("seal service returned an empty retrieval id")]
    EmptyRetrievalId,

    /// The digest was registered but the seal log could not be written.
    /// The retrieval id is kept here so the seal is not lost.
    #[error(
        "registered as {retrieval_id} but could not append to seal log {}: {source}",
        .path.display()
    )]
    LogAppend {
        retrieval_id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log rows hold the filename as text, so the path must be UTF-8.
    #[error("file name {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),
}

impl SealError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SealError::Io {
            path: path.into(),
            source,
        }
    }
}
