// Library root
// -----------
// This crate exposes the pieces of the `sealfile` CLI as a library. The
// binary (`main.rs`) parses flags, loads settings and calls into these
// modules.
//
// Module responsibilities:
// - `config`: Loads and validates the YAML settings file (API key and
//   registration endpoint).
// - `digest`: Streams a file through SHA-256.
// - `api`: Blocking HTTP client for the seal service's register call.
// - `seal_log`: Append-only CSV audit log of successful seals.
// - `seal`: Runs hash -> register -> log for one file.
// - `ui`: Spinner and result output for the operator.
// - `error`: Error types shared by the stages above.
pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod seal;
pub mod seal_log;
pub mod ui;

pub use config::Config;
pub use digest::Digest;
pub use error::SealError;
