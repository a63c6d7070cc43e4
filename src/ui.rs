// Operator-facing output: a spinner while a blocking step runs and the
// plain-text summary printed once a seal is done.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::seal::SealReceipt;

/// Run `f` under a terminal spinner showing `message`. The spinner is
/// cleared before returning, whatever `f` returned.
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

/// Print the result of a seal to stdout.
pub fn report(receipt: &SealReceipt) {
    println!("RetrievalId: {}", receipt.retrieval_id);
    println!("Digest:      {}", receipt.digest);
    println!("File:        {}", receipt.entry.filename);
}
