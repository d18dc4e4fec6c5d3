//! Diagnostic logging for the binaries.
//!
//! Events go to stderr through a `tracing` fmt subscriber. The level stays at
//! `WARN` unless asked otherwise so that user-facing error lines remain the
//! only output on the error stream.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

pub fn init(verbose: bool) -> Result<(), SetGlobalDefaultError> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}
