//! Error taxonomy for a single monitor invocation.
//!
//! None of these ever reach the host: [`crate::monitor::run_hook`] logs them
//! and turns them into silence. They exist so each short-circuit has a name
//! in debug logs and in `inspect` output.

use std::path::PathBuf;

use thiserror::Error;

/// Reasons a turn produced no usage figure
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Stdin was empty or not a JSON hook payload
    #[error("hook input is missing or malformed: {message}")]
    MalformedInput { message: String },

    /// Payload decoded but carries no usable transcript path
    #[error("hook input has no transcript path")]
    MissingTranscriptPath,

    /// Transcript could not be opened or read
    #[error("transcript unavailable at {}: {source}", .path.display())]
    TranscriptUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tail window holds no assistant record with usage accounting
    #[error("no usage-bearing assistant record in the last {window} transcript lines")]
    NoQualifyingRecord { window: usize },

    /// Capacity of zero tokens cannot be evaluated
    #[error("context capacity must be greater than zero")]
    ZeroCapacity,
}
