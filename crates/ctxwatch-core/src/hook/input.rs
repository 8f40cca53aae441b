use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use crate::MonitorError;

/// Payload the host sends on stdin for a stop event
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    /// Session identifier (logging only)
    #[serde(default)]
    pub session_id: Option<String>,
    /// Path to the session transcript (.jsonl)
    #[serde(default)]
    pub transcript_path: Option<String>,
    /// Working directory of the session (logging only)
    #[serde(default)]
    pub cwd: Option<String>,
    /// Event name, e.g. "Stop" (logging only)
    #[serde(default)]
    pub hook_event_name: Option<String>,
    /// Set when this stop follows a previous stop-hook response
    #[serde(default)]
    pub stop_hook_active: bool,
}

impl HookInput {
    /// Resolve the transcript path, expanding a leading `~/`
    ///
    /// Absent, `null`, or blank paths are all [`MonitorError::MissingTranscriptPath`].
    pub fn resolve_transcript_path(&self) -> Result<PathBuf, MonitorError> {
        let raw = self
            .transcript_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or(MonitorError::MissingTranscriptPath)?;

        if let Some(rest) = raw.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return Ok(home.join(rest));
            }
        }
        Ok(PathBuf::from(raw))
    }
}

/// Decode a hook payload from its raw JSON text
pub fn parse_hook_input(raw: &str) -> Result<HookInput, MonitorError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MonitorError::MalformedInput {
            message: "empty input".to_string(),
        });
    }
    serde_json::from_str(trimmed).map_err(|e| MonitorError::MalformedInput {
        message: e.to_string(),
    })
}

/// Read stdin (or any reader) to the end and decode the hook payload
pub fn read_hook_input<R: Read>(mut reader: R) -> Result<HookInput, MonitorError> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .map_err(|e| MonitorError::MalformedInput {
            message: e.to_string(),
        })?;
    parse_hook_input(&raw)
}
