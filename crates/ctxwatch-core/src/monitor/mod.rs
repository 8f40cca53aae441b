//! Per-turn orchestration.
//!
//! [`evaluate_turn`] is the pure core: settings, payload and transcript tail
//! in, at most one advisory out. [`run_hook`] adds the I/O around it and
//! swallows every failure, since the host must never see one.

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::advisory::{Advisory, AdvisoryPolicy};
use crate::budget::BudgetState;
use crate::config::Settings;
use crate::hook::{is_reentrant, read_hook_input, HookInput};
use crate::transcript::read_tail_lines;
use crate::usage::{latest_usage, UsageSnapshot};
use crate::MonitorError;

/// Everything derived from one transcript tail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    /// Lines in the scanned window
    pub window_lines: usize,
    /// Counters of the latest qualifying record
    pub usage: UsageSnapshot,
    /// Usage against capacity
    pub budget: BudgetState,
    /// Advisory to emit, if a threshold was crossed
    pub advisory: Option<Advisory>,
}

impl fmt::Display for TurnReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "window lines:          {}", self.window_lines)?;
        writeln!(f, "input tokens:          {}", self.usage.input_tokens)?;
        writeln!(
            f,
            "cache read tokens:     {}",
            self.usage.cache_read_input_tokens
        )?;
        writeln!(
            f,
            "cache creation tokens: {}",
            self.usage.cache_creation_input_tokens
        )?;
        write!(
            f,
            "context used:          {} / {} ({}%)",
            self.budget.used_tokens, self.budget.capacity, self.budget.percentage
        )?;
        if self.budget.is_over_capacity() {
            write!(f, " over capacity")?;
        }
        writeln!(f)?;
        match &self.advisory {
            Some(advisory) => write!(f, "advisory ({}):      {}", advisory.tier, advisory.text),
            None => write!(f, "advisory:              none"),
        }
    }
}

/// Run stages 3-5 (extract, evaluate, advise) on a transcript tail
pub fn assess_tail<S: AsRef<str>>(
    settings: &Settings,
    tail: &[S],
) -> Result<TurnReport, MonitorError> {
    let usage = latest_usage(tail).ok_or(MonitorError::NoQualifyingRecord {
        window: tail.len(),
    })?;
    let budget = BudgetState::evaluate(usage.total(), settings.max_context_tokens)
        .ok_or(MonitorError::ZeroCapacity)?;
    let advisory = AdvisoryPolicy::from_settings(settings).advise(&budget);

    debug!(
        "{} -> {}",
        budget.to_log_string(),
        advisory
            .as_ref()
            .map(|a| a.tier.to_string())
            .unwrap_or_else(|| "no advisory".to_string())
    );

    Ok(TurnReport {
        window_lines: tail.len(),
        usage,
        budget,
        advisory,
    })
}

/// Decide the advisory for one turn.
///
/// Pure: the same settings, payload and tail always give the same answer.
/// The re-entrancy guard wins over everything else.
pub fn evaluate_turn<S: AsRef<str>>(
    settings: &Settings,
    input: &HookInput,
    tail: &[S],
) -> Option<Advisory> {
    if is_reentrant(input) {
        return None;
    }
    match assess_tail(settings, tail) {
        Ok(report) => report.advisory,
        Err(e) => {
            debug!("No advisory: {}", e);
            None
        }
    }
}

/// Read the transcript at `path` and assess it
pub fn inspect_transcript(settings: &Settings, path: &Path) -> Result<TurnReport, MonitorError> {
    let tail = read_tail_lines(path, settings.tail_window_size)?;
    assess_tail(settings, &tail)
}

/// Hook entry point: payload from `stdin`, advisory (if any) back.
///
/// Never fails. Every short-circuit is logged at debug level and becomes
/// `None`.
pub fn run_hook<R: Read>(settings: &Settings, stdin: R) -> Option<Advisory> {
    match try_run_hook(settings, stdin) {
        Ok(advisory) => advisory,
        Err(e) => {
            debug!("No advisory: {}", e);
            None
        }
    }
}

fn try_run_hook<R: Read>(settings: &Settings, stdin: R) -> Result<Option<Advisory>, MonitorError> {
    let input = read_hook_input(stdin)?;
    debug!(
        "Hook invoked: event={} session={} cwd={}",
        input.hook_event_name.as_deref().unwrap_or("-"),
        input.session_id.as_deref().unwrap_or("-"),
        input.cwd.as_deref().unwrap_or("-")
    );

    // Guard before touching the transcript
    if is_reentrant(&input) {
        return Ok(None);
    }

    let path = input.resolve_transcript_path()?;
    let tail = read_tail_lines(&path, settings.tail_window_size)?;
    Ok(evaluate_turn(settings, &input, &tail))
}
