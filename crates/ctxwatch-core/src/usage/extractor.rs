use tracing::{debug, trace};

use super::types::UsageSnapshot;
use crate::transcript::TranscriptRecord;

/// Find the most recent agent turn carrying usage accounting.
///
/// `lines` is the transcript tail, oldest first. Scans newest to oldest and
/// stops at the first match. Blank lines are ignored; lines that fail to
/// decode are skipped so one corrupt or half-written record never hides the
/// rest of the window.
///
/// Returns `None` when nothing in the window qualifies. That is different
/// from `Some` with a zero total.
pub fn latest_usage<S: AsRef<str>>(lines: &[S]) -> Option<UsageSnapshot> {
    let mut skipped = 0usize;

    for (idx, line) in lines.iter().enumerate().rev() {
        let trimmed = line.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<TranscriptRecord>(trimmed) {
            Ok(r) => r,
            Err(e) => {
                trace!("Skipping malformed transcript line {} of tail: {}", idx + 1, e);
                skipped += 1;
                continue;
            }
        };

        if !record.is_agent_turn() {
            continue;
        }

        if let Some(usage) = record.usage() {
            let snapshot = UsageSnapshot::from(usage);
            debug!(
                "Usage found at tail line {}: {} tokens ({} malformed lines skipped)",
                idx + 1,
                snapshot.total(),
                skipped
            );
            return Some(snapshot);
        }
    }

    debug!(
        "No usage-bearing assistant record in {} tail lines ({} malformed)",
        lines.len(),
        skipped
    );
    None
}
