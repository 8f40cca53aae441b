//! Context budget evaluation.
//!
//! Turns a token count into a whole percentage of the configured capacity.
//! Truncating integer division is intentional: the figure errs low, so a
//! threshold never fires early. Values above 100 are kept as-is.

use serde::Serialize;

/// Usage measured against the context window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetState {
    /// Tokens resident in the window
    pub used_tokens: u64,
    /// Context window capacity
    pub capacity: u64,
    /// `floor(100 * used_tokens / capacity)`, unclamped
    pub percentage: u64,
}

impl BudgetState {
    /// Evaluate `used_tokens` against `capacity`.
    ///
    /// Returns `None` for a zero capacity.
    pub fn evaluate(used_tokens: u64, capacity: u64) -> Option<Self> {
        let percentage = usage_percentage(used_tokens, capacity)?;
        Some(Self {
            used_tokens,
            capacity,
            percentage,
        })
    }

    /// Whether usage is beyond the window
    pub fn is_over_capacity(&self) -> bool {
        self.used_tokens > self.capacity
    }

    /// Format as a short log-friendly string
    pub fn to_log_string(&self) -> String {
        format!(
            "context: {} tokens ({}% of {})",
            self.used_tokens, self.percentage, self.capacity
        )
    }
}

/// `floor(100 * tokens / capacity)` without overflow
pub fn usage_percentage(tokens: u64, capacity: u64) -> Option<u64> {
    if capacity == 0 {
        return None;
    }
    let pct = u128::from(tokens) * 100 / u128::from(capacity);
    Some(u64::try_from(pct).unwrap_or(u64::MAX))
}
