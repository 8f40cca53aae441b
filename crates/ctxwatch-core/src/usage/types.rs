use serde::Serialize;

use crate::transcript::TokenUsage;

/// Context-resident token counters of the latest assistant turn
///
/// Output tokens are deliberately absent: they are not part of what the
/// provider counts as occupying the window on the next request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    /// Direct input tokens (non-cached)
    pub input_tokens: u64,
    /// Tokens read from cache
    pub cache_read_input_tokens: u64,
    /// Tokens written to cache
    pub cache_creation_input_tokens: u64,
}

impl UsageSnapshot {
    /// Sum of the three counters
    pub fn total(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_read_input_tokens)
            .saturating_add(self.cache_creation_input_tokens)
    }
}

impl From<&TokenUsage> for UsageSnapshot {
    fn from(usage: &TokenUsage) -> Self {
        Self {
            input_tokens: usage.input_tokens.unwrap_or(0),
            cache_read_input_tokens: usage.cache_read_input_tokens.unwrap_or(0),
            cache_creation_input_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
        }
    }
}
