//! Usage extraction from the transcript tail.
//!
//! Finds the latest assistant turn that carries provider token accounting and
//! reduces it to the counters that occupy the context window.

mod extractor;
mod types;

pub use extractor::latest_usage;
pub use types::UsageSnapshot;
