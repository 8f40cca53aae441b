//! Session transcript access.
//!
//! The transcript is an append-only JSONL file owned by the host. We open it
//! read-only, look at a bounded number of trailing lines, and decode each line
//! leniently.

mod reader;
mod record;

pub use reader::read_tail_lines;
pub use record::{RecordMessage, TokenUsage, TranscriptRecord};
