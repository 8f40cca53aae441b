//! Stop-hook payload handling.
//!
//! The host writes one JSON object to stdin per invocation. Only
//! `transcript_path` and `stop_hook_active` drive behaviour; the rest is kept
//! for debug logging.

mod guard;
mod input;

pub use guard::is_reentrant;
pub use input::{parse_hook_input, read_hook_input, HookInput};
