//! Re-entrancy guard.
//!
//! An advisory printed by this hook can be fed back to the agent as a new
//! turn, which ends in another stop event. The host marks that follow-up stop
//! with `stop_hook_active`; we must stay silent on it or the hook feeds itself
//! forever.

use tracing::debug;

use super::HookInput;

/// Whether this invocation was triggered by a previous stop-hook response
///
/// Checked before anything else, including the transcript read.
pub fn is_reentrant(input: &HookInput) -> bool {
    if input.stop_hook_active {
        debug!(
            session_id = input.session_id.as_deref().unwrap_or("-"),
            "stop_hook_active set, staying silent"
        );
        return true;
    }
    false
}
