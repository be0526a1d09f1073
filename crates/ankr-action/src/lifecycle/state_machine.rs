//! Action call state machine with validated transitions.
//!
//! Requested -> Acknowledged -> Executing -> Succeeded/Failed/Cancelled
//! Requested -> Executing (acknowledgement is optional)
//! Requested/Acknowledged -> Succeeded/Failed/Cancelled (external completion)

use ankr_core::types::ActionCallStatus;

use crate::error::LifecycleError;

/// Validate that a status transition is allowed.
///
/// Terminal states have no outgoing transitions here; re-running a terminal
/// call is a forced re-execution, which the controller handles explicitly.
pub fn validate_transition(
    from: ActionCallStatus,
    to: ActionCallStatus,
) -> Result<(), LifecycleError> {
    use ankr_core::types::ActionCallStatus::*;

    let valid = matches!(
        (from, to),
        (Requested, Acknowledged)
            | (Requested, Executing)
            | (Acknowledged, Executing)
            | (Requested | Acknowledged | Executing, Succeeded | Failed | Cancelled)
    );

    if valid {
        Ok(())
    } else {
        Err(LifecycleError::InvalidTransition(from, to))
    }
}
