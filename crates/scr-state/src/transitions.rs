//! Legal state transitions

use crate::error::StateMachineError;
use crate::state::StateKind;

/// Validates a state transition.
///
/// Illegal transitions return an error. With the `strict-debug` feature they
/// panic instead, which surfaces machine bugs in tests immediately.
///
/// # Errors
/// Returns [`StateMachineError::IllegalTransition`] if `to` is not reachable
/// from `from`.
pub fn validate_transition(from: StateKind, to: StateKind) -> Result<(), StateMachineError> {
    if allowed(from, to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("Illegal content state transition attempted: {from:?} -> {to:?}");

        #[cfg(not(feature = "strict-debug"))]
        Err(StateMachineError::IllegalTransition { from, to })
    }
}

/// States reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: StateKind) -> Vec<StateKind> {
    use StateKind::{Error, Idle, Loading, Ready};
    match from {
        Idle => vec![Idle, Loading, Error],
        Loading => vec![Idle, Loading, Ready, Error],
        Ready => vec![Idle, Loading, Error],
        Error => vec![Idle, Loading, Error],
    }
}

fn allowed(from: StateKind, to: StateKind) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_is_only_reached_from_loading() {
        for from in StateKind::ALL {
            let reachable = allowed_transitions(from).contains(&StateKind::Ready);
            assert_eq!(reachable, from == StateKind::Loading, "from {from}");
        }
    }

    #[test]
    fn every_state_can_reset() {
        for from in StateKind::ALL {
            assert!(validate_transition(from, StateKind::Idle).is_ok());
        }
    }

    #[cfg(not(feature = "strict-debug"))]
    #[test]
    fn idle_cannot_jump_to_ready() {
        assert_eq!(
            validate_transition(StateKind::Idle, StateKind::Ready),
            Err(StateMachineError::IllegalTransition {
                from: StateKind::Idle,
                to: StateKind::Ready
            })
        );
    }
}
