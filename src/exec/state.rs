// src/exec/state.rs

//! Pure per-invocation state machine.
//!
//! This is the deterministic core of the supervisor: it knows which
//! transitions are legal but performs no IO and owns no Tokio types. The
//! async driver in [`super::supervisor`] feeds it events and acts on the
//! state it lands in.
//!
//! ```text
//! Running ──exit──────────────▶ Completed
//! Running ──deadline/cancel───▶ Terminating ──exit──▶ Terminated
//!                               Terminating ──grace─▶ Killing ──exit──▶ Killed
//! ```

use crate::types::{StopCause, Termination};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Running,
    Terminating(StopCause),
    Killing(StopCause),
    Completed,
    Terminated(StopCause),
    Killed(StopCause),
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    ProcessExited,
    DeadlineElapsed,
    CancelRequested,
    GraceElapsed,
}

impl InvocationState {
    /// Apply `event`. Events that make no sense in the current state leave
    /// it unchanged (e.g. a second cancel while already terminating).
    pub fn on(self, event: SupervisorEvent) -> Self {
        use InvocationState::*;
        use SupervisorEvent::*;

        match (self, event) {
            (Running, ProcessExited) => Completed,
            (Running, DeadlineElapsed) => Terminating(StopCause::Timeout),
            (Running, CancelRequested) => Terminating(StopCause::Cancelled),
            (Terminating(cause), ProcessExited) => Terminated(cause),
            (Terminating(cause), GraceElapsed) => Killing(cause),
            (Killing(cause), ProcessExited) => Killed(cause),
            (state, _) => state,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            InvocationState::Completed
                | InvocationState::Terminated(_)
                | InvocationState::Killed(_)
        )
    }

    /// Why the process was stopped, if it was.
    pub fn stop_cause(self) -> Option<StopCause> {
        match self {
            InvocationState::Running | InvocationState::Completed => None,
            InvocationState::Terminating(c)
            | InvocationState::Killing(c)
            | InvocationState::Terminated(c)
            | InvocationState::Killed(c) => Some(c),
        }
    }

    /// For terminal states reached through the stop sequence.
    pub fn termination(self) -> Option<Termination> {
        match self {
            InvocationState::Terminated(_) => Some(Termination::Graceful),
            InvocationState::Killed(_) => Some(Termination::Forced),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InvocationState::*;
    use super::SupervisorEvent::*;
    use super::*;

    #[test]
    fn natural_exit_completes() {
        let s = Running.on(ProcessExited);
        assert_eq!(s, Completed);
        assert!(s.is_terminal());
        assert_eq!(s.stop_cause(), None);
        assert_eq!(s.termination(), None);
    }

    #[test]
    fn deadline_then_exit_is_graceful_timeout() {
        let s = Running.on(DeadlineElapsed);
        assert_eq!(s, Terminating(StopCause::Timeout));
        assert!(!s.is_terminal());

        let s = s.on(ProcessExited);
        assert_eq!(s, Terminated(StopCause::Timeout));
        assert_eq!(s.termination(), Some(Termination::Graceful));
    }

    #[test]
    fn grace_elapsed_escalates_to_kill() {
        let s = Running.on(DeadlineElapsed).on(GraceElapsed);
        assert_eq!(s, Killing(StopCause::Timeout));
        let s = s.on(ProcessExited);
        assert_eq!(s, Killed(StopCause::Timeout));
        assert_eq!(s.termination(), Some(Termination::Forced));
    }

    #[test]
    fn cancel_is_remembered_as_cause() {
        let s = Running.on(CancelRequested).on(GraceElapsed).on(ProcessExited);
        assert_eq!(s, Killed(StopCause::Cancelled));
        assert_eq!(s.stop_cause(), Some(StopCause::Cancelled));
    }

    #[test]
    fn irrelevant_events_do_not_move_state() {
        assert_eq!(Running.on(GraceElapsed), Running);
        assert_eq!(
            Terminating(StopCause::Timeout).on(CancelRequested),
            Terminating(StopCause::Timeout)
        );
        assert_eq!(Completed.on(DeadlineElapsed), Completed);
        assert_eq!(
            Killed(StopCause::Timeout).on(ProcessExited),
            Killed(StopCause::Timeout)
        );
    }

    #[test]
    fn killing_never_goes_back_to_terminating() {
        let s = Killing(StopCause::Timeout);
        assert_eq!(s.on(DeadlineElapsed), s);
        assert_eq!(s.on(GraceElapsed), s);
    }
}
