//! Action lifecycle state machine.

use tracing::debug;

/// Phase of a single create-market or trade action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Validating,
    AwaitingSignature,
    AwaitingConfirmation,
    Confirmed,
    /// Outcome unknown; the user should check their wallet or an explorer.
    ConfirmationTimedOut,
    Cancelled,
    Failed,
}

impl FlowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::ConfirmationTimedOut | Self::Cancelled | Self::Failed
        )
    }

    /// Whether `next` is a legal successor of this phase.
    pub fn can_advance_to(&self, next: FlowPhase) -> bool {
        use FlowPhase::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, AwaitingSignature | Failed)
                | (AwaitingSignature, AwaitingConfirmation | Confirmed | Failed)
                | (
                    AwaitingConfirmation,
                    Confirmed | ConfirmationTimedOut | Cancelled | Failed
                )
        )
    }
}

impl std::fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Validating => write!(f, "Validating"),
            Self::AwaitingSignature => write!(f, "Awaiting signature"),
            Self::AwaitingConfirmation => write!(f, "Awaiting confirmation"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::ConfirmationTimedOut => write!(f, "Confirmation timed out"),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Tracks the phase of one action and the path it took.
#[derive(Debug, Clone)]
pub struct FlowState {
    phase: FlowPhase,
    trail: Vec<FlowPhase>,
}

impl FlowState {
    pub fn new() -> Self {
        Self {
            phase: FlowPhase::Idle,
            trail: vec![FlowPhase::Idle],
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    /// Every phase visited, starting with `Idle`.
    pub fn trail(&self) -> &[FlowPhase] {
        &self.trail
    }

    pub fn visited(&self, phase: FlowPhase) -> bool {
        self.trail.contains(&phase)
    }

    /// Move to `next`. Illegal transitions are ignored.
    pub fn advance(&mut self, next: FlowPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            debug!("Ignoring transition {} -> {}", self.phase, next);
            return false;
        }
        debug!("Flow phase {} -> {}", self.phase, next);
        self.phase = next;
        self.trail.push(next);
        true
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_happy_path() {
        let mut state = FlowState::new();
        assert!(state.advance(FlowPhase::Validating));
        assert!(state.advance(FlowPhase::AwaitingSignature));
        assert!(state.advance(FlowPhase::AwaitingConfirmation));
        assert!(state.advance(FlowPhase::Confirmed));

        assert!(state.phase().is_terminal());
        assert_eq!(
            state.trail(),
            &[
                FlowPhase::Idle,
                FlowPhase::Validating,
                FlowPhase::AwaitingSignature,
                FlowPhase::AwaitingConfirmation,
                FlowPhase::Confirmed,
            ]
        );
    }

    #[test]
    fn test_terminal_phases_are_final() {
        let mut state = FlowState::new();
        state.advance(FlowPhase::Validating);
        state.advance(FlowPhase::Failed);

        assert!(!state.advance(FlowPhase::AwaitingSignature));
        assert_eq!(state.phase(), FlowPhase::Failed);
    }

    #[test]
    fn test_confirmation_requires_signature() {
        assert!(!FlowPhase::Validating.can_advance_to(FlowPhase::AwaitingConfirmation));
        assert!(!FlowPhase::Idle.can_advance_to(FlowPhase::Confirmed));
        assert!(FlowPhase::AwaitingSignature.can_advance_to(FlowPhase::Confirmed));
        assert!(!FlowPhase::AwaitingSignature.can_advance_to(FlowPhase::ConfirmationTimedOut));
    }
}
