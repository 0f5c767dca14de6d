//! Per-card phase state machine.
//!
//! One machine drives one drawn card through its lifecycle:
//!
//! ```text
//! Waiting --begin--> Countdown(3) --tick--> Countdown(2) --tick--> Countdown(1)
//!     --tick--> Active(0) --tick/complete/skip--> Completed
//! ```
//!
//! Time only moves when the caller feeds a tick, so the machine is driven
//! identically by a wall clock or by a test.

use crate::{CardType, Error, ExerciseTarget, PhaseState, Result};

/// Countdown value entered on `begin()`
pub const COUNTDOWN_START: u8 = 3;

/// How the Active phase ends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionMode {
    /// Ticks advance `elapsed`; completes on its own at `duration`
    Timed { duration: u32 },
    /// Only an explicit `complete()` ends the phase
    Manual,
}

/// Phase state machine bound to a single card's target
#[derive(Clone, Debug)]
pub struct ExercisePhaseMachine {
    target: ExerciseTarget,
    card_type: CardType,
    state: PhaseState,
}

impl ExercisePhaseMachine {
    pub fn new(target: ExerciseTarget, card_type: CardType) -> Self {
        Self {
            target,
            card_type,
            state: PhaseState::Waiting,
        }
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn target(&self) -> ExerciseTarget {
        self.target
    }

    pub fn is_completed(&self) -> bool {
        self.state == PhaseState::Completed
    }

    /// Cards without physical execution never run on the clock
    pub fn completion_mode(&self) -> CompletionMode {
        match self.target {
            ExerciseTarget::Duration(duration) if self.card_type.requires_execution() => {
                CompletionMode::Timed { duration }
            }
            _ => CompletionMode::Manual,
        }
    }

    /// Start the card
    ///
    /// Exercise and warmup cards enter the countdown. Utility and power cards
    /// skip straight to Active and wait for external resolution.
    pub fn begin(&mut self) -> Result<PhaseState> {
        if self.state != PhaseState::Waiting {
            return Err(self.illegal("begin"));
        }

        let next = if self.card_type.requires_execution() {
            PhaseState::Countdown {
                remaining: COUNTDOWN_START,
            }
        } else {
            PhaseState::Active { elapsed: 0 }
        };
        Ok(self.transition(next))
    }

    /// Advance one second
    ///
    /// Ticks in Waiting or Completed are no-ops. A tick on a manually
    /// completed Active phase is reported as an illegal transition and
    /// leaves the state untouched.
    pub fn tick(&mut self) -> Result<PhaseState> {
        let next = match self.state {
            PhaseState::Waiting | PhaseState::Completed => return Ok(self.state),
            PhaseState::Countdown { remaining } if remaining <= 1 => {
                PhaseState::Active { elapsed: 0 }
            }
            PhaseState::Countdown { remaining } => PhaseState::Countdown {
                remaining: remaining - 1,
            },
            PhaseState::Active { elapsed } => match self.completion_mode() {
                CompletionMode::Timed { duration } => {
                    let elapsed = elapsed.saturating_add(1);
                    if elapsed >= duration {
                        PhaseState::Completed
                    } else {
                        PhaseState::Active { elapsed }
                    }
                }
                CompletionMode::Manual => return Err(self.illegal("tick")),
            },
        };

        Ok(self.transition(next))
    }

    /// Player reports the exercise as done
    pub fn complete(&mut self) -> Result<PhaseState> {
        match self.state {
            PhaseState::Active { .. } => Ok(self.transition(PhaseState::Completed)),
            _ => Err(self.illegal("complete")),
        }
    }

    /// Force completion, bypassing remaining time
    ///
    /// `authorized` comes from the caller's authorization collaborator.
    /// Without it the state is left unchanged.
    pub fn skip(&mut self, authorized: bool) -> Result<PhaseState> {
        if !authorized {
            tracing::warn!("Unauthorized skip attempt while {}", self.state);
            return Err(Error::UnauthorizedSkip);
        }

        match self.state {
            PhaseState::Countdown { .. } | PhaseState::Active { .. } => {
                tracing::info!("Skipping card while {}", self.state);
                Ok(self.transition(PhaseState::Completed))
            }
            _ => Err(self.illegal("skip")),
        }
    }

    /// Return to Waiting so the card can be redone
    pub fn reset(&mut self) -> Result<PhaseState> {
        match self.state {
            PhaseState::Waiting | PhaseState::Completed => {
                Ok(self.transition(PhaseState::Waiting))
            }
            _ => Err(self.illegal("reset")),
        }
    }

    /// Fraction of a timed target already done, for progress bars
    pub fn progress(&self) -> Option<f64> {
        match (self.state, self.completion_mode()) {
            (PhaseState::Completed, _) => Some(1.0),
            (PhaseState::Active { elapsed }, CompletionMode::Timed { duration }) => {
                Some(elapsed as f64 / duration as f64)
            }
            (_, CompletionMode::Timed { .. }) => Some(0.0),
            (_, CompletionMode::Manual) => None,
        }
    }

    /// Seconds left on a timed Active phase
    pub fn remaining_seconds(&self) -> Option<u32> {
        match (self.state, self.completion_mode()) {
            (PhaseState::Active { elapsed }, CompletionMode::Timed { duration }) => {
                Some(duration.saturating_sub(elapsed))
            }
            _ => None,
        }
    }

    fn transition(&mut self, next: PhaseState) -> PhaseState {
        if next != self.state {
            tracing::debug!("Phase {} -> {}", self.state, next);
        }
        self.state = next;
        next
    }

    fn illegal(&self, operation: &'static str) -> Error {
        tracing::debug!("Ignoring {} while {}", operation, self.state);
        Error::IllegalTransition {
            operation,
            state: self.state,
        }
    }
}
