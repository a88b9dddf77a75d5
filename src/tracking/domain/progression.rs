//! Mutable progression state owned by one tracking session.

use super::OrderStage;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Result of asking the progression to move one step.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TickOutcome {
    /// The stage moved forward by exactly one step.
    Advanced {
        /// Stage before the tick.
        from: OrderStage,
        /// Stage after the tick.
        to: OrderStage,
    },
    /// The stage was already terminal and did not change.
    AtTerminal,
    /// The session has ended; the tick was ignored.
    Stopped,
}

impl TickOutcome {
    /// Returns `true` when the tick changed the current stage.
    #[must_use]
    pub const fn is_advanced(self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// Current stage of a tracked order together with its last change time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    stage: OrderStage,
    updated_at: DateTime<Utc>,
}

impl ProgressionState {
    /// Creates a progression positioned at `start`.
    #[must_use]
    pub fn new(start: OrderStage, clock: &impl Clock) -> Self {
        Self {
            stage: start,
            updated_at: clock.utc(),
        }
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn stage(&self) -> OrderStage {
        self.stage
    }

    /// Returns the position of the current stage in the lifecycle.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.stage.index()
    }

    /// Returns the time of the last stage change.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` once the terminal stage has been reached.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }

    /// Moves to the next stage in the lifecycle.
    ///
    /// At the terminal stage nothing changes and
    /// [`TickOutcome::AtTerminal`] is returned.
    pub fn advance(&mut self, clock: &impl Clock) -> TickOutcome {
        let from = self.stage;
        match from.next() {
            Some(to) => {
                self.stage = to;
                self.touch(clock);
                TickOutcome::Advanced { from, to }
            }
            None => TickOutcome::AtTerminal,
        }
    }

    /// Repositions the progression at `stage`.
    pub fn reset(&mut self, stage: OrderStage, clock: &impl Clock) {
        self.stage = stage;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
