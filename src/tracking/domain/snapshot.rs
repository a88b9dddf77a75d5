//! Read-model published to tracker renderers.

use super::{OrderRef, OrderStage, ProgressionState, STAGE_SEQUENCE, StageIcon};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const LAST_ORDINAL: u8 = OrderStage::Delivered.ordinal();

/// Rendering view of one lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    /// Stage tag for the step.
    pub stage: OrderStage,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Icon reference.
    pub icon: StageIcon,
    /// The order has moved past this step.
    pub is_completed: bool,
    /// The order is currently at this step.
    pub is_active: bool,
}

/// Immutable view of a progression, recomputed after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    order_ref: OrderRef,
    current_stage: OrderStage,
    step_index: usize,
    name: String,
    description: String,
    steps: Vec<StepView>,
    progress_fraction: f64,
    updated_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    /// Builds the snapshot for `state` as tracked under `order_ref`.
    #[must_use]
    pub fn capture(order_ref: &OrderRef, state: &ProgressionState) -> Self {
        let current = state.stage();
        let current_index = current.index();
        let descriptor = current.descriptor();
        let steps = STAGE_SEQUENCE
            .iter()
            .map(|step| StepView {
                stage: step.stage,
                name: step.name.to_owned(),
                description: step.description.to_owned(),
                icon: step.icon,
                is_completed: step.stage.index() < current_index,
                is_active: step.stage.index() == current_index,
            })
            .collect();

        Self {
            order_ref: order_ref.clone(),
            current_stage: current,
            step_index: current_index,
            name: descriptor.name.to_owned(),
            description: descriptor.description.to_owned(),
            steps,
            progress_fraction: progress_fraction(current),
            updated_at: state.updated_at(),
        }
    }

    /// Returns the tracked order reference.
    #[must_use]
    pub const fn order_ref(&self) -> &OrderRef {
        &self.order_ref
    }

    /// Returns the current stage.
    #[must_use]
    pub const fn current_stage(&self) -> OrderStage {
        self.current_stage
    }

    /// Returns the position of the current stage.
    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.step_index
    }

    /// Returns the display name of the current stage.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the current stage.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns one view per lifecycle step, in lifecycle order.
    #[must_use]
    pub fn steps(&self) -> &[StepView] {
        &self.steps
    }

    /// Returns the active step.
    #[must_use]
    pub fn active_step(&self) -> Option<&StepView> {
        self.steps.iter().find(|step| step.is_active)
    }

    /// Returns the completed fraction of the lifecycle in `0.0..=1.0`.
    #[must_use]
    pub const fn progress_fraction(&self) -> f64 {
        self.progress_fraction
    }

    /// Returns the completed share of the lifecycle as a rounded
    /// percentage.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.current_stage)
    }

    /// Returns the time of the last stage change.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `"{name} - {description}"` for status headers.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!("{} - {}", self.name, self.description)
    }

    /// Returns `true` once the order has been delivered.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.current_stage.is_terminal()
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "progress is reported as a fraction of the lifecycle"
)]
fn progress_fraction(stage: OrderStage) -> f64 {
    f64::from(stage.ordinal()) / f64::from(LAST_ORDINAL)
}

fn progress_percent(stage: OrderStage) -> u8 {
    let last = u16::from(LAST_ORDINAL);
    let scaled = u16::from(stage.ordinal()) * 100 + last.div_euclid(2);
    scaled
        .checked_div(last)
        .and_then(|percent| u8::try_from(percent).ok())
        .unwrap_or(100)
}
