//! Pure Cost of Delay calculations. Every function here is total: division by
//! zero and non-finite intermediate results collapse to `0.0`.

pub mod delay;
pub mod ranking;
pub mod recurring;
pub mod simple;

use serde::{Deserialize, Serialize};

pub use delay::{project_delay_scenarios, sorted_for_display, DelayScenario};
pub use ranking::{calculate_scenarios, select_strategies, ScenarioResult, Strategy};
pub use recurring::{rank_by_cd3, recurring_metrics, RankedRecurring, RecurringMetrics};
pub use simple::{cd3, cost_of_delay, initiative_metrics};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InitiativeMetrics {
    /// $/week
    pub cost_of_delay: f64,
    pub cd3: f64,
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub(crate) fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}
