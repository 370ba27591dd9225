use serde::{Deserialize, Serialize};

use crate::engine::finite_or_zero;
use crate::engine::recurring::RecurringMetrics;
use crate::initiative::RecurringInitiative;
use crate::settings::CalculationSettings;

/// Economic impact of pushing an initiative back by `delay_weeks`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DelayScenario {
    pub delay_weeks: f64,
    /// Recurring value missed while waiting.
    pub lost_weekly_value: f64,
    /// Present value lost on the one-time benefit.
    pub npv_loss: f64,
    pub total_cost_of_delay: f64,
}

pub fn lost_weekly_value(cost_of_delay_per_week: f64, delay_weeks: f64) -> f64 {
    cost_of_delay_per_week * delay_weeks
}

/// `value * (1 - 1/(1+rate)^weeks)`, or 0 without a positive value and delay.
pub fn npv_loss(one_time_value: f64, weekly_rate: f64, delay_weeks: f64) -> f64 {
    if one_time_value <= 0.0 || delay_weeks <= 0.0 {
        return 0.0;
    }
    let base = 1.0 + weekly_rate;
    if base <= 0.0 {
        return 0.0;
    }
    let retained = 1.0 / base.powf(delay_weeks);
    finite_or_zero(one_time_value * (1.0 - retained))
}

pub fn total_cost_of_delay(lost_weekly_value: f64, npv_loss: f64) -> f64 {
    lost_weekly_value + npv_loss
}

pub fn project_delay(
    one_time_value: f64,
    metrics: &RecurringMetrics,
    weekly_rate: f64,
    delay_weeks: f64,
) -> DelayScenario {
    let lost = finite_or_zero(lost_weekly_value(metrics.cost_of_delay_per_week, delay_weeks));
    let npv = npv_loss(one_time_value, weekly_rate, delay_weeks);
    DelayScenario {
        delay_weeks,
        lost_weekly_value: lost,
        npv_loss: npv,
        total_cost_of_delay: total_cost_of_delay(lost, npv),
    }
}

/// One scenario per configured delay, in configured order.
pub fn project_delay_scenarios(
    initiative: &RecurringInitiative,
    metrics: &RecurringMetrics,
    settings: &CalculationSettings,
) -> Vec<DelayScenario> {
    let weekly_rate = settings.weekly_decay_rate();
    settings
        .delay_scenarios
        .iter()
        .map(|weeks| project_delay(initiative.one_time_value, metrics, weekly_rate, *weeks))
        .collect()
}

pub fn sorted_for_display(scenarios: &[DelayScenario]) -> Vec<DelayScenario> {
    let mut sorted = scenarios.to_vec();
    sorted.sort_by(|a, b| a.delay_weeks.total_cmp(&b.delay_weeks));
    sorted
}
