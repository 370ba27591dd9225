use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{
    calculate_scenarios, initiative_metrics, project_delay_scenarios, rank_by_cd3,
    recurring_metrics, sorted_for_display, DelayScenario, InitiativeMetrics, RankedRecurring,
    RecurringMetrics, ScenarioResult,
};
use crate::initiative::{Initiative, Portfolio, RecurringInitiative};
use crate::settings::{BenefitTiming, CalculationSettings, DiscountModel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRow {
    /// 1-based, highest CD3 first.
    pub rank: usize,
    pub initiative: Initiative,
    pub metrics: InitiativeMetrics,
}

/// Simple-engine view: per-initiative metrics plus strategy comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizationReport {
    pub generated_at: DateTime<Utc>,
    pub initiatives: Vec<MetricsRow>,
    pub scenarios: Vec<ScenarioResult>,
}

/// Settings as applied, with the derived weekly rate spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSummary {
    pub analysis_horizon_weeks: f64,
    pub annual_decay_rate: f64,
    pub weekly_decay_rate: f64,
    pub discount_model: DiscountModel,
    pub benefit_timing: BenefitTiming,
    pub delay_scenarios: Vec<f64>,
}

impl From<&CalculationSettings> for SettingsSummary {
    fn from(settings: &CalculationSettings) -> Self {
        Self {
            analysis_horizon_weeks: settings.analysis_horizon_weeks,
            annual_decay_rate: settings.annual_decay_rate,
            weekly_decay_rate: settings.weekly_decay_rate(),
            discount_model: settings.discount_model,
            benefit_timing: settings.benefit_timing,
            delay_scenarios: settings.delay_scenarios.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayProjection {
    pub initiative: RecurringInitiative,
    pub metrics: RecurringMetrics,
    /// Ascending by delay.
    pub scenarios: Vec<DelayScenario>,
}

/// Recurring-delay view: CD3-ranked summary and per-initiative delay projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringReport {
    pub generated_at: DateTime<Utc>,
    pub settings: SettingsSummary,
    pub summary: Vec<RankedRecurring>,
    pub projections: Vec<DelayProjection>,
}

/// Per-initiative metrics ranked by CD3, highest first. Ties keep input order.
pub fn metrics_rows(initiatives: &[Initiative]) -> Vec<MetricsRow> {
    let mut scored: Vec<(&Initiative, InitiativeMetrics)> = initiatives
        .iter()
        .map(|initiative| (initiative, initiative_metrics(initiative)))
        .collect();
    scored.sort_by(|a, b| b.1.cd3.total_cmp(&a.1.cd3));
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (initiative, metrics))| MetricsRow {
            rank: idx + 1,
            initiative: initiative.clone(),
            metrics,
        })
        .collect()
}

pub fn build_prioritization_report(portfolio: &Portfolio<Initiative>) -> PrioritizationReport {
    PrioritizationReport {
        generated_at: Utc::now(),
        initiatives: metrics_rows(portfolio.as_slice()),
        scenarios: calculate_scenarios(portfolio.as_slice()),
    }
}

pub fn delay_projection(
    initiative: &RecurringInitiative,
    settings: &CalculationSettings,
) -> DelayProjection {
    let metrics = recurring_metrics(initiative, settings);
    let scenarios = project_delay_scenarios(initiative, &metrics, settings);
    DelayProjection {
        initiative: initiative.clone(),
        metrics,
        scenarios: sorted_for_display(&scenarios),
    }
}

pub fn build_recurring_report(
    portfolio: &Portfolio<RecurringInitiative>,
    settings: &CalculationSettings,
) -> RecurringReport {
    RecurringReport {
        generated_at: Utc::now(),
        settings: SettingsSummary::from(settings),
        summary: rank_by_cd3(portfolio.as_slice(), settings),
        projections: portfolio
            .iter()
            .map(|initiative| delay_projection(initiative, settings))
            .collect(),
    }
}
