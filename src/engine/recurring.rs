use serde::{Deserialize, Serialize};

use crate::engine::{finite_or_zero, safe_divide};
use crate::initiative::RecurringInitiative;
use crate::settings::{CalculationSettings, DiscountModel};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RecurringMetrics {
    /// recurring value + recurring penalty, $/week
    pub net_weekly_impact: f64,
    /// net impact weighted by probability of success, $/week
    pub expected_weekly_impact: f64,
    pub cost_of_delay_per_week: f64,
    pub one_time_benefit_npv: f64,
    pub cd3_value: f64,
}

pub fn net_weekly_impact(initiative: &RecurringInitiative) -> f64 {
    initiative.recurring_value + initiative.recurring_penalty
}

pub fn expected_weekly_impact(net_weekly_impact: f64, probability_of_success: f64) -> f64 {
    net_weekly_impact * (probability_of_success / 100.0)
}

/// Kept distinct from the expected impact even though the two are equal today.
pub fn cost_of_delay_per_week(expected_weekly_impact: f64) -> f64 {
    expected_weekly_impact
}

pub fn weekly_decay_rate(annual_decay_rate: f64, model: DiscountModel) -> f64 {
    model.weekly_rate(annual_decay_rate)
}

/// Present value of `value` received `weeks` from now.
pub fn discount(value: f64, weekly_rate: f64, weeks: f64) -> f64 {
    if value == 0.0 {
        return 0.0;
    }
    if weeks == 0.0 {
        return value;
    }
    let base = 1.0 + weekly_rate;
    if base <= 0.0 {
        return 0.0;
    }
    finite_or_zero(value / base.powf(weeks))
}

pub fn one_time_benefit_npv(one_time_value: f64, settings: &CalculationSettings) -> f64 {
    discount(
        one_time_value,
        settings.weekly_decay_rate(),
        settings.benefit_delivery_weeks(),
    )
}

pub fn recurring_cd3(cost_of_delay_per_week: f64, estimated_effort: f64) -> f64 {
    safe_divide(cost_of_delay_per_week, estimated_effort)
}

pub fn recurring_metrics(
    initiative: &RecurringInitiative,
    settings: &CalculationSettings,
) -> RecurringMetrics {
    let net = net_weekly_impact(initiative);
    let expected = expected_weekly_impact(net, initiative.probability_of_success);
    let cod = cost_of_delay_per_week(expected);
    RecurringMetrics {
        net_weekly_impact: finite_or_zero(net),
        expected_weekly_impact: finite_or_zero(expected),
        cost_of_delay_per_week: finite_or_zero(cod),
        one_time_benefit_npv: one_time_benefit_npv(initiative.one_time_value, settings),
        cd3_value: recurring_cd3(cod, initiative.estimated_effort),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedRecurring {
    pub rank: usize,
    pub initiative: RecurringInitiative,
    pub metrics: RecurringMetrics,
}

/// Initiatives with their metrics, highest CD3 first. Ties keep input order.
pub fn rank_by_cd3(
    initiatives: &[RecurringInitiative],
    settings: &CalculationSettings,
) -> Vec<RankedRecurring> {
    let mut rows: Vec<(RecurringInitiative, RecurringMetrics)> = initiatives
        .iter()
        .map(|i| (i.clone(), recurring_metrics(i, settings)))
        .collect();
    rows.sort_by(|a, b| b.1.cd3_value.total_cmp(&a.1.cd3_value));
    rows.into_iter()
        .enumerate()
        .map(|(idx, (initiative, metrics))| RankedRecurring {
            rank: idx + 1,
            initiative,
            metrics,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{discount, rank_by_cd3, recurring_metrics};
    use crate::initiative::{default_recurring_initiatives, InitiativeId, RecurringInitiative};
    use crate::settings::{BenefitTiming, CalculationSettings, DiscountModel};

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn weekly_impact_at_eighty_percent() {
        let initiative = RecurringInitiative::from_weekly_impact(
            InitiativeId::from("x"),
            "X",
            10_000.0,
            80.0,
            50_000.0,
        );
        let settings = CalculationSettings::default()
            .with_annual_decay_rate(5.0)
            .with_discount_model(DiscountModel::Linear)
            .with_benefit_timing(BenefitTiming::Immediate);
        let metrics = recurring_metrics(&initiative, &settings);
        assert_eq!(metrics.net_weekly_impact, 10_000.0);
        assert_eq!(metrics.expected_weekly_impact, 8000.0);
        assert_eq!(metrics.cost_of_delay_per_week, 8000.0);
        assert_eq!(metrics.one_time_benefit_npv, 50_000.0);
        assert_eq!(metrics.cd3_value, 2000.0);
    }

    #[test]
    fn full_record_chain_uses_horizon_midpoint() {
        let initiative = RecurringInitiative::new(InitiativeId::from("a"), "A")
            .with_effort(4.0)
            .with_probability(80.0)
            .with_recurring(1000.0, 500.0)
            .with_one_time_value(10_000.0);
        let settings = CalculationSettings::default();
        let metrics = recurring_metrics(&initiative, &settings);
        assert_eq!(metrics.net_weekly_impact, 1500.0);
        assert!(close(metrics.expected_weekly_impact, 1200.0, 1e-9));
        assert!(close(metrics.cd3_value, 300.0, 1e-9));

        // 26 weeks at 10%/yr compounded is half a year: 10000 / 1.1^0.5
        let expected_npv = 10_000.0 / 1.1f64.sqrt();
        assert!(close(metrics.one_time_benefit_npv, expected_npv, 1e-6));
    }

    #[test]
    fn zero_value_and_zero_effort_fail_soft() {
        assert_eq!(discount(0.0, 0.01, 26.0), 0.0);
        assert_eq!(discount(500.0, 0.01, 0.0), 500.0);
        assert_eq!(discount(500.0, -2.0, 4.0), 0.0);

        let initiative = RecurringInitiative::new(InitiativeId::from("z"), "Z")
            .with_effort(0.0)
            .with_recurring(1000.0, 0.0);
        let metrics = recurring_metrics(&initiative, &CalculationSettings::default());
        assert_eq!(metrics.cd3_value, 0.0);
        assert_eq!(metrics.one_time_benefit_npv, 0.0);
    }

    #[test]
    fn ranks_defaults_by_cd3() {
        let ranked = rank_by_cd3(
            &default_recurring_initiatives(),
            &CalculationSettings::default(),
        );
        let names: Vec<&str> = ranked.iter().map(|r| r.initiative.name.as_str()).collect();
        // B: 4500/2, D: 7000/8, A: 1200/4, C: 2250/10
        assert_eq!(names, vec!["B", "D", "A", "C"]);
        assert_eq!(ranked[0].rank, 1);
        assert!(close(ranked[0].metrics.cd3_value, 2250.0, 1e-9));
    }
}
