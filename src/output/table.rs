use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::engine::ranking::sorted_by_cost;
use crate::engine::{RankedRecurring, ScenarioResult};
use crate::initiative::{Identified, Initiative};
use crate::output::format::{currency_or_dash, format_currency, format_number, format_percent};
use crate::report::{DelayProjection, MetricsRow, SettingsSummary};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_metrics_table(rows: &[MetricsRow], currency: &str) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Initiative",
        "Effort (weeks)",
        "Value",
        "Cost of Delay",
        "CD3",
    ]);
    for row in rows {
        table.add_row(vec![
            row.rank.to_string(),
            display_name(&row.initiative.name),
            format_number(row.initiative.effort_weeks, 1),
            format_currency(row.initiative.value_dollars, currency),
            format!(
                "{}/week",
                format_currency(row.metrics.cost_of_delay, currency)
            ),
            format_number(row.metrics.cd3, 0),
        ]);
    }
    table.to_string()
}

/// Strategies cheapest first; the best one highlighted.
pub fn render_scenarios_table(
    results: &[ScenarioResult],
    initiatives: &[Initiative],
    currency: &str,
) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Strategy",
        "Total Cost of Delay",
        "vs Best",
        "Total Duration",
        "Delivery Order",
    ]);
    let best_cost = results
        .iter()
        .find(|r| r.is_best)
        .map(|r| r.total_cost_of_delay)
        .unwrap_or(0.0);

    for result in sorted_by_cost(results) {
        let order = result
            .order
            .iter()
            .map(|id| {
                initiatives
                    .iter()
                    .find(|i| i.id() == id)
                    .map(|i| display_name(&i.name))
                    .unwrap_or_else(|| id.to_string())
            })
            .collect::<Vec<_>>()
            .join(" -> ");
        let name_cell = if result.is_best {
            Cell::new(format!("{} (best)", result.name)).fg(Color::Green)
        } else {
            Cell::new(&result.name)
        };
        let delta = if result.is_best {
            "-".to_string()
        } else {
            let difference = result.total_cost_of_delay - best_cost;
            format!(
                "+{} (+{})",
                format_currency(difference, currency),
                format_percent(percent_of(difference, best_cost), 1)
            )
        };
        table.add_row(Row::from(vec![
            name_cell,
            Cell::new(format_currency(result.total_cost_of_delay, currency)),
            Cell::new(delta),
            Cell::new(format!("{} weeks", format_number(result.total_duration, 1))),
            Cell::new(order),
        ]));
    }
    table.to_string()
}

pub fn render_recurring_table(rows: &[RankedRecurring], currency: &str) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Rank",
        "Initiative",
        "Effort",
        "Probability",
        "Recurring Value",
        "Recurring Penalty",
        "One-Time Value",
        "Cost of Delay",
        "One-Time NPV",
        "CD3",
    ]);
    for row in rows {
        let i = &row.initiative;
        table.add_row(vec![
            row.rank.to_string(),
            display_name(&i.name),
            format!("{} weeks", format_number(i.estimated_effort, 1)),
            format_percent(i.probability_of_success, 0),
            currency_or_dash(i.recurring_value, currency),
            currency_or_dash(i.recurring_penalty, currency),
            currency_or_dash(i.one_time_value, currency),
            format!(
                "{}/week",
                format_currency(row.metrics.cost_of_delay_per_week, currency)
            ),
            currency_or_dash(row.metrics.one_time_benefit_npv, currency),
            format_number(row.metrics.cd3_value, 1),
        ]);
    }
    table.to_string()
}

pub fn render_delay_table(projection: &DelayProjection, currency: &str) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Delay Period",
        "Lost Weekly Value",
        "NPV Loss",
        "Total Cost of Delay",
    ]);
    for scenario in &projection.scenarios {
        table.add_row(vec![
            format!("{} weeks", format_number(scenario.delay_weeks, 0)),
            format_currency(scenario.lost_weekly_value, currency),
            currency_or_dash(scenario.npv_loss, currency),
            format_currency(scenario.total_cost_of_delay, currency),
        ]);
    }
    format!(
        "{}  (cost of delay {}/week)\n{}",
        display_name(&projection.initiative.name),
        format_currency(projection.metrics.cost_of_delay_per_week, currency),
        table
    )
}

pub fn render_settings_summary(settings: &SettingsSummary) -> String {
    let delays = settings
        .delay_scenarios
        .iter()
        .map(|d| format_number(*d, 0))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Horizon: {} weeks | Annual decay: {} | Weekly decay: {} ({}) | Delays: {} weeks",
        format_number(settings.analysis_horizon_weeks, 0),
        format_percent(settings.annual_decay_rate, 1),
        format_percent(settings.weekly_decay_rate * 100.0, 4),
        settings.discount_model,
        delays
    )
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        "Untitled Initiative".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        percent_of, render_delay_table, render_scenarios_table, render_settings_summary,
    };
    use crate::engine::calculate_scenarios;
    use crate::initiative::{Initiative, InitiativeId, RecurringInitiative};
    use crate::report::{delay_projection, SettingsSummary};
    use crate::settings::CalculationSettings;

    #[test]
    fn scenario_table_lists_names_in_delivery_order() {
        let items = vec![
            Initiative::new(InitiativeId::from("a"), "Alpha", 4.0, 1500.0),
            Initiative::new(InitiativeId::from("b"), "Beta", 2.0, 2000.0),
        ];
        let rendered = render_scenarios_table(&calculate_scenarios(&items), &items, "$");
        assert!(rendered.contains("(best)"));
        assert!(rendered.contains("Beta"));
        assert!(rendered.contains("Alpha"));
        assert!(rendered.contains("$18,000"));
        assert!(rendered.contains("+$5,000 (+38.5%)"));
    }

    #[test]
    fn gap_percentage_is_zero_when_best_costs_nothing() {
        assert_eq!(percent_of(500.0, 0.0), 0.0);
        assert!((percent_of(5_000.0, 13_000.0) - 38.461_538).abs() < 1e-5);
    }

    #[test]
    fn delay_table_shows_each_period() {
        let initiative = RecurringInitiative::new(InitiativeId::from("r"), "Reporting")
            .with_recurring(1000.0, 0.0)
            .with_probability(100.0);
        let settings = CalculationSettings::default();
        let rendered = render_delay_table(&delay_projection(&initiative, &settings), "$");
        assert!(rendered.starts_with("Reporting  (cost of delay $1,000/week)"));
        assert!(rendered.contains("4 weeks"));
        assert!(rendered.contains("$12,000"));
    }

    #[test]
    fn settings_summary_mentions_model() {
        let summary = SettingsSummary::from(&CalculationSettings::default());
        let rendered = render_settings_summary(&summary);
        assert!(rendered.contains("compounding"));
        assert!(rendered.contains("Annual decay: 10.0%"));
    }
}
