use anyhow::Result;

use crate::engine::{DelayScenario, RankedRecurring, ScenarioResult};
use crate::initiative::Identified;
use crate::report::{DelayProjection, MetricsRow};

pub fn metrics_to_csv(rows: &[MetricsRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "id",
        "name",
        "effort_weeks",
        "value_dollars",
        "cost_of_delay",
        "cd3",
    ])?;
    for row in rows {
        writer.write_record([
            row.rank.to_string(),
            row.initiative.id().to_string(),
            row.initiative.name.clone(),
            format!("{:.2}", row.initiative.effort_weeks),
            format!("{:.2}", row.initiative.value_dollars),
            format!("{:.2}", row.metrics.cost_of_delay),
            format!("{:.4}", row.metrics.cd3),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn scenarios_to_csv(results: &[ScenarioResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "strategy",
        "total_cost_of_delay",
        "total_duration",
        "order",
        "is_best",
    ])?;
    for result in results {
        writer.write_record([
            result.strategy.as_slug().to_string(),
            format!("{:.2}", result.total_cost_of_delay),
            format!("{:.2}", result.total_duration),
            result
                .order
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            result.is_best.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn recurring_to_csv(rows: &[RankedRecurring]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "rank",
        "id",
        "name",
        "estimated_effort",
        "probability_of_success",
        "net_weekly_impact",
        "cost_of_delay_per_week",
        "one_time_benefit_npv",
        "cd3",
    ])?;
    for row in rows {
        writer.write_record([
            row.rank.to_string(),
            row.initiative.id().to_string(),
            row.initiative.name.clone(),
            format!("{:.2}", row.initiative.estimated_effort),
            format!("{:.2}", row.initiative.probability_of_success),
            format!("{:.2}", row.metrics.net_weekly_impact),
            format!("{:.2}", row.metrics.cost_of_delay_per_week),
            format!("{:.2}", row.metrics.one_time_benefit_npv),
            format!("{:.4}", row.metrics.cd3_value),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn delays_to_csv(projections: &[DelayProjection]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "id",
        "name",
        "delay_weeks",
        "lost_weekly_value",
        "npv_loss",
        "total_cost_of_delay",
    ])?;
    for projection in projections {
        for scenario in &projection.scenarios {
            write_delay_row(&mut writer, projection, scenario)?;
        }
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

fn write_delay_row(
    writer: &mut csv::Writer<Vec<u8>>,
    projection: &DelayProjection,
    scenario: &DelayScenario,
) -> Result<()> {
    writer.write_record([
        projection.initiative.id().to_string(),
        projection.initiative.name.clone(),
        format!("{:.2}", scenario.delay_weeks),
        format!("{:.2}", scenario.lost_weekly_value),
        format!("{:.2}", scenario.npv_loss),
        format!("{:.2}", scenario.total_cost_of_delay),
    ])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{delays_to_csv, metrics_to_csv, scenarios_to_csv};
    use crate::engine::calculate_scenarios;
    use crate::initiative::{default_recurring_initiatives, Initiative, InitiativeId};
    use crate::report::{delay_projection, metrics_rows};
    use crate::settings::CalculationSettings;

    #[test]
    fn scenario_csv_has_header_and_one_row_per_strategy() {
        let items = vec![
            Initiative::new(InitiativeId::from("a"), "A", 4.0, 1500.0),
            Initiative::new(InitiativeId::from("b"), "B", 2.0, 2000.0),
        ];
        let csv = scenarios_to_csv(&calculate_scenarios(&items)).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("strategy,total_cost_of_delay"));
        assert_eq!(lines[1], "no-prioritization,18000.00,6.00,a b,false");
        assert_eq!(lines[2], "shortest-duration-first,13000.00,6.00,b a,true");
    }

    #[test]
    fn metrics_csv_lists_highest_cd3_first() {
        let items = vec![
            Initiative::new(InitiativeId::from("a"), "A", 4.0, 1500.0),
            Initiative::new(InitiativeId::from("b"), "B", 2.0, 2000.0),
        ];
        let csv = metrics_to_csv(&metrics_rows(&items)).expect("csv");
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "rank,id,name,effort_weeks,value_dollars,cost_of_delay,cd3");
        assert_eq!(lines[1], "1,b,B,2.00,2000.00,2000.00,1000.0000");
        assert_eq!(lines[2], "2,a,A,4.00,1500.00,1500.00,375.0000");
    }

    #[test]
    fn delay_csv_emits_row_per_scenario() {
        let settings = CalculationSettings::default();
        let projections: Vec<_> = default_recurring_initiatives()
            .iter()
            .map(|i| delay_projection(i, &settings))
            .collect();
        let csv = delays_to_csv(&projections).expect("csv");
        assert_eq!(csv.lines().count(), 1 + 4 * 3);
    }
}
