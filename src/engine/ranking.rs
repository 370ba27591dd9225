use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::simple::{cd3, cost_of_delay};
use crate::initiative::{Identified, Initiative, InitiativeId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    NoPrioritization,
    ShortestDurationFirst,
    HighestValueFirst,
    HighestCd3First,
}

impl Strategy {
    /// Evaluation order; also decides ties for the best strategy.
    pub const ALL: [Strategy; 4] = [
        Strategy::NoPrioritization,
        Strategy::ShortestDurationFirst,
        Strategy::HighestValueFirst,
        Strategy::HighestCd3First,
    ];

    pub fn as_slug(&self) -> &'static str {
        match self {
            Self::NoPrioritization => "no-prioritization",
            Self::ShortestDurationFirst => "shortest-duration-first",
            Self::HighestValueFirst => "highest-value-first",
            Self::HighestCd3First => "highest-cd3-first",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NoPrioritization => "No Prioritization",
            Self::ShortestDurationFirst => "Shortest Duration First",
            Self::HighestValueFirst => "Highest Value First",
            Self::HighestCd3First => "Highest CD3 First",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Error)]
#[error("unknown strategy: {0}")]
pub struct StrategyParseError(pub String);

impl FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "no-prioritization" | "none" | "fifo" => Ok(Self::NoPrioritization),
            "shortest-duration-first" | "shortest" | "sjf" => Ok(Self::ShortestDurationFirst),
            "highest-value-first" | "value" => Ok(Self::HighestValueFirst),
            "highest-cd3-first" | "cd3" | "wsjf" => Ok(Self::HighestCd3First),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioResult {
    pub strategy: Strategy,
    pub name: String,
    pub total_cost_of_delay: f64,
    pub total_duration: f64,
    /// Initiative ids in delivery order.
    pub order: Vec<InitiativeId>,
    pub is_best: bool,
}

/// Delivery order for `strategy`. Ties keep their original relative order.
pub fn order_for(strategy: Strategy, initiatives: &[Initiative]) -> Vec<&Initiative> {
    let mut ordered: Vec<&Initiative> = initiatives.iter().collect();
    match strategy {
        Strategy::NoPrioritization => {}
        Strategy::ShortestDurationFirst => {
            ordered.sort_by(|a, b| a.effort_weeks.total_cmp(&b.effort_weeks))
        }
        Strategy::HighestValueFirst => {
            ordered.sort_by(|a, b| descending(a.value_dollars, b.value_dollars))
        }
        Strategy::HighestCd3First => ordered.sort_by(|a, b| descending(cd3(a), cd3(b))),
    }
    ordered
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Walks the delivery order charging each initiative's cost of delay for
/// every week until it completes.
pub fn evaluate_strategy(strategy: Strategy, initiatives: &[Initiative]) -> ScenarioResult {
    let ordered = order_for(strategy, initiatives);
    let mut cumulative_weeks = 0.0;
    let mut total_cost_of_delay = 0.0;
    for initiative in &ordered {
        cumulative_weeks += initiative.effort_weeks;
        total_cost_of_delay += cost_of_delay(initiative) * cumulative_weeks;
    }

    ScenarioResult {
        strategy,
        name: strategy.display_name().to_string(),
        total_cost_of_delay,
        total_duration: cumulative_weeks,
        order: ordered.iter().map(|i| i.id().clone()).collect(),
        is_best: false,
    }
}

/// All strategies in [`Strategy::ALL`] order with exactly one flagged best.
pub fn calculate_scenarios(initiatives: &[Initiative]) -> Vec<ScenarioResult> {
    let mut results: Vec<ScenarioResult> = Strategy::ALL
        .iter()
        .map(|strategy| evaluate_strategy(*strategy, initiatives))
        .collect();

    let mut best: Option<usize> = None;
    for (idx, result) in results.iter().enumerate() {
        let better = match best {
            Some(current) => result.total_cost_of_delay < results[current].total_cost_of_delay,
            None => true,
        };
        if better {
            best = Some(idx);
        }
    }
    if let Some(idx) = best {
        results[idx].is_best = true;
        debug!(
            "best strategy: {} ({:.2})",
            results[idx].name, results[idx].total_cost_of_delay
        );
    }
    results
}

/// Keeps the requested strategies plus the best one, which stays as the
/// comparison baseline. An empty selection keeps everything.
pub fn select_strategies(
    results: Vec<ScenarioResult>,
    wanted: &[Strategy],
) -> Vec<ScenarioResult> {
    if wanted.is_empty() {
        return results;
    }
    results
        .into_iter()
        .filter(|result| result.is_best || wanted.contains(&result.strategy))
        .collect()
}

/// Ascending by total cost of delay, for comparison display.
pub fn sorted_by_cost(results: &[ScenarioResult]) -> Vec<ScenarioResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by(|a, b| a.total_cost_of_delay.total_cmp(&b.total_cost_of_delay));
    sorted
}
