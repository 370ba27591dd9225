pub mod portfolio;

use std::fmt::{Display, Formatter};

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use portfolio::{Portfolio, PortfolioError};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 7;

/// Short in-session identifier for an initiative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct InitiativeId(String);

impl InitiativeId {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let token = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
            .collect::<String>();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InitiativeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InitiativeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for InitiativeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Records stored in a [`Portfolio`] expose a stable id and a display name.
pub trait Identified {
    fn id(&self) -> &InitiativeId;
    fn name(&self) -> &str;
}

/// Work item with a one-time value, used by the simple CoD/CD3 engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Initiative {
    id: InitiativeId,
    pub name: String,
    pub effort_weeks: f64,
    pub value_dollars: f64,
}

impl Initiative {
    pub fn new(
        id: InitiativeId,
        name: impl Into<String>,
        effort_weeks: f64,
        value_dollars: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            effort_weeks,
            value_dollars,
        }
    }

    /// Blank entry as created by "add initiative".
    pub fn placeholder(id: InitiativeId, position: usize) -> Self {
        Self::new(id, format!("Initiative {position}"), 4.0, 0.0)
    }
}

impl Identified for Initiative {
    fn id(&self) -> &InitiativeId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Work item with recurring weekly value and risk, used by the recurring-delay engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringInitiative {
    id: InitiativeId,
    pub name: String,
    /// Weeks.
    pub estimated_effort: f64,
    /// Percentage, 0-100.
    pub probability_of_success: f64,
    /// $/week gained once delivered.
    pub recurring_value: f64,
    /// $/week penalty avoided once delivered.
    pub recurring_penalty: f64,
    pub one_time_value: f64,
}

impl RecurringInitiative {
    pub fn new(id: InitiativeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            estimated_effort: 4.0,
            probability_of_success: 80.0,
            recurring_value: 0.0,
            recurring_penalty: 0.0,
            one_time_value: 0.0,
        }
    }

    /// Simplified record shape: a single weekly impact and a one-off benefit.
    pub fn from_weekly_impact(
        id: InitiativeId,
        name: impl Into<String>,
        weekly_impact: f64,
        probability_of_success: f64,
        one_off_benefit: f64,
    ) -> Self {
        Self::new(id, name)
            .with_probability(probability_of_success)
            .with_recurring(weekly_impact, 0.0)
            .with_one_time_value(one_off_benefit)
    }

    pub fn placeholder(id: InitiativeId, position: usize) -> Self {
        Self::new(id, format!("Initiative {position}"))
    }

    pub fn with_effort(mut self, weeks: f64) -> Self {
        self.estimated_effort = weeks;
        self
    }

    pub fn with_probability(mut self, percent: f64) -> Self {
        self.probability_of_success = percent;
        self
    }

    pub fn with_recurring(mut self, value: f64, penalty: f64) -> Self {
        self.recurring_value = value;
        self.recurring_penalty = penalty;
        self
    }

    pub fn with_one_time_value(mut self, value: f64) -> Self {
        self.one_time_value = value;
        self
    }
}

impl Identified for RecurringInitiative {
    fn id(&self) -> &InitiativeId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn default_initiatives() -> Vec<Initiative> {
    vec![
        Initiative::new(InitiativeId::generate(), "A", 4.0, 1500.0),
        Initiative::new(InitiativeId::generate(), "B", 2.0, 2000.0),
        Initiative::new(InitiativeId::generate(), "C", 10.0, 8500.0),
        Initiative::new(InitiativeId::generate(), "D", 8.0, 6000.0),
    ]
}

pub fn default_recurring_initiatives() -> Vec<RecurringInitiative> {
    vec![
        RecurringInitiative::new(InitiativeId::generate(), "A")
            .with_effort(4.0)
            .with_probability(80.0)
            .with_recurring(1000.0, 500.0)
            .with_one_time_value(10_000.0),
        RecurringInitiative::new(InitiativeId::generate(), "B")
            .with_effort(2.0)
            .with_probability(90.0)
            .with_recurring(5000.0, 0.0)
            .with_one_time_value(2000.0),
        RecurringInitiative::new(InitiativeId::generate(), "C")
            .with_effort(10.0)
            .with_probability(50.0)
            .with_recurring(4500.0, 0.0)
            .with_one_time_value(25_000.0),
        RecurringInitiative::new(InitiativeId::generate(), "D")
            .with_effort(8.0)
            .with_probability(70.0)
            .with_recurring(0.0, 10_000.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::{InitiativeId, RecurringInitiative, ID_LEN};

    #[test]
    fn generated_ids_are_short_base36_tokens() {
        let id = InitiativeId::generate();
        assert_eq!(id.as_str().len(), ID_LEN);
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn weekly_impact_shape_maps_to_recurring_value() {
        let item = RecurringInitiative::from_weekly_impact(
            InitiativeId::from("x"),
            "X",
            10_000.0,
            80.0,
            50_000.0,
        );
        assert_eq!(item.recurring_value, 10_000.0);
        assert_eq!(item.recurring_penalty, 0.0);
        assert_eq!(item.one_time_value, 50_000.0);
        assert_eq!(item.probability_of_success, 80.0);
    }
}
