use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::initiative::{
    default_initiatives, default_recurring_initiatives, Identified, Initiative, InitiativeId,
    Portfolio, PortfolioError, RecurringInitiative,
};
use crate::input::{clamp_effort, clamp_non_negative, clamp_probability};

/// Both initiative lists, as loaded from a portfolio file.
#[derive(Debug, Clone)]
pub struct PortfolioSet {
    pub initiatives: Portfolio<Initiative>,
    pub recurring: Portfolio<RecurringInitiative>,
}

impl Default for PortfolioSet {
    fn default() -> Self {
        Self {
            initiatives: defaults_or_single(default_initiatives(), Initiative::placeholder),
            recurring: defaults_or_single(
                default_recurring_initiatives(),
                RecurringInitiative::placeholder,
            ),
        }
    }
}

fn defaults_or_single<T: Identified>(
    items: Vec<T>,
    fallback: fn(InitiativeId, usize) -> T,
) -> Portfolio<T> {
    Portfolio::from_items(items)
        .unwrap_or_else(|_| Portfolio::new(fallback(InitiativeId::generate(), 1)))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PortfolioDocument {
    #[serde(default)]
    initiatives: Vec<InitiativeEntry>,
    #[serde(default)]
    recurring: Vec<RecurringEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InitiativeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default = "default_effort")]
    effort_weeks: f64,
    #[serde(default)]
    value_dollars: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecurringEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default = "default_effort")]
    estimated_effort: f64,
    #[serde(default = "default_probability")]
    probability_of_success: f64,
    /// `weekly_impact` records carry no separate penalty.
    #[serde(default, alias = "weekly_impact")]
    recurring_value: f64,
    #[serde(default)]
    recurring_penalty: f64,
    #[serde(default, alias = "one_off_benefit")]
    one_time_value: f64,
}

fn default_effort() -> f64 {
    4.0
}

fn default_probability() -> f64 {
    80.0
}

pub fn load_portfolio_file(path: &Path) -> Result<PortfolioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading portfolio: {}", path.display()))?;
    parse_portfolio(&data)
        .with_context(|| format!("failed parsing portfolio: {}", path.display()))
}

pub fn parse_portfolio(data: &str) -> Result<PortfolioSet> {
    let document: PortfolioDocument = toml::from_str(data)?;
    let defaults = PortfolioSet::default();

    let initiatives = if document.initiatives.is_empty() {
        debug!("portfolio has no simple initiatives, using sample set");
        defaults.initiatives
    } else {
        collect_entries(document.initiatives, |entry, id, position| {
            Initiative::new(
                id,
                name_or_position(entry.name, position),
                clamp_effort(entry.effort_weeks),
                clamp_non_negative(entry.value_dollars),
            )
        })?
    };

    let recurring = if document.recurring.is_empty() {
        debug!("portfolio has no recurring initiatives, using sample set");
        defaults.recurring
    } else {
        collect_entries(document.recurring, |entry, id, position| {
            RecurringInitiative::new(id, name_or_position(entry.name, position))
                .with_effort(clamp_effort(entry.estimated_effort))
                .with_probability(clamp_probability(entry.probability_of_success))
                .with_recurring(
                    clamp_non_negative(entry.recurring_value),
                    clamp_non_negative(entry.recurring_penalty),
                )
                .with_one_time_value(clamp_non_negative(entry.one_time_value))
        })?
    };

    debug!(
        "loaded portfolio with {} initiatives and {} recurring initiatives",
        initiatives.len(),
        recurring.len()
    );
    Ok(PortfolioSet {
        initiatives,
        recurring,
    })
}

trait Entry {
    fn id(&self) -> Option<&str>;
}

impl Entry for InitiativeEntry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Entry for RecurringEntry {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Builds a portfolio in file order; entries without an id get a fresh one.
fn collect_entries<E: Entry, T: Identified>(
    entries: Vec<E>,
    build: impl Fn(E, InitiativeId, usize) -> T,
) -> Result<Portfolio<T>> {
    let mut iter = entries.into_iter();
    let Some(first) = iter.next() else {
        return Err(PortfolioError::Empty.into());
    };
    let first_id = entry_id(&first).unwrap_or_else(InitiativeId::generate);
    let mut portfolio = Portfolio::new(build(first, first_id, 1));
    for (idx, entry) in iter.enumerate() {
        let position = idx + 2;
        match entry_id(&entry) {
            Some(id) => {
                portfolio.add(build(entry, id, position))?;
            }
            None => {
                portfolio.add_with(|id, _| build(entry, id, position));
            }
        }
    }
    Ok(portfolio)
}

fn entry_id(entry: &impl Entry) -> Option<InitiativeId> {
    entry
        .id()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(InitiativeId::from)
}

fn name_or_position(name: String, position: usize) -> String {
    if name.trim().is_empty() {
        warn!("initiative {position} has no name");
        format!("Initiative {position}")
    } else {
        name
    }
}

/// TOML document describing `set`, suitable as a starting portfolio file.
pub fn portfolio_template(set: &PortfolioSet) -> Result<String> {
    let document = PortfolioDocument {
        initiatives: set
            .initiatives
            .iter()
            .map(|i| InitiativeEntry {
                id: None,
                name: i.name.clone(),
                effort_weeks: i.effort_weeks,
                value_dollars: i.value_dollars,
            })
            .collect(),
        recurring: set
            .recurring
            .iter()
            .map(|r| RecurringEntry {
                id: None,
                name: r.name.clone(),
                estimated_effort: r.estimated_effort,
                probability_of_success: r.probability_of_success,
                recurring_value: r.recurring_value,
                recurring_penalty: r.recurring_penalty,
                one_time_value: r.one_time_value,
            })
            .collect(),
    };
    Ok(toml::to_string_pretty(&document)?)
}

pub fn write_portfolio_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("failed creating portfolio directory: {}", parent.display())
        })?;
    }
    let body = portfolio_template(&PortfolioSet::default())?;
    fs::write(path, body)
        .with_context(|| format!("failed writing portfolio template: {}", path.display()))?;
    Ok(())
}
