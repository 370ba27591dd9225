use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::initiative::{Identified, InitiativeId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortfolioError {
    #[error("portfolio must contain at least one initiative")]
    Empty,
    #[error("cannot remove {0}: a portfolio keeps at least one initiative")]
    LastInitiative(InitiativeId),
    #[error("unknown initiative: {0}")]
    NotFound(String),
    #[error("duplicate initiative id: {0}")]
    DuplicateId(InitiativeId),
}

/// Ordered collection of initiatives keyed by id. Never empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Portfolio<T> {
    items: Vec<T>,
}

impl<T: Identified> Portfolio<T> {
    pub fn new(first: T) -> Self {
        Self { items: vec![first] }
    }

    pub fn from_items(items: Vec<T>) -> Result<Self, PortfolioError> {
        if items.is_empty() {
            return Err(PortfolioError::Empty);
        }
        let mut seen = BTreeSet::new();
        for item in &items {
            if !seen.insert(item.id().clone()) {
                return Err(PortfolioError::DuplicateId(item.id().clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &InitiativeId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Looks an initiative up by exact id, then by case-insensitive name.
    pub fn find(&self, id_or_name: &str) -> Option<&T> {
        let needle = id_or_name.trim();
        self.items
            .iter()
            .find(|item| item.id().as_str() == needle)
            .or_else(|| {
                self.items
                    .iter()
                    .find(|item| item.name().eq_ignore_ascii_case(needle))
            })
    }

    pub fn contains(&self, id: &InitiativeId) -> bool {
        self.get(id).is_some()
    }

    /// Fresh id that no current item uses.
    pub fn next_id(&self) -> InitiativeId {
        loop {
            let candidate = InitiativeId::generate();
            if !self.contains(&candidate) {
                return candidate;
            }
        }
    }

    pub fn add(&mut self, item: T) -> Result<&T, PortfolioError> {
        if self.contains(item.id()) {
            return Err(PortfolioError::DuplicateId(item.id().clone()));
        }
        debug!("adding initiative {} ({})", item.name(), item.id());
        self.items.push(item);
        Ok(self.last())
    }

    /// Appends an item built from a fresh id and its 1-based position.
    pub fn add_with(&mut self, build: impl FnOnce(InitiativeId, usize) -> T) -> &T {
        let id = self.next_id();
        let item = build(id, self.items.len() + 1);
        self.items.push(item);
        self.last()
    }

    /// Applies `edit` to the matching item. The id cannot be changed through an edit.
    pub fn update(
        &mut self,
        id: &InitiativeId,
        edit: impl FnOnce(&mut T),
    ) -> Result<&T, PortfolioError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| PortfolioError::NotFound(id.to_string()))?;
        edit(&mut *item);
        Ok(item)
    }

    pub fn remove(&mut self, id: &InitiativeId) -> Result<T, PortfolioError> {
        let idx = self
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| PortfolioError::NotFound(id.to_string()))?;
        if self.items.len() == 1 {
            return Err(PortfolioError::LastInitiative(id.clone()));
        }
        let removed = self.items.remove(idx);
        debug!("removed initiative {} ({})", removed.name(), removed.id());
        Ok(removed)
    }

    fn last(&self) -> &T {
        &self.items[self.items.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use crate::initiative::{
        default_initiatives, Identified, Initiative, InitiativeId, Portfolio, PortfolioError,
    };

    fn sample() -> Portfolio<Initiative> {
        Portfolio::from_items(vec![
            Initiative::new(InitiativeId::from("a1"), "A", 4.0, 1500.0),
            Initiative::new(InitiativeId::from("b2"), "B", 2.0, 2000.0),
        ])
        .expect("valid portfolio")
    }

    #[test]
    fn rejects_empty_and_duplicate_items() {
        assert_eq!(
            Portfolio::<Initiative>::from_items(Vec::new()).unwrap_err(),
            PortfolioError::Empty
        );
        let dup = vec![
            Initiative::new(InitiativeId::from("x"), "A", 1.0, 1.0),
            Initiative::new(InitiativeId::from("x"), "B", 1.0, 1.0),
        ];
        assert_eq!(
            Portfolio::from_items(dup).unwrap_err(),
            PortfolioError::DuplicateId(InitiativeId::from("x"))
        );
    }

    #[test]
    fn add_with_assigns_unique_id_and_position_name() {
        let mut portfolio = sample();
        let added = portfolio.add_with(Initiative::placeholder).clone();
        assert_eq!(added.name, "Initiative 3");
        assert_eq!(portfolio.len(), 3);
        assert!(portfolio.contains(added.id()));
        assert_eq!(portfolio.as_slice()[2].id(), added.id());
    }

    #[test]
    fn update_edits_in_place_and_keeps_order() {
        let mut portfolio = sample();
        portfolio
            .update(&InitiativeId::from("a1"), |item| {
                item.name = "Alpha".to_string();
                item.effort_weeks = 6.0;
            })
            .expect("update");
        let first = &portfolio.as_slice()[0];
        assert_eq!(first.name, "Alpha");
        assert_eq!(first.effort_weeks, 6.0);
        assert_eq!(first.id().as_str(), "a1");

        let missing = portfolio.update(&InitiativeId::from("zz"), |_| {});
        assert!(matches!(missing, Err(PortfolioError::NotFound(_))));
    }

    #[test]
    fn remove_keeps_at_least_one_item() {
        let mut portfolio = sample();
        let removed = portfolio.remove(&InitiativeId::from("a1")).expect("remove");
        assert_eq!(removed.name, "A");
        assert_eq!(
            portfolio.remove(&InitiativeId::from("b2")).unwrap_err(),
            PortfolioError::LastInitiative(InitiativeId::from("b2"))
        );
        assert_eq!(portfolio.len(), 1);
    }

    #[test]
    fn find_matches_id_then_name() {
        let portfolio = sample();
        assert_eq!(portfolio.find("b2").map(|i| i.name.as_str()), Some("B"));
        assert_eq!(portfolio.find(" a ").map(|i| i.name.as_str()), Some("A"));
        assert!(portfolio.find("nope").is_none());
    }

    #[test]
    fn default_portfolio_ids_are_distinct() {
        let portfolio = Portfolio::from_items(default_initiatives());
        assert!(portfolio.is_ok());
    }
}
