use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::money::Money;

/// Monthly spending limits keyed by category name. A budget may name a
/// category the rule store does not know; it then never triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budgets {
    limits: BTreeMap<String, Money>,
}

impl Budgets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat `Category = limit` table.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, Decimal> = toml::from_str(toml_content)
            .map_err(|e| ConfigError::InvalidConfig(format!("Failed to parse budgets TOML: {e}")))?;
        let mut budgets = Budgets::new();
        for (category, limit) in raw {
            budgets.set(&category, Money::new(limit))?;
        }
        Ok(budgets)
    }

    /// Sets or replaces the limit for `category`. A zero limit means any
    /// spend in that category is over budget.
    pub fn set(&mut self, category: &str, limit: Money) -> Result<(), ConfigError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ConfigError::EmptyCategoryName);
        }
        if limit.is_negative() {
            return Err(ConfigError::NegativeBudget {
                category: category.to_string(),
                amount: limit.as_decimal(),
            });
        }
        self.limits.insert(category.to_string(), limit);
        Ok(())
    }

    pub fn remove(&mut self, category: &str) -> Option<Money> {
        self.limits.remove(category.trim())
    }

    pub fn get(&self, category: &str) -> Option<Money> {
        self.limits.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.limits.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut b = Budgets::new();
        b.set("Groceries", Money::from_cents(40_000)).unwrap();
        assert_eq!(b.get("Groceries"), Some(Money::from_cents(40_000)));
        assert_eq!(b.get("Dining"), None);
    }

    #[test]
    fn zero_budget_is_allowed() {
        let mut b = Budgets::new();
        b.set("Entertainment", Money::zero()).unwrap();
        assert_eq!(b.get("Entertainment"), Some(Money::zero()));
    }

    #[test]
    fn negative_budget_rejected_and_state_kept() {
        let mut b = Budgets::new();
        b.set("Dining", Money::from_cents(10_000)).unwrap();
        let err = b.set("Dining", Money::from_cents(-1)).unwrap_err();
        assert!(matches!(err, ConfigError::NegativeBudget { .. }));
        assert_eq!(b.get("Dining"), Some(Money::from_cents(10_000)));
    }

    #[test]
    fn empty_name_rejected() {
        let mut b = Budgets::new();
        assert_eq!(b.set(" ", Money::zero()), Err(ConfigError::EmptyCategoryName));
        assert!(b.is_empty());
    }

    #[test]
    fn from_toml_accepts_integers_and_floats() {
        let b = Budgets::from_toml("Groceries = 400\nDining = 150.5\n").unwrap();
        assert_eq!(b.len(), 2);
        assert_eq!(b.get("Groceries"), Some(Money::from_cents(40_000)));
        assert_eq!(b.get("Dining"), Some(Money::from_cents(15_050)));
    }

    #[test]
    fn from_toml_rejects_negative() {
        assert!(matches!(
            Budgets::from_toml("Groceries = -5"),
            Err(ConfigError::NegativeBudget { .. })
        ));
    }

    #[test]
    fn remove() {
        let mut b = Budgets::new();
        b.set("Housing", Money::from_cents(150_000)).unwrap();
        assert_eq!(b.remove("Housing"), Some(Money::from_cents(150_000)));
        assert!(b.is_empty());
    }
}
