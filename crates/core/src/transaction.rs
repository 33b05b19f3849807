use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::period::MonthKey;

/// Category assigned when no rule matches.
pub const UNCATEGORIZED: &str = "Other";

/// How a transaction got its current category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    Rule,
    Manual,
}

/// A parsed ledger row that has not been through categorization yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncategorizedTransaction {
    pub date: NaiveDate,
    pub raw_description: String,
    pub normalized_description: String,
    pub amount: Money,
}

impl UncategorizedTransaction {
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    pub fn into_categorized(self, category: String) -> Transaction {
        Transaction {
            date: self.date,
            raw_description: self.raw_description,
            normalized_description: self.normalized_description,
            amount: self.amount,
            category,
            category_source: CategorySource::Rule,
        }
    }
}

/// A categorized transaction. Only the category may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub raw_description: String,
    pub normalized_description: String,
    pub amount: Money,
    pub category: String,
    pub category_source: CategorySource,
}

impl Transaction {
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.date)
    }

    pub fn is_outflow(&self) -> bool {
        self.amount.is_negative()
    }

    pub fn is_inflow(&self) -> bool {
        self.amount.is_positive()
    }

    /// Magnitude of an outflow, zero for inflows.
    pub fn spend(&self) -> Money {
        if self.is_outflow() {
            self.amount.abs()
        } else {
            Money::zero()
        }
    }

    /// Amount of an inflow, zero for outflows.
    pub fn income(&self) -> Money {
        if self.is_inflow() {
            self.amount
        } else {
            Money::zero()
        }
    }

    /// Caller edit. Marks the category as manual so rule passes leave it alone.
    pub fn override_category(&mut self, category: &str) {
        self.category = category.to_string();
        self.category_source = CategorySource::Manual;
    }

    pub fn is_manual(&self) -> bool {
        self.category_source == CategorySource::Manual
    }
}
