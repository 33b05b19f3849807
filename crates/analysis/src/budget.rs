use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tally_core::{Budgets, Money, MonthKey, MonthRange};

use crate::aggregate::{category_spend, AggregateRow};
use crate::insight::{Insight, InsightKind};

/// One line of the budget table for the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub spend: Money,
    pub budget: Option<Money>,
}

impl BudgetStatus {
    /// Spend minus budget; positive when over. `None` without a budget.
    pub fn difference(&self) -> Option<Money> {
        self.budget.map(|b| self.spend - b)
    }

    /// Strictly above the limit. A zero budget is exceeded by any spend.
    pub fn is_over(&self) -> bool {
        self.budget.is_some_and(|b| self.spend > b)
    }

    /// Overage as a percentage of the budget, rounded to one decimal place.
    /// `None` when not over or when the budget is zero.
    pub fn over_percent(&self) -> Option<Decimal> {
        let budget = self.budget?;
        if !self.is_over() || budget.is_zero() {
            return None;
        }
        let over = (self.spend - budget).as_decimal();
        Some((over / budget.as_decimal() * Decimal::ONE_HUNDRED).round_dp(1))
    }
}

/// Current-month spend next to the configured limit, for every category that
/// has either one. Budget names match categories case-insensitively.
pub fn budget_status(rows: &[AggregateRow], budgets: &Budgets, current_month: MonthKey) -> Vec<BudgetStatus> {
    let spend = category_spend(rows, Some(MonthRange::single(current_month)));

    let mut lines: BTreeMap<String, BudgetStatus> = BTreeMap::new();
    // Spellings that differ only in case share one line; the first seen names it.
    for (category, amount) in spend {
        lines
            .entry(category.to_lowercase())
            .or_insert_with(|| BudgetStatus {
                category: category.to_string(),
                spend: Money::zero(),
                budget: None,
            })
            .spend += amount;
    }
    for (category, limit) in budgets.iter() {
        lines
            .entry(category.to_lowercase())
            .or_insert_with(|| BudgetStatus {
                category: category.to_string(),
                spend: Money::zero(),
                budget: None,
            })
            .budget = Some(limit);
    }
    lines.into_values().collect()
}

/// One `budget_alert` warning per budgeted category whose current-month spend
/// is strictly above its limit.
pub fn check_budgets(rows: &[AggregateRow], budgets: &Budgets, current_month: MonthKey) -> Vec<Insight> {
    let alerts: Vec<Insight> = budget_status(rows, budgets, current_month)
        .into_iter()
        .filter(BudgetStatus::is_over)
        .map(|status| budget_alert(&status, current_month))
        .collect();
    tracing::debug!(alerts = alerts.len(), month = %current_month, "Checked budgets");
    alerts
}

fn budget_alert(status: &BudgetStatus, month: MonthKey) -> Insight {
    let budget = status.budget.unwrap_or_default();
    let over = status.spend - budget;
    let message = match status.over_percent() {
        Some(pct) => format!(
            "{} is over budget for {}: spent {} of {}, over by {} ({:.1}%)",
            status.category,
            month.label(),
            status.spend,
            budget,
            over,
            pct
        ),
        None => format!(
            "{} is over budget for {}: spent {} against a {} budget, over by {}",
            status.category,
            month.label(),
            status.spend,
            budget,
            over
        ),
    };
    Insight::warning(InsightKind::BudgetAlert, message)
}
