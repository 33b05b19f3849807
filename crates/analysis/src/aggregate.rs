use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tally_core::{Money, MonthKey, MonthRange, Transaction};

use crate::outcome::Outcome;

/// Totals for one (month, category) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub month: MonthKey,
    pub category: String,
    /// Sum of outflow magnitudes, reported as a positive amount.
    pub total_spend: Money,
    pub total_income: Money,
    pub transaction_count: usize,
}

impl AggregateRow {
    pub fn net(&self) -> Money {
        self.total_income - self.total_spend
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub spend: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub spend: Money,
    pub income: Money,
}

/// Whole-ledger figures for the summary cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    pub total_inflow: Money,
    /// Positive magnitude of all outflows.
    pub total_outflow: Money,
    pub net: Money,
    pub distinct_merchants: usize,
    pub transaction_count: usize,
    pub current_month: MonthKey,
    pub current_month_spend: Money,
    pub span: MonthRange,
}

/// Groups by (month, category), ordered by month then category name.
pub fn aggregate(transactions: &[Transaction]) -> Vec<AggregateRow> {
    let mut cells: BTreeMap<(MonthKey, &str), AggregateRow> = BTreeMap::new();
    for tx in transactions {
        let row = cells
            .entry((tx.month(), tx.category.as_str()))
            .or_insert_with(|| AggregateRow {
                month: tx.month(),
                category: tx.category.clone(),
                total_spend: Money::zero(),
                total_income: Money::zero(),
                transaction_count: 0,
            });
        row.total_spend += tx.spend();
        row.total_income += tx.income();
        row.transaction_count += 1;
    }
    cells.into_values().collect()
}

/// The reference date's month if given, otherwise the latest month in the ledger.
pub fn current_month(transactions: &[Transaction], reference: Option<NaiveDate>) -> Option<MonthKey> {
    match reference {
        Some(date) => Some(MonthKey::from_date(date)),
        None => transactions.iter().map(Transaction::month).max(),
    }
}

/// First to last month with any aggregated activity.
pub fn ledger_span(rows: &[AggregateRow]) -> Option<MonthRange> {
    let first = rows.iter().map(|r| r.month).min()?;
    let last = rows.iter().map(|r| r.month).max()?;
    Some(MonthRange::new(first, last))
}

/// Spend per category within `range` (or across all rows), excluding
/// categories with no spend.
pub(crate) fn category_spend(rows: &[AggregateRow], range: Option<MonthRange>) -> BTreeMap<&str, Money> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for row in rows {
        if range.is_some_and(|r| !r.contains(row.month)) || row.total_spend.is_zero() {
            continue;
        }
        *totals.entry(row.category.as_str()).or_default() += row.total_spend;
    }
    totals
}

/// Largest spend first; equal totals fall back to category name order.
pub(crate) fn rank_categories(totals: BTreeMap<&str, Money>) -> Vec<CategoryTotal> {
    let mut ranked: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, spend)| CategoryTotal {
            category: category.to_string(),
            spend,
        })
        .collect();
    // BTreeMap iteration is already name-ordered and sort_by is stable.
    ranked.sort_by(|a, b| b.spend.cmp(&a.spend));
    ranked
}

/// All-time spend per category, for the category chart.
pub fn spend_by_category(rows: &[AggregateRow]) -> Vec<CategoryTotal> {
    rank_categories(category_spend(rows, None))
}

/// Spend and income per month in chronological order, for the trend chart.
pub fn monthly_trend(rows: &[AggregateRow]) -> Vec<MonthTotal> {
    let mut months: BTreeMap<MonthKey, MonthTotal> = BTreeMap::new();
    for row in rows {
        let total = months.entry(row.month).or_insert_with(|| MonthTotal {
            month: row.month,
            spend: Money::zero(),
            income: Money::zero(),
        });
        total.spend += row.total_spend;
        total.income += row.total_income;
    }
    months.into_values().collect()
}

/// Summary cards for the whole ledger. An empty ledger has no summary.
pub fn summarize(transactions: &[Transaction], reference: Option<NaiveDate>) -> Outcome<LedgerSummary> {
    let Some(first) = transactions.iter().map(Transaction::month).min() else {
        return Outcome::NoData;
    };
    let Some(last) = transactions.iter().map(Transaction::month).max() else {
        return Outcome::NoData;
    };
    let current = current_month(transactions, reference).unwrap_or(last);

    let total_inflow: Money = transactions.iter().map(Transaction::income).sum();
    let total_outflow: Money = transactions.iter().map(Transaction::spend).sum();
    let current_month_spend = transactions
        .iter()
        .filter(|tx| tx.month() == current)
        .map(Transaction::spend)
        .sum();
    let distinct_merchants = transactions
        .iter()
        .map(|tx| tx.normalized_description.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    Outcome::Data(LedgerSummary {
        total_inflow,
        total_outflow,
        net: total_inflow - total_outflow,
        distinct_merchants,
        transaction_count: transactions.len(),
        current_month: current,
        current_month_spend,
        span: MonthRange::new(first, last),
    })
}
