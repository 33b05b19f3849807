//! Heuristic detectors: recurring charges, per-category outliers and the
//! top-spending ranking. Everything here is recomputed from scratch on each
//! call; nothing is carried between runs.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tally_core::{Budgets, Money, MonthKey, MonthRange, Transaction};

use crate::aggregate::{category_spend, rank_categories, AggregateRow, CategoryTotal};
use crate::budget::check_budgets;
use crate::config::{AnalysisConfig, OutlierConfig, RecurringConfig};
use crate::insight::{Insight, InsightKind};

/// A merchant charging about the same amount across consecutive months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringCharge {
    /// Raw description of the latest charge.
    pub description: String,
    pub normalized_description: String,
    /// Magnitude of the latest charge.
    pub amount: Money,
    /// Distinct months of the qualifying run, oldest first.
    pub months: Vec<MonthKey>,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    /// Positive magnitude of the outflow.
    pub amount: Money,
    pub z_score: f64,
}

// ── recurring charges ────────────────────────────────────────────────────────

fn within_tolerance(anchor: Money, amount: Money, config: &RecurringConfig) -> bool {
    let anchor = anchor.as_decimal();
    let band = (anchor.abs() * config.amount_tolerance_pct).max(config.amount_tolerance_abs);
    (amount.as_decimal() - anchor).abs() <= band
}

/// Splits sorted months into runs where no gap skips more than the allowed
/// number of months, and returns the longest (latest on ties).
fn longest_run(months: &BTreeSet<MonthKey>, max_skipped: u32) -> Vec<MonthKey> {
    let max_step = i64::from(max_skipped) + 1;
    let mut best: Vec<MonthKey> = Vec::new();
    let mut current: Vec<MonthKey> = Vec::new();
    for &month in months {
        if let Some(&prev) = current.last() {
            if prev.months_until(month) > max_step {
                if current.len() >= best.len() {
                    best = std::mem::take(&mut current);
                } else {
                    current.clear();
                }
            }
        }
        current.push(month);
    }
    if current.len() >= best.len() {
        best = current;
    }
    best
}

/// Groups outflows by normalized description and by amount within the
/// configured band, then keeps groups that appear in at least
/// `min_occurrences` distinct months without a gap wider than
/// `max_skipped_months`.
pub fn detect_recurring(transactions: &[Transaction], config: &RecurringConfig) -> Vec<RecurringCharge> {
    let mut by_merchant: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions {
        if tx.is_outflow() && !tx.normalized_description.is_empty() {
            by_merchant
                .entry(tx.normalized_description.as_str())
                .or_default()
                .push(tx);
        }
    }

    let mut found = Vec::new();
    for (merchant, mut txs) in by_merchant {
        txs.sort_by(|a, b| a.spend().cmp(&b.spend()).then(a.date.cmp(&b.date)));

        // Greedy clusters anchored on the smallest amount of each group.
        let mut clusters: Vec<Vec<&Transaction>> = Vec::new();
        for tx in txs {
            match clusters.last_mut() {
                Some(cluster) if within_tolerance(cluster[0].spend(), tx.spend(), config) => {
                    cluster.push(tx)
                }
                _ => clusters.push(vec![tx]),
            }
        }

        for cluster in clusters {
            let months: BTreeSet<MonthKey> = cluster.iter().map(|t| t.month()).collect();
            let run = longest_run(&months, config.max_skipped_months);
            if run.len() < config.min_occurrences {
                continue;
            }
            let Some(latest) = cluster
                .iter()
                .filter(|t| run.contains(&t.month()))
                .max_by_key(|t| t.date)
            else {
                continue;
            };
            let occurrences = cluster.iter().filter(|t| run.contains(&t.month())).count();
            found.push(RecurringCharge {
                description: latest.raw_description.trim().to_string(),
                normalized_description: merchant.to_string(),
                amount: latest.spend(),
                months: run,
                occurrences,
            });
        }
    }
    found
}

fn recurring_insight(charge: &RecurringCharge) -> Insight {
    let span = match (charge.months.first(), charge.months.last()) {
        (Some(&first), Some(&last)) => format!(" ({})", MonthRange::new(first, last)),
        _ => String::new(),
    };
    Insight::info(
        InsightKind::Recurring,
        format!(
            "Possible recurring charge: {} at {} across {} months{}",
            charge.description,
            charge.amount,
            charge.months.len(),
            span
        ),
    )
}

// ── outliers ─────────────────────────────────────────────────────────────────

/// Flags outflows whose Z-score against their own category exceeds the
/// threshold. Uses the sample standard deviation; categories below the
/// sample floor or with no variance are skipped.
pub fn detect_outliers(transactions: &[Transaction], config: &OutlierConfig) -> Vec<Outlier> {
    let mut by_category: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_outflow()) {
        by_category.entry(tx.category.as_str()).or_default().push(tx);
    }

    let mut found = Vec::new();
    for (category, txs) in by_category {
        if txs.len() < config.min_samples || txs.len() < 2 {
            continue;
        }
        let values: Vec<f64> = txs.iter().map(|t| t.spend().to_f64()).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        if !std_dev.is_finite() || std_dev <= 1e-9 {
            continue;
        }

        for (tx, value) in txs.iter().zip(&values) {
            let z = (value - mean) / std_dev;
            if z.abs() > config.z_threshold {
                found.push(Outlier {
                    date: tx.date,
                    description: tx.raw_description.trim().to_string(),
                    category: category.to_string(),
                    amount: tx.spend(),
                    z_score: z,
                });
            }
        }
    }

    found.sort_by(|a, b| {
        b.z_score
            .abs()
            .total_cmp(&a.z_score.abs())
            .then(a.date.cmp(&b.date))
    });
    found
}

fn outlier_insight(outlier: &Outlier) -> Insight {
    Insight::warning(
        InsightKind::Anomaly,
        format!(
            "Unusual spend in {}: {} on {} for {} (z-score {:.2})",
            outlier.category, outlier.description, outlier.date, outlier.amount, outlier.z_score
        ),
    )
}

// ── top categories ───────────────────────────────────────────────────────────

/// Categories ranked by spend in `month`, largest first, name order on ties.
pub fn top_categories(rows: &[AggregateRow], month: MonthKey, n: usize) -> Vec<CategoryTotal> {
    let mut ranked = rank_categories(category_spend(rows, Some(MonthRange::single(month))));
    ranked.truncate(n);
    ranked
}

fn top_category_insight(rank: usize, total: &CategoryTotal, month: MonthKey) -> Insight {
    Insight::info(
        InsightKind::TopCategory,
        format!(
            "#{} spending category in {}: {} at {}",
            rank,
            month.label(),
            total.category,
            total.spend
        ),
    )
}

/// Every insight for one run: top categories, budget alerts, recurring
/// charges, then outliers.
pub fn generate_insights(
    transactions: &[Transaction],
    rows: &[AggregateRow],
    budgets: &Budgets,
    current_month: MonthKey,
    config: &AnalysisConfig,
) -> Vec<Insight> {
    let mut insights: Vec<Insight> = top_categories(rows, current_month, config.top_categories)
        .iter()
        .enumerate()
        .map(|(i, total)| top_category_insight(i + 1, total, current_month))
        .collect();

    insights.extend(check_budgets(rows, budgets, current_month));

    let recurring = detect_recurring(transactions, &config.recurring);
    insights.extend(recurring.iter().map(recurring_insight));

    let outliers = detect_outliers(transactions, &config.outliers);
    insights.extend(outliers.iter().map(outlier_insight));

    tracing::info!(
        month = %current_month,
        recurring = recurring.len(),
        outliers = outliers.len(),
        total = insights.len(),
        "Generated insights"
    );
    insights
}
