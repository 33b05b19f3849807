use chrono::NaiveDate;
use serde::Serialize;
use std::io::{Read, Write};
use tally_core::{Budgets, ConfigError, MonthKey, RuleStore, Transaction};
use tally_import::{normalize_rows, Categorizer, CsvError, RawRow, Recompute, SkippedRow};
use thiserror::Error;

use crate::aggregate::{
    aggregate, current_month, monthly_trend, spend_by_category, summarize, AggregateRow,
    CategoryTotal, LedgerSummary, MonthTotal,
};
use crate::budget::{budget_status, BudgetStatus};
use crate::config::AnalysisConfig;
use crate::detect::generate_insights;
use crate::insight::Insight;
use crate::outcome::Outcome;
use crate::query::{ask, QueryAnswer};

fn categorizer<'a>(rules: &'a RuleStore, config: &'a AnalysisConfig) -> Categorizer<'a> {
    Categorizer::new(rules).with_inflow_category(config.inflow_category.as_deref())
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No transaction at index {0}")]
    NoSuchTransaction(usize),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Everything the presentation layer renders after one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: LedgerSummary,
    pub rows: Vec<AggregateRow>,
    pub spend_by_category: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthTotal>,
    pub budget_status: Vec<BudgetStatus>,
    pub insights: Vec<Insight>,
}

/// One user's working state: rules, budgets and the categorized ledger.
///
/// Rules and budgets are only changed between runs; every read-side method
/// recomputes from the current ledger.
#[derive(Debug, Clone)]
pub struct Session {
    rules: RuleStore,
    budgets: Budgets,
    config: AnalysisConfig,
    reference_date: Option<NaiveDate>,
    transactions: Vec<Transaction>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RuleStore::with_defaults(), Budgets::new(), AnalysisConfig::default())
    }
}

impl Session {
    pub fn new(rules: RuleStore, budgets: Budgets, config: AnalysisConfig) -> Self {
        Self {
            rules,
            budgets,
            config,
            reference_date: None,
            transactions: Vec::new(),
        }
    }

    /// Pins "today". Without it the current month is the ledger's latest month.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Edits take effect on the next import or [`Session::recategorize`].
    pub fn rules_mut(&mut self) -> &mut RuleStore {
        &mut self.rules
    }

    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    pub fn budgets_mut(&mut self) -> &mut Budgets {
        &mut self.budgets
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) -> Result<(), SessionError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ── ledger ───────────────────────────────────────────────────────────────

    /// Replaces the ledger with `rows`, normalized and categorized. Rows that
    /// fail to parse are reported, not fatal.
    pub fn import_rows(&mut self, rows: &[RawRow]) -> ImportSummary {
        let report = normalize_rows(rows);
        self.transactions = categorizer(&self.rules, &self.config).apply(report.transactions);
        tracing::info!(
            imported = self.transactions.len(),
            skipped = report.skipped.len(),
            "Imported ledger"
        );
        ImportSummary {
            imported: self.transactions.len(),
            skipped: report.skipped,
        }
    }

    pub fn import_csv<R: Read>(&mut self, data: R) -> Result<ImportSummary, SessionError> {
        let rows = tally_import::read_rows(data)?;
        Ok(self.import_rows(&rows))
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Sets a category by hand. Manual categories survive
    /// [`Recompute::KeepManual`] passes.
    pub fn override_category(&mut self, index: usize, category: &str) -> Result<(), SessionError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ConfigError::EmptyCategoryName.into());
        }
        let tx = self
            .transactions
            .get_mut(index)
            .ok_or(SessionError::NoSuchTransaction(index))?;
        tx.override_category(category);
        tracing::debug!(index, category, "Manual category override");
        Ok(())
    }

    /// Re-runs the rules over the ledger. Returns how many categories changed.
    pub fn recategorize(&mut self, mode: Recompute) -> usize {
        let changed =
            categorizer(&self.rules, &self.config).recategorize(&mut self.transactions, mode);
        tracing::info!(changed, ?mode, "Recategorized ledger");
        changed
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<(), SessionError> {
        tally_import::export_csv(writer, &self.transactions)?;
        Ok(())
    }

    // ── analysis ─────────────────────────────────────────────────────────────

    pub fn current_month(&self) -> Option<MonthKey> {
        current_month(&self.transactions, self.reference_date)
    }

    pub fn aggregate(&self) -> Vec<AggregateRow> {
        aggregate(&self.transactions)
    }

    pub fn summary(&self) -> Outcome<LedgerSummary> {
        summarize(&self.transactions, self.reference_date)
    }

    pub fn budget_status(&self) -> Outcome<Vec<BudgetStatus>> {
        Outcome::from(self.current_month())
            .map(|month| budget_status(&self.aggregate(), &self.budgets, month))
    }

    pub fn insights(&self) -> Outcome<Vec<Insight>> {
        if self.transactions.is_empty() {
            return Outcome::NoData;
        }
        let Some(month) = self.current_month() else {
            return Outcome::NoData;
        };
        Outcome::Data(generate_insights(
            &self.transactions,
            &self.aggregate(),
            &self.budgets,
            month,
            &self.config,
        ))
    }

    /// The full set of outputs for one run; no data for an empty ledger.
    pub fn analyze(&self) -> Outcome<AnalysisReport> {
        let Outcome::Data(summary) = self.summary() else {
            return Outcome::NoData;
        };
        let rows = self.aggregate();
        let month = summary.current_month;
        Outcome::Data(AnalysisReport {
            spend_by_category: spend_by_category(&rows),
            monthly_trend: monthly_trend(&rows),
            budget_status: budget_status(&rows, &self.budgets, month),
            insights: generate_insights(&self.transactions, &rows, &self.budgets, month, &self.config),
            summary,
            rows,
        })
    }

    pub fn ask(&self, question: &str) -> QueryAnswer {
        ask(question, &self.rules, &self.aggregate(), self.current_month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::InsightKind;
    use tally_core::{CategorySource, Money};

    const LEDGER: &str = "\
Date,Description,Amount
2024-05-03,NETFLIX.COM,-15.49
2024-06-03,NETFLIX.COM,-15.49
2024-06-15,PAYROLL ACME,\"3,000.00\"
2024-07-02,KROGER #221,-70.00
2024-07-03,NETFLIX.COM,-15.49
2024-07-09,Whole Foods Market,-50.00
2024-07-12,Blue Bottle Coffee,(4.50)
not a date,Mystery,-1.00
2024-07-20,Broken amount,abc
";

    fn session() -> Session {
        let mut s = Session::default();
        let summary = s.import_csv(LEDGER.as_bytes()).unwrap();
        assert_eq!(summary.imported, 7);
        s
    }

    // ── import ────────────────────────────────────────────────────────────────

    #[test]
    fn import_reports_skipped_rows() {
        let mut s = Session::default();
        let summary = s.import_csv(LEDGER.as_bytes()).unwrap();
        assert_eq!(summary.skipped.len(), 2);
        assert_eq!(summary.skipped[0].row, 8);
        assert_eq!(summary.skipped[1].row, 9);
    }

    #[test]
    fn import_categorizes_with_rules() {
        let s = session();
        let categories: Vec<_> = s.transactions().iter().map(|t| t.category.as_str()).collect();
        assert_eq!(
            categories,
            vec![
                "Entertainment",
                "Entertainment",
                "Income",
                "Groceries",
                "Entertainment",
                "Groceries",
                "Other",
            ]
        );
        assert_eq!(s.transactions()[6].amount, Money::from_cents(-450));
    }

    #[test]
    fn import_csv_missing_column() {
        let mut s = Session::default();
        let err = s.import_csv("Date,Amount\n2024-07-01,-1.00\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SessionError::Csv(CsvError::MissingColumn("Description"))));
    }

    #[test]
    fn reimport_replaces_ledger() {
        let mut s = session();
        let summary = s.import_rows(&[RawRow::new("2024-08-01", "Kroger", "-10.00")]);
        assert_eq!(summary.imported, 1);
        assert_eq!(s.transactions().len(), 1);
    }

    #[test]
    fn inflow_category_from_config() {
        let mut s = Session::default();
        s.set_config(AnalysisConfig {
            inflow_category: Some("Income".to_string()),
            ..AnalysisConfig::default()
        })
        .unwrap();
        s.import_rows(&[RawRow::new("2024-07-01", "Kroger refund", "5.00")]);
        assert_eq!(s.transactions()[0].category, "Income");
    }

    // ── edits ─────────────────────────────────────────────────────────────────

    #[test]
    fn manual_override_survives_keep_manual() {
        let mut s = session();
        s.override_category(6, "Coffee").unwrap();
        s.rules_mut().add_rule("Dining", ["blue bottle"]).unwrap();

        assert_eq!(s.recategorize(Recompute::KeepManual), 0);
        assert_eq!(s.transactions()[6].category, "Coffee");
        assert_eq!(s.transactions()[6].category_source, CategorySource::Manual);

        assert_eq!(s.recategorize(Recompute::All), 1);
        assert_eq!(s.transactions()[6].category, "Dining");
        assert_eq!(s.transactions()[6].category_source, CategorySource::Rule);
    }

    #[test]
    fn rule_edits_apply_on_recategorize() {
        let mut s = session();
        s.rules_mut().add_rule("Coffee", ["blue bottle"]).unwrap();
        assert_eq!(s.recategorize(Recompute::KeepManual), 1);
        assert_eq!(s.transactions()[6].category, "Coffee");
    }

    #[test]
    fn override_rejects_bad_input() {
        let mut s = session();
        assert!(matches!(
            s.override_category(99, "Dining"),
            Err(SessionError::NoSuchTransaction(99))
        ));
        assert!(matches!(
            s.override_category(0, "  "),
            Err(SessionError::Config(ConfigError::EmptyCategoryName))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut s = Session::default();
        let bad = AnalysisConfig {
            inflow_category: Some(String::new()),
            ..AnalysisConfig::default()
        };
        assert!(s.set_config(bad).is_err());
        assert!(s.config().inflow_category.is_none());
    }

    // ── analysis ──────────────────────────────────────────────────────────────

    #[test]
    fn empty_session_has_no_data() {
        let s = Session::default();
        assert!(s.analyze().is_no_data());
        assert!(s.insights().is_no_data());
        assert!(s.summary().is_no_data());
        assert!(s.budget_status().is_no_data());
        assert!(s.ask("how much did I spend").outcome.is_no_data());
    }

    #[test]
    fn analyze_full_report() {
        let mut s = session();
        s.budgets_mut().set("Groceries", Money::from_cents(10_000)).unwrap();
        let report = s.analyze().into_data().unwrap();

        assert_eq!(report.summary.current_month, MonthKey::new(2024, 7).unwrap());
        assert_eq!(report.summary.total_inflow, Money::from_cents(300_000));
        assert_eq!(report.spend_by_category[0].category, "Groceries");
        assert_eq!(report.monthly_trend.len(), 3);

        let groceries = report
            .budget_status
            .iter()
            .find(|b| b.category == "Groceries")
            .unwrap();
        assert!(groceries.is_over());

        let kinds: Vec<_> = report.insights.iter().map(|i| i.kind).collect();
        assert!(kinds.contains(&InsightKind::TopCategory));
        assert!(kinds.contains(&InsightKind::BudgetAlert));
        assert!(kinds.contains(&InsightKind::Recurring));
    }

    #[test]
    fn budget_status_for_current_month() {
        let mut s = session();
        s.budgets_mut().set("Groceries", Money::from_cents(10_000)).unwrap();
        let status = s.budget_status().into_data().unwrap();
        let groceries = status.iter().find(|b| b.category == "Groceries").unwrap();
        assert_eq!(groceries.budget, Some(Money::from_cents(10_000)));
        assert!(groceries.is_over());
    }

    #[test]
    fn reference_date_moves_current_month() {
        let s = session().with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        assert_eq!(s.current_month(), MonthKey::new(2024, 6));
        let answer = s.ask("what did I spend this month");
        assert_eq!(answer.outcome, Outcome::Data(Money::from_cents(1549)));
    }

    #[test]
    fn ask_answers_from_ledger() {
        let s = session();
        let answer = s.ask("How much did I spend on groceries in July");
        assert_eq!(answer.text, "You spent $120.00 on Groceries in July 2024.");
    }

    #[test]
    fn export_round_trip_header() {
        let s = session();
        let mut out = Vec::new();
        s.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Description,Amount,Category"));
        assert_eq!(lines.next(), Some("2024-05-03,NETFLIX.COM,-15.49,Entertainment"));
        assert_eq!(text.lines().count(), 8);
    }
}
