pub mod aggregate;
pub mod budget;
pub mod config;
pub mod detect;
pub mod insight;
pub mod outcome;
pub mod query;
pub mod session;

pub use aggregate::{
    aggregate, current_month, ledger_span, monthly_trend, spend_by_category, summarize,
    AggregateRow, CategoryTotal, LedgerSummary, MonthTotal,
};
pub use budget::{budget_status, check_budgets, BudgetStatus};
pub use config::{AnalysisConfig, OutlierConfig, RecurringConfig};
pub use detect::{
    detect_outliers, detect_recurring, generate_insights, top_categories, Outlier, RecurringCharge,
};
pub use insight::{Insight, InsightKind, Severity};
pub use outcome::Outcome;
pub use query::{answer, ask, parse_query, Metric, Query, QueryAnswer};
pub use session::{AnalysisReport, ImportSummary, Session, SessionError};
