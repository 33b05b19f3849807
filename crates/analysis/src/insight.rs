use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    /// A charge repeating month after month.
    Recurring,
    /// A transaction far from its category's usual amount.
    Anomaly,
    /// Current-month spend above a configured budget.
    BudgetAlert,
    /// One of the biggest spending categories this month.
    TopCategory,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Recurring => "recurring",
            InsightKind::Anomaly => "anomaly",
            InsightKind::BudgetAlert => "budget_alert",
            InsightKind::TopCategory => "top_category",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A finding for the insights panel. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub severity: Severity,
    pub message: String,
}

impl Insight {
    pub fn info(kind: InsightKind, message: impl Into<String>) -> Self {
        Insight {
            kind,
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(kind: InsightKind, message: impl Into<String>) -> Self {
        Insight {
            kind,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_snake_case() {
        let insight = Insight::warning(InsightKind::BudgetAlert, "Dining over budget");
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["kind"], "budget_alert");
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["message"], "Dining over budget");
    }

    #[test]
    fn display() {
        let insight = Insight::info(InsightKind::TopCategory, "Groceries leads");
        assert_eq!(insight.to_string(), "[info] Groceries leads");
        assert_eq!(InsightKind::Anomaly.to_string(), "anomaly");
    }
}
