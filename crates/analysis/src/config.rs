use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::ConfigError;

/// Thresholds for recurring-charge detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurringConfig {
    /// Distinct months a charge must appear in.
    pub min_occurrences: usize,
    /// Relative amount band around the first charge of a group (0.02 = 2%).
    pub amount_tolerance_pct: Decimal,
    /// Absolute amount band; the wider of the two bands applies.
    pub amount_tolerance_abs: Decimal,
    /// Missing months allowed between two consecutive charges.
    pub max_skipped_months: u32,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            amount_tolerance_pct: Decimal::new(2, 2),
            amount_tolerance_abs: Decimal::new(1, 2),
            max_skipped_months: 1,
        }
    }
}

/// Thresholds for per-category Z-score outliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierConfig {
    /// A transaction is flagged when |z| is strictly above this.
    pub z_threshold: f64,
    /// Categories with fewer spend transactions are skipped.
    pub min_samples: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            z_threshold: 2.0,
            min_samples: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub recurring: RecurringConfig,
    pub outliers: OutlierConfig,
    /// How many categories the top-spending ranking reports.
    pub top_categories: usize,
    /// When set, every inflow gets this category instead of going through the rules.
    pub inflow_category: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            recurring: RecurringConfig::default(),
            outliers: OutlierConfig::default(),
            top_categories: 3,
            inflow_category: None,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = toml::from_str(toml_content)
            .map_err(|e| ConfigError::InvalidConfig(format!("Failed to parse analysis TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recurring.min_occurrences < 2 {
            return Err(ConfigError::InvalidConfig(
                "recurring.min_occurrences must be at least 2".to_string(),
            ));
        }
        if self.recurring.amount_tolerance_pct.is_sign_negative()
            || self.recurring.amount_tolerance_abs.is_sign_negative()
        {
            return Err(ConfigError::InvalidConfig(
                "recurring amount tolerances must not be negative".to_string(),
            ));
        }
        if !self.outliers.z_threshold.is_finite() || self.outliers.z_threshold <= 0.0 {
            return Err(ConfigError::InvalidConfig(
                "outliers.z_threshold must be a positive number".to_string(),
            ));
        }
        if self.outliers.min_samples < 2 {
            return Err(ConfigError::InvalidConfig(
                "outliers.min_samples must be at least 2".to_string(),
            ));
        }
        if self
            .inflow_category
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(ConfigError::EmptyCategoryName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = AnalysisConfig::default();
        assert_eq!(c.recurring.min_occurrences, 3);
        assert_eq!(c.recurring.amount_tolerance_pct, Decimal::new(2, 2));
        assert_eq!(c.recurring.max_skipped_months, 1);
        assert_eq!(c.outliers.z_threshold, 2.0);
        assert_eq!(c.outliers.min_samples, 3);
        assert_eq!(c.top_categories, 3);
        assert!(c.inflow_category.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AnalysisConfig::from_toml("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            top_categories = 5
            inflow_category = "Income"

            [outliers]
            z_threshold = 2.5
        "#;
        let c = AnalysisConfig::from_toml(toml).unwrap();
        assert_eq!(c.top_categories, 5);
        assert_eq!(c.inflow_category.as_deref(), Some("Income"));
        assert_eq!(c.outliers.z_threshold, 2.5);
        assert_eq!(c.outliers.min_samples, 3);
        assert_eq!(c.recurring, RecurringConfig::default());
    }

    #[test]
    fn rejects_bad_thresholds() {
        assert!(matches!(
            AnalysisConfig::from_toml("[outliers]\nz_threshold = 0.0"),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("[recurring]\nmin_occurrences = 1"),
            Err(ConfigError::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_toml("top_categories = \"three\""),
            Err(ConfigError::InvalidConfig(_))
        ));
    }
}
