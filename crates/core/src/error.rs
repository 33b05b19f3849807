use thiserror::Error;

/// Rejected edit to the rule store, budgets or analysis settings. The
/// structure being edited is left unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Category name must not be empty")]
    EmptyCategoryName,
    #[error("Category already exists: {0}")]
    DuplicateCategory(String),
    #[error("Category not found: {0}")]
    UnknownCategory(String),
    #[error("Keyword for category {0} is empty after normalization")]
    EmptyKeyword(String),
    #[error("Budget for {category} must not be negative (got {amount})")]
    NegativeBudget {
        category: String,
        amount: rust_decimal::Decimal,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
