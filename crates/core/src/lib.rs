pub mod budget;
pub mod error;
pub mod money;
pub mod period;
pub mod rules;
pub mod text;
pub mod transaction;

pub use budget::Budgets;
pub use error::ConfigError;
pub use money::Money;
pub use period::{MonthKey, MonthRange};
pub use rules::{CategoryRule, RuleStore};
pub use text::{contains_phrase, contains_word_prefix, normalize_text};
pub use transaction::{CategorySource, Transaction, UncategorizedTransaction, UNCATEGORIZED};
