use tally_core::{
    CategoryRule, CategorySource, Money, RuleStore, Transaction, UncategorizedTransaction,
    UNCATEGORIZED,
};

/// Whether a re-categorization pass may replace categories the caller set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Recompute {
    /// Leave manual overrides in place.
    #[default]
    KeepManual,
    /// Re-run the rules on every transaction and drop manual overrides.
    All,
}

/// Assigns categories from a rule store. The first category in store order
/// with a keyword inside the normalized description wins.
pub struct Categorizer<'a> {
    rules: &'a RuleStore,
    inflow_category: Option<&'a str>,
}

impl<'a> Categorizer<'a> {
    pub fn new(rules: &'a RuleStore) -> Self {
        Self {
            rules,
            inflow_category: None,
        }
    }

    /// Routes every positive amount to `category` without consulting the rules.
    pub fn with_inflow_category(mut self, category: Option<&'a str>) -> Self {
        self.inflow_category = category;
        self
    }

    pub fn find_matching_rule(&self, normalized_description: &str) -> Option<&'a CategoryRule> {
        self.rules.first_match(normalized_description)
    }

    pub fn categorize(&self, tx: &UncategorizedTransaction) -> String {
        self.category_for(&tx.normalized_description, tx.amount)
    }

    fn category_for(&self, normalized_description: &str, amount: Money) -> String {
        if let Some(inflow) = self.inflow_category {
            if amount.is_positive() {
                return inflow.to_string();
            }
        }
        self.find_matching_rule(normalized_description)
            .map_or_else(|| UNCATEGORIZED.to_string(), |rule| rule.name.clone())
    }

    /// Categorizes freshly normalized rows, preserving their order.
    pub fn apply(&self, shells: Vec<UncategorizedTransaction>) -> Vec<Transaction> {
        let out: Vec<Transaction> = shells
            .into_iter()
            .map(|shell| {
                let category = self.categorize(&shell);
                shell.into_categorized(category)
            })
            .collect();
        tracing::debug!(
            count = out.len(),
            uncategorized = out.iter().filter(|t| t.category == UNCATEGORIZED).count(),
            "Categorized transactions"
        );
        out
    }

    /// Re-runs the rules over existing transactions. Returns how many
    /// categories changed.
    pub fn recategorize(&self, transactions: &mut [Transaction], mode: Recompute) -> usize {
        let mut changed = 0;
        for tx in transactions.iter_mut() {
            if tx.is_manual() && mode == Recompute::KeepManual {
                continue;
            }
            let category = self.category_for(&tx.normalized_description, tx.amount);
            if category != tx.category {
                changed += 1;
            }
            tx.category = category;
            tx.category_source = CategorySource::Rule;
        }
        tracing::debug!(changed, ?mode, "Recategorized transactions");
        changed
    }
}

/// Category for one transaction under `rules`, or `Other` if nothing matches.
pub fn categorize(tx: &UncategorizedTransaction, rules: &RuleStore) -> String {
    Categorizer::new(rules).categorize(tx)
}
