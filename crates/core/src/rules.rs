use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::text::normalize_text;

/// A category and the keywords that select it. Keywords are stored
/// normalized and without duplicates, in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// True if any keyword is a substring of the normalized description.
    /// A rule without keywords never matches.
    pub fn matches(&self, normalized_description: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| normalized_description.contains(kw.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    category: Vec<CategoryRule>,
}

const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &["walmart", "aldi", "kroger", "whole foods", "safeway", "instacart"],
    ),
    (
        "Dining",
        &["mcdonald", "burger king", "kfc", "chipotle", "starbucks", "ubereats", "doordash"],
    ),
    ("Transport", &["uber", "lyft", "shell", "chevron", "exxon", "bp", "metro"]),
    (
        "Utilities",
        &["comcast", "xfinity", "verizon", "atandt", "electric", "water", "gas bill"],
    ),
    ("Shopping", &["amazon", "target", "best buy", "walmart.com", "costco"]),
    ("Entertainment", &["netflix", "spotify", "hulu", "steam", "playstation"]),
    ("Health", &["cvs", "walgreens", "rite aid", "pharmacy", "dental", "clinic"]),
    ("Housing", &["rent", "mortgage", "landlord"]),
    ("Income", &["payroll", "salary", "direct deposit", "stripe", "paypal"]),
    ("Other", &[]),
];

/// Ordered category → keyword mapping. Position in the list is the
/// precedence used when a description matches more than one category, so
/// the order is explicit and only changes through the methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleStore {
    categories: Vec<CategoryRule>,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock category set: groceries through housing, income, and an
    /// empty catch-all.
    pub fn with_defaults() -> Self {
        let categories = DEFAULT_RULES
            .iter()
            .map(|(name, keywords)| CategoryRule {
                name: name.to_string(),
                keywords: keywords.iter().map(|kw| normalize_text(kw)).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Parses `[[category]]` tables; file order becomes precedence order.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let file: RuleFile = toml::from_str(toml_content)
            .map_err(|e| ConfigError::InvalidConfig(format!("Failed to parse rules TOML: {e}")))?;
        let mut store = RuleStore::new();
        for rule in file.category {
            store.add_category(&rule.name, rule.keywords.iter().map(String::as_str))?;
        }
        Ok(store)
    }

    pub fn categories(&self) -> &[CategoryRule] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CategoryRule> {
        self.position(name).map(|i| &self.categories[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// First category, in precedence order, with a keyword inside
    /// `normalized_description`.
    pub fn first_match(&self, normalized_description: &str) -> Option<&CategoryRule> {
        self.categories
            .iter()
            .find(|rule| rule.matches(normalized_description))
    }

    /// Appends a new category at the lowest precedence.
    pub fn add_category<'a, I>(&mut self, name: &str, keywords: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let name = validate_name(name)?;
        if self.contains(&name) {
            return Err(ConfigError::DuplicateCategory(name));
        }
        let keywords = normalize_keywords(&name, keywords)?;
        self.categories.push(CategoryRule { name, keywords });
        Ok(())
    }

    /// Adds keywords to `category`, creating it at the lowest precedence if it
    /// does not exist. Returns the number of keywords that were new.
    pub fn add_rule<'a, I>(&mut self, category: &str, keywords: I) -> Result<usize, ConfigError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let name = validate_name(category)?;
        let keywords = normalize_keywords(&name, keywords)?;
        let idx = match self.position(&name) {
            Some(idx) => idx,
            None => {
                self.categories.push(CategoryRule {
                    name,
                    keywords: Vec::new(),
                });
                self.categories.len() - 1
            }
        };
        let rule = &mut self.categories[idx];
        let before = rule.keywords.len();
        for kw in keywords {
            if !rule.keywords.contains(&kw) {
                rule.keywords.push(kw);
            }
        }
        Ok(rule.keywords.len() - before)
    }

    pub fn remove_category(&mut self, name: &str) -> Result<CategoryRule, ConfigError> {
        let idx = self
            .position(name)
            .ok_or_else(|| ConfigError::UnknownCategory(name.to_string()))?;
        Ok(self.categories.remove(idx))
    }

    /// Returns `false` if the keyword was already present.
    pub fn add_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, ConfigError> {
        let idx = self
            .position(category)
            .ok_or_else(|| ConfigError::UnknownCategory(category.to_string()))?;
        let kw = normalize_keyword(&self.categories[idx].name, keyword)?;
        let rule = &mut self.categories[idx];
        if rule.keywords.contains(&kw) {
            return Ok(false);
        }
        rule.keywords.push(kw);
        Ok(true)
    }

    /// Returns `false` if the keyword was not present.
    pub fn remove_keyword(&mut self, category: &str, keyword: &str) -> Result<bool, ConfigError> {
        let idx = self
            .position(category)
            .ok_or_else(|| ConfigError::UnknownCategory(category.to_string()))?;
        let kw = normalize_text(keyword);
        let rule = &mut self.categories[idx];
        let before = rule.keywords.len();
        rule.keywords.retain(|k| *k != kw);
        Ok(rule.keywords.len() != before)
    }

    /// Moves `name` to `index` in precedence order, clamping to the end.
    pub fn move_category(&mut self, name: &str, index: usize) -> Result<(), ConfigError> {
        let from = self
            .position(name)
            .ok_or_else(|| ConfigError::UnknownCategory(name.to_string()))?;
        let rule = self.categories.remove(from);
        let to = index.min(self.categories.len());
        self.categories.insert(to, rule);
        Ok(())
    }

    /// Category names compare case-insensitively.
    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_lowercase();
        self.categories
            .iter()
            .position(|rule| rule.name.to_lowercase() == name)
    }
}

fn validate_name(name: &str) -> Result<String, ConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::EmptyCategoryName);
    }
    Ok(name.to_string())
}

fn normalize_keyword(category: &str, keyword: &str) -> Result<String, ConfigError> {
    let kw = normalize_text(keyword);
    if kw.is_empty() {
        return Err(ConfigError::EmptyKeyword(category.to_string()));
    }
    Ok(kw)
}

/// Validates every keyword before anything is applied, so a bad keyword
/// leaves the store untouched.
fn normalize_keywords<'a, I>(category: &str, keywords: I) -> Result<Vec<String>, ConfigError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out: Vec<String> = Vec::new();
    for kw in keywords {
        let kw = normalize_keyword(category, kw)?;
        if !out.contains(&kw) {
            out.push(kw);
        }
    }
    Ok(out)
}
