//! Free-text questions about the ledger.
//!
//! A question is parsed in one pass into an optional category, an optional
//! month range and a metric. Nothing here fails: any dimension that cannot be
//! resolved falls back to its default (all categories, the whole ledger,
//! spend), so every question gets an answer, possibly a broader one.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tally_core::{contains_phrase, contains_word_prefix, normalize_text, Money, MonthKey, MonthRange, RuleStore};

use crate::aggregate::AggregateRow;
use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Spend,
    Income,
    Net,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub raw_text: String,
    /// `None` means all categories.
    pub category: Option<String>,
    /// `None` means the whole ledger.
    pub time_range: Option<MonthRange>,
    pub metric: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub query: Query,
    pub outcome: Outcome<Money>,
    pub text: String,
}

const NET_WORDS: &[&str] = &["net", "balance", "saved", "savings", "save"];
const INCOME_WORDS: &[&str] = &[
    "income", "earn", "earned", "earnings", "received", "receive", "made", "make",
];
const SPEND_WORDS: &[&str] = &[
    "spend", "spent", "spending", "expense", "expenses", "cost", "costs", "paid", "pay",
];

/// Words that put a bare "may" in month position ("in may", "from may").
/// Anywhere else it is read as the verb.
const MAY_LEAD_WORDS: &[&str] = &[
    "in", "during", "for", "of", "from", "to", "through", "until", "since", "between", "and",
    "or", "by", "last", "this",
];

const NUMBER_WORDS: [&str; 12] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve",
];

// ── compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_last_n_months,
    r"\b(?:last|past|previous)\s+(\d{1,3}|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s+months?\b");
re!(re_last_month, r"\b(?:last|previous|past)\s+month\b");
re!(re_this_month, r"\b(?:this|current)\s+month\b");
re!(re_this_year, r"\b(?:this|current)\s+year\b");
re!(re_last_year, r"\b(?:last|previous|past)\s+year\b");
re!(re_month_name,
    r"\b(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)(?:\s+(\d{4}))?\b");
re!(re_bare_year, r"\b((?:19|20)\d{2})\b");

// ── parsing ──────────────────────────────────────────────────────────────────

/// Net words win over income words, which win over spend words; spend is the
/// default.
fn extract_metric(normalized: &str) -> Metric {
    let mentions = |words: &[&str]| words.iter().any(|w| contains_phrase(normalized, w));
    if mentions(NET_WORDS) {
        Metric::Net
    } else if mentions(INCOME_WORDS) {
        Metric::Income
    } else if mentions(SPEND_WORDS) {
        Metric::Spend
    } else {
        Metric::default()
    }
}

/// First rule, in precedence order, whose name or one of whose keywords
/// starts a word of the question; then any other category present in the
/// ledger. Word ends stay open so possessives and plurals still hit.
fn extract_category(normalized: &str, rules: &RuleStore, rows: &[AggregateRow]) -> Option<String> {
    let from_rules = rules.categories().iter().find(|rule| {
        contains_word_prefix(normalized, &normalize_text(&rule.name))
            || rule.keywords.iter().any(|kw| contains_word_prefix(normalized, kw))
    });
    if let Some(rule) = from_rules {
        return Some(rule.name.clone());
    }
    rows.iter()
        .map(|row| row.category.as_str())
        .find(|category| contains_word_prefix(normalized, &normalize_text(category)))
        .map(str::to_string)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?;
    let index = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ]
    .iter()
    .position(|m| *m == prefix)?;
    Some(index as u32 + 1)
}

fn parse_count(token: &str) -> Option<i64> {
    if let Ok(n) = token.parse::<i64>() {
        return Some(n);
    }
    NUMBER_WORDS
        .iter()
        .position(|w| *w == token)
        .map(|i| i as i64 + 1)
}

/// The most recent occurrence of `month` at or before `current`.
fn latest_month(month: u32, current: MonthKey) -> Option<MonthKey> {
    let year = if month > current.month() {
        current.year() - 1
    } else {
        current.year()
    };
    MonthKey::new(year, month)
}

struct MonthMention {
    month: u32,
    year: Option<i32>,
}

fn may_is_month(before: &str) -> bool {
    before
        .split_whitespace()
        .next_back()
        .is_some_and(|word| MAY_LEAD_WORDS.contains(&word))
}

fn month_mentions(normalized: &str) -> Vec<MonthMention> {
    re_month_name()
        .captures_iter(normalized)
        .filter_map(|caps| {
            let name = caps.get(1)?;
            let year: Option<i32> = caps.get(2).and_then(|y| y.as_str().parse().ok());
            if name.as_str() == "may" && year.is_none() && !may_is_month(&normalized[..name.start()]) {
                return None;
            }
            let month = month_number(name.as_str())?;
            Some(MonthMention { month, year })
        })
        .take(2)
        .collect()
}

fn resolve_mentions(mentions: &[MonthMention], current: Option<MonthKey>) -> Option<MonthRange> {
    let resolve = |mention: &MonthMention| match mention.year {
        Some(year) => MonthKey::new(year, mention.month),
        None => latest_month(mention.month, current?),
    };
    match mentions {
        [only] => resolve(only).map(MonthRange::single),
        [first, second] => {
            let end = resolve(second)?;
            let start = match first.year {
                Some(_) => resolve(first)?,
                // "from november to february 2024" starts in the year before.
                None if second.year.is_some() => {
                    let same_year = MonthKey::new(end.year(), first.month)?;
                    if same_year > end {
                        MonthKey::new(end.year() - 1, first.month)?
                    } else {
                        same_year
                    }
                }
                None => resolve(first)?,
            };
            Some(MonthRange::new(start, end))
        }
        _ => None,
    }
}

fn year_range(year: i32) -> Option<MonthRange> {
    Some(MonthRange::new(MonthKey::new(year, 1)?, MonthKey::new(year, 12)?))
}

/// Relative phrases are resolved against `current`; without a current month
/// only explicit years can be resolved.
fn extract_time_range(normalized: &str, current: Option<MonthKey>) -> Option<MonthRange> {
    if let Some(caps) = re_last_n_months().captures(normalized) {
        let n = caps.get(1).and_then(|m| parse_count(m.as_str()))?;
        if n > 0 {
            let current = current?;
            return Some(MonthRange::new(current.offset(1 - n), current));
        }
    }
    if re_last_month().is_match(normalized) {
        return current.map(|c| MonthRange::single(c.pred()));
    }
    if re_this_month().is_match(normalized) {
        return current.map(MonthRange::single);
    }

    let mentions = month_mentions(normalized);
    if !mentions.is_empty() {
        return resolve_mentions(&mentions, current);
    }

    if re_last_year().is_match(normalized) {
        return year_range(current?.year() - 1);
    }
    if re_this_year().is_match(normalized) {
        let current = current?;
        return Some(MonthRange::new(MonthKey::new(current.year(), 1)?, current));
    }
    re_bare_year()
        .captures(normalized)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
        .and_then(year_range)
}

/// Parses a question. `rows` supplies categories that exist in the ledger but
/// not in the rule store; `current_month` anchors relative time phrases.
pub fn parse_query(
    text: &str,
    rules: &RuleStore,
    rows: &[AggregateRow],
    current_month: Option<MonthKey>,
) -> Query {
    let normalized = normalize_text(text);
    let query = Query {
        raw_text: text.to_string(),
        category: extract_category(&normalized, rules, rows),
        time_range: extract_time_range(&normalized, current_month),
        metric: extract_metric(&normalized),
    };
    tracing::debug!(
        category = ?query.category,
        range = ?query.time_range,
        metric = ?query.metric,
        "Parsed question"
    );
    query
}

// ── answering ────────────────────────────────────────────────────────────────

fn scope_phrase(query: &Query) -> String {
    match query.time_range {
        Some(range) => range.describe(),
        None => "across all months".to_string(),
    }
}

fn render(query: &Query, value: Money) -> String {
    let scope = scope_phrase(query);
    match (query.metric, query.category.as_deref()) {
        (Metric::Spend, Some(c)) => format!("You spent {value} on {c} {scope}."),
        (Metric::Spend, None) => format!("You spent {value} {scope}."),
        (Metric::Income, Some(c)) => format!("You received {value} from {c} {scope}."),
        (Metric::Income, None) => format!("You received {value} {scope}."),
        (Metric::Net, Some(c)) => format!("Your net was {value} for {c} {scope}."),
        (Metric::Net, None) => format!("Your net was {value} {scope}."),
    }
}

fn render_no_data(query: &Query) -> String {
    let scope = scope_phrase(query);
    match query.category.as_deref() {
        Some(c) => format!("No matching transactions for {c} {scope}."),
        None => format!("No matching transactions {scope}."),
    }
}

/// Sums the query's metric over matching rows. No matching rows is reported
/// as no data, never as a zero total.
pub fn answer(query: &Query, rows: &[AggregateRow]) -> QueryAnswer {
    let matching: Vec<&AggregateRow> = rows
        .iter()
        .filter(|row| {
            query
                .category
                .as_deref()
                .map_or(true, |c| row.category.eq_ignore_ascii_case(c))
        })
        .filter(|row| query.time_range.map_or(true, |r| r.contains(row.month)))
        .collect();

    if matching.is_empty() {
        return QueryAnswer {
            query: query.clone(),
            outcome: Outcome::NoData,
            text: render_no_data(query),
        };
    }

    let value: Money = matching
        .iter()
        .map(|row| match query.metric {
            Metric::Spend => row.total_spend,
            Metric::Income => row.total_income,
            Metric::Net => row.net(),
        })
        .sum();

    QueryAnswer {
        query: query.clone(),
        outcome: Outcome::Data(value),
        text: render(query, value),
    }
}

/// Parse and answer in one step.
pub fn ask(
    text: &str,
    rules: &RuleStore,
    rows: &[AggregateRow],
    current_month: Option<MonthKey>,
) -> QueryAnswer {
    answer(&parse_query(text, rules, rows, current_month), rows)
}
