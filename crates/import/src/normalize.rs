use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tally_core::{normalize_text, Money, UncategorizedTransaction};
use thiserror::Error;

/// One input row exactly as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    pub date: String,
    pub description: String,
    pub amount: String,
}

impl RawRow {
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: impl ToString) -> Self {
        RawRow {
            date: date.into(),
            description: description.into(),
            amount: amount.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
}

/// A row left out of the analysis set, with its 1-based position in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub raw: RawRow,
    pub error: ParseError,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeReport {
    pub transactions: Vec<UncategorizedTransaction>,
    pub skipped: Vec<SkippedRow>,
}

impl NormalizeReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

const SHORT_YEAR_FORMATS: &[&str] = &["%m/%d/%y", "%d/%m/%y", "%m-%d-%y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Tries the common ledger date layouts, month-first before day-first.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    let s = s.trim();

    // %Y happily reads "24" as the year 24, so four-digit forms must yield a
    // plausible year before the two-digit forms get a chance.
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if date.year() >= 1000 {
                return Ok(date);
            }
        }
    }

    for fmt in SHORT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        if let (Ok(y), Ok(m), Ok(d)) = (s[..4].parse(), s[4..6].parse(), s[6..].parse()) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Ok(date);
            }
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.date_naive());
    }

    Err(ParseError::InvalidDate(s.to_string()))
}

/// Signed decimal from ledger text. Accepts `$`, thousands separators,
/// a leading `+`, a trailing `-`, and accounting parentheses for negatives.
pub fn parse_amount(s: &str) -> Result<Money, ParseError> {
    let original = s.trim();
    let (paren_negative, inner) = if original.starts_with('(') && original.ends_with(')') {
        (true, &original[1..original.len() - 1])
    } else {
        (false, original)
    };
    let (trailing_negative, inner) = match inner.strip_suffix('-') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let cleaned = inner.replace([',', '$', ' '], "");
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    let mut dec = Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| ParseError::InvalidAmount(original.to_string()))?;
    if paren_negative || trailing_negative {
        dec = -dec.abs();
    }
    Ok(Money::new(dec))
}

/// Parses one row into a transaction shell; category is assigned later.
pub fn normalize_row(row: &RawRow) -> Result<UncategorizedTransaction, ParseError> {
    let date = parse_date(&row.date)?;
    let amount = parse_amount(&row.amount)?;
    Ok(UncategorizedTransaction {
        date,
        raw_description: row.description.clone(),
        normalized_description: normalize_text(&row.description),
        amount,
    })
}

/// Normalizes every row, collecting the ones that fail instead of aborting.
pub fn normalize_rows<'a, I>(rows: I) -> NormalizeReport
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut report = NormalizeReport::default();
    for (idx, row) in rows.into_iter().enumerate() {
        match normalize_row(row) {
            Ok(tx) => report.transactions.push(tx),
            Err(error) => {
                tracing::warn!("Skipping row {}: {error}", idx + 1);
                report.skipped.push(SkippedRow {
                    row: idx + 1,
                    raw: row.clone(),
                    error,
                });
            }
        }
    }
    tracing::debug!(
        parsed = report.transactions.len(),
        skipped = report.skipped.len(),
        "Normalized ledger rows"
    );
    report
}
