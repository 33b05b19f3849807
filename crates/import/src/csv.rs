use std::io::{Read, Write};
use tally_core::Transaction;
use thiserror::Error;

use crate::normalize::RawRow;

pub const DATE_HEADER: &str = "Date";
pub const DESCRIPTION_HEADER: &str = "Description";
pub const AMOUNT_HEADER: &str = "Amount";
pub const CATEGORY_HEADER: &str = "Category";

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}

struct ColumnMapping {
    date: usize,
    description: usize,
    amount: usize,
}

impl ColumnMapping {
    /// Header names match case-insensitively, ignoring surrounding whitespace.
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, CsvError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(CsvError::MissingColumn(name))
        };
        Ok(ColumnMapping {
            date: find(DATE_HEADER)?,
            description: find(DESCRIPTION_HEADER)?,
            amount: find(AMOUNT_HEADER)?,
        })
    }
}

/// Reads `Date`, `Description` and `Amount` columns from a headed CSV.
/// Other columns are ignored. Cell values are not interpreted here, so a bad
/// date or amount surfaces later as a skipped row rather than a file error.
pub fn read_rows<R: Read>(data: R) -> Result<Vec<RawRow>, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let mapping = ColumnMapping::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        rows.push(RawRow {
            date: field(mapping.date),
            description: field(mapping.description),
            amount: field(mapping.amount),
        });
    }

    tracing::debug!(rows = rows.len(), "Read ledger CSV");
    Ok(rows)
}

/// Writes the input columns plus `Category`. Dates are written as ISO
/// `YYYY-MM-DD`, descriptions as originally supplied, amounts with the scale
/// they were parsed with.
pub fn export_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([DATE_HEADER, DESCRIPTION_HEADER, AMOUNT_HEADER, CATEGORY_HEADER])?;
    for tx in transactions {
        writer.write_record([
            tx.date.format("%Y-%m-%d").to_string(),
            tx.raw_description.clone(),
            tx.amount.as_decimal().to_string(),
            tx.category.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_rows;
    use tally_core::UNCATEGORIZED;

    #[test]
    fn read_rows_by_header_name() {
        let data = b"Amount,Memo,Description,Date\n-15.49,x,NETFLIX.COM,2024-07-01\n2500,,Payroll,2024-07-02\n";
        let rows = read_rows(data.as_ref()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], RawRow::new("2024-07-01", "NETFLIX.COM", "-15.49"));
        assert_eq!(rows[1].amount, "2500");
    }

    #[test]
    fn read_rows_header_case_insensitive() {
        let data = b" date ,DESCRIPTION,amount\n2024-07-01,Kroger,-20\n";
        let rows = read_rows(data.as_ref()).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn read_rows_missing_column() {
        let data = b"Date,Description\n2024-07-01,Kroger\n";
        assert!(matches!(
            read_rows(data.as_ref()),
            Err(CsvError::MissingColumn("Amount"))
        ));
    }

    #[test]
    fn read_rows_skips_blank_lines_and_keeps_short_rows() {
        let data = b"Date,Description,Amount\n,,\n2024-07-01,Kroger\n";
        let rows = read_rows(data.as_ref()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, "");
    }

    #[test]
    fn read_rows_empty_body_is_not_an_error() {
        let rows = read_rows(b"Date,Description,Amount\n".as_ref()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn export_preserves_financial_fields() {
        let input = "Date,Description,Amount\n2024-07-01,\"Whole Foods, Austin\",-45.10\n2024-07-02,Payroll,2500.00\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        let txs: Vec<_> = normalize_rows(&rows)
            .transactions
            .into_iter()
            .map(|t| t.into_categorized(UNCATEGORIZED.to_string()))
            .collect();

        let mut out = Vec::new();
        export_csv(&mut out, &txs).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Date,Description,Amount,Category\n\
             2024-07-01,\"Whole Foods, Austin\",-45.10,Other\n\
             2024-07-02,Payroll,2500.00,Other\n"
        );

        let again = read_rows(text.as_bytes()).unwrap();
        assert_eq!(again, rows);
    }
}
