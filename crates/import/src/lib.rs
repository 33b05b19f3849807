pub mod categorize;
pub mod csv;
pub mod normalize;

pub use categorize::{categorize, Categorizer, Recompute};
pub use self::csv::{export_csv, read_rows, CsvError};
pub use normalize::{
    normalize_row, normalize_rows, parse_amount, parse_date, NormalizeReport, ParseError, RawRow,
    SkippedRow,
};
