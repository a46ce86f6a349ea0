//! cmi-export: terminal table, xlsx workbook and csv output for journal rows

pub mod csv_out;
pub mod table;
pub mod xlsx;

use cmi_core::{Amount, AmountError, JournalRow};
use thiserror::Error;

/// Column headers, in display and export order
pub const HEADERS: [&str; 6] = ["DATE", "COMPTE GENERAL", "COMPTE TIER", "LIBELLE", "DEBIT", "CREDIT"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("row {row}: {column} '{value}' is not a valid amount: {source}")]
    Amount {
        row: usize,
        column: &'static str,
        value: String,
        #[source]
        source: AmountError,
    },

    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Debit and credit of one row, parsed; `None` for an empty cell.
pub type RowAmounts = (Option<Amount>, Option<Amount>);

/// Parse every debit/credit cell up front so that a single malformed amount
/// stops the export before anything is written. Rows are numbered from 1.
pub fn parse_amounts(rows: &[JournalRow]) -> Result<Vec<RowAmounts>, ExportError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let parse = |column: &'static str, value: &str| {
                Amount::parse_optional(value).map_err(|source| ExportError::Amount {
                    row: i + 1,
                    column,
                    value: value.to_string(),
                    source,
                })
            };
            Ok((parse("DEBIT", &row.debit)?, parse("CREDIT", &row.credit)?))
        })
        .collect()
}

pub use table::render;
pub use xlsx::{save_workbook, write_workbook};

#[cfg(test)]
mod tests {
    use super::*;

    fn row(debit: &str, credit: &str) -> JournalRow {
        JournalRow {
            date: "05/03/2025".into(),
            general_account: "34210000".into(),
            third_party_account: "CMI12345".into(),
            label: "TPE 12345 REM 1 TOTAL REMISE".into(),
            debit: debit.into(),
            credit: credit.into(),
        }
    }

    #[test]
    fn test_parse_amounts() {
        let got = parse_amounts(&[row("", "1 234,56"), row("18,52", "")]).unwrap();
        assert_eq!(got[0], (None, Some(Amount::from_cents(123_456))));
        assert_eq!(got[1], (Some(Amount::from_cents(1_852)), None));
    }

    #[test]
    fn test_parse_amounts_fails_closed() {
        let err = parse_amounts(&[row("", "1,00"), row("12.50", "")]).unwrap_err();
        match err {
            ExportError::Amount { row, column, value, .. } => {
                assert_eq!((row, column, value.as_str()), (2, "DEBIT", "12.50"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
