//! Excel workbook export.
//!
//! One sheet, a bold header row, fixed column widths. Debit and credit are
//! written as numbers with `#,##0.00`; an empty amount stays an empty cell.

use std::path::Path;

use cmi_core::JournalRow;
use log::info;
use rust_xlsxwriter::{Format, Workbook};

use crate::{parse_amounts, ExportError, HEADERS};

pub const DEFAULT_FILE_NAME: &str = "ecritures_cmi.xlsx";
pub const DEFAULT_SHEET_NAME: &str = "Releve CMI";
pub const NUMBER_FORMAT: &str = "#,##0.00";

/// Column widths in character units, aligned with `HEADERS`
pub const COLUMN_WIDTHS: [f64; 6] = [15.0, 20.0, 20.0, 80.0, 15.0, 15.0];

const DEBIT_COL: u16 = 4;
const CREDIT_COL: u16 = 5;

/// Build the workbook for `rows`. Fails before writing anything if an amount is malformed.
pub fn build_workbook(rows: &[JournalRow], sheet_name: &str) -> Result<Workbook, ExportError> {
    let amounts = parse_amounts(rows)?;

    let header_format = Format::new().set_bold();
    let number_format = Format::new().set_num_format(NUMBER_FORMAT);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, *header, &header_format)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (i, (row, (debit, credit))) in rows.iter().zip(&amounts).enumerate() {
        let r = (i + 1) as u32;

        let text = [&row.date, &row.general_account, &row.third_party_account, &row.label];
        for (col, value) in text.iter().enumerate() {
            if !value.is_empty() {
                sheet.write_string(r, col as u16, value.as_str())?;
            }
        }

        if let Some(a) = debit {
            sheet.write_number_with_format(r, DEBIT_COL, a.as_f64(), &number_format)?;
        }
        if let Some(a) = credit {
            sheet.write_number_with_format(r, CREDIT_COL, a.as_f64(), &number_format)?;
        }
    }

    Ok(workbook)
}

/// Workbook bytes for `rows`
pub fn write_workbook(rows: &[JournalRow], sheet_name: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(rows, sheet_name)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn save_workbook(rows: &[JournalRow], sheet_name: &str, path: &Path) -> Result<(), ExportError> {
    let mut workbook = build_workbook(rows, sheet_name)?;
    workbook.save(path)?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(COLUMN_WIDTHS.len(), HEADERS.len());
        assert_eq!(HEADERS[DEBIT_COL as usize], "DEBIT");
        assert_eq!(HEADERS[CREDIT_COL as usize], "CREDIT");
    }

    #[test]
    fn test_invalid_sheet_name() {
        assert!(matches!(
            build_workbook(&[], "bad[name]"),
            Err(ExportError::Xlsx(_))
        ));
    }
}
