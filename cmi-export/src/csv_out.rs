//! Semicolon-separated export for ledger software that imports CSV.
//!
//! Amounts are normalized to an ungrouped decimal comma (`1234,56`).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cmi_core::JournalRow;
use log::info;

use crate::{parse_amounts, ExportError, HEADERS};

pub const DEFAULT_FILE_NAME: &str = "ecritures_cmi.csv";

pub fn write_csv<W: Write>(rows: &[JournalRow], writer: W) -> Result<(), ExportError> {
    let amounts = parse_amounts(rows)?;

    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    wtr.write_record(HEADERS)?;

    for (row, (debit, credit)) in rows.iter().zip(&amounts) {
        let debit = debit.map(|a| a.to_plain()).unwrap_or_default();
        let credit = credit.map(|a| a.to_plain()).unwrap_or_default();
        wtr.write_record([
            row.date.as_str(),
            row.general_account.as_str(),
            row.third_party_account.as_str(),
            row.label.as_str(),
            debit.as_str(),
            credit.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn save_csv(rows: &[JournalRow], path: &Path) -> Result<(), ExportError> {
    // validate before creating the file so a bad amount leaves nothing behind
    parse_amounts(rows)?;
    let file = File::create(path)?;
    write_csv(rows, file)?;
    info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
