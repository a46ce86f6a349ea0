use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use cmi_core::{journalize, Amount, JournalRow, RemittanceGroup};
use cmi_export::xlsx::{write_workbook, DEFAULT_SHEET_NAME};
use cmi_export::{render, ExportError, HEADERS};

fn group(terminal: &str, remittance: &str) -> RemittanceGroup {
    RemittanceGroup {
        date: "05/03/2025".to_string(),
        terminal_id: terminal.to_string(),
        remittance_number: remittance.to_string(),
        card_fragment: String::new(),
        total_remittance: Amount::from_cents(123_456),
        commission_excl_tax: Amount::from_cents(1_852),
        vat_on_commission: Amount::from_cents(370),
        net_balance: Amount::from_cents(121_234),
    }
}

fn read_sheet(bytes: Vec<u8>) -> Range<Data> {
    let mut wb: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).expect("readable xlsx");
    assert_eq!(wb.sheet_names(), vec![DEFAULT_SHEET_NAME.to_string()]);
    wb.worksheet_range(DEFAULT_SHEET_NAME).expect("sheet present")
}

fn cell(range: &Range<Data>, row: usize, col: usize) -> Data {
    range.get((row, col)).cloned().unwrap_or(Data::Empty)
}

/// Two terminals, four rows each: header + 8 rows, accounts per the rule table.
#[test]
fn two_terminal_export() {
    let rows = journalize(&[group("00011122233", "1"), group("00044455566", "2")]);
    assert_eq!(rows.len(), 8);

    let range = read_sheet(write_workbook(&rows, DEFAULT_SHEET_NAME).unwrap());
    assert_eq!(range.get_size(), (9, 6));

    for (col, header) in HEADERS.iter().enumerate() {
        assert_eq!(cell(&range, 0, col), Data::String(header.to_string()));
    }

    let expected = [
        ("34210000", "CMI22233"),
        ("61740000", ""),
        ("34552010", ""),
        ("34210000", "CMI22233"),
        ("34210000", "CMI55566"),
        ("61740000", ""),
        ("34552010", ""),
        ("34210000", "CMI55566"),
    ];
    for (i, (general, tier)) in expected.iter().enumerate() {
        let r = i + 1;
        assert_eq!(cell(&range, r, 1), Data::String(general.to_string()), "row {r}");
        let tier_cell = cell(&range, r, 2);
        if tier.is_empty() {
            assert_eq!(tier_cell, Data::Empty, "row {r}");
        } else {
            assert_eq!(tier_cell, Data::String(tier.to_string()), "row {r}");
        }
    }

    // rendered table shows the same 8 rows in the same order
    let table = render(&rows).to_string();
    let positions: Vec<usize> = rows.iter().map(|r| table.find(&r.label).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn amounts_are_numeric_and_empty_stays_empty() {
    let rows = vec![JournalRow {
        date: "05/03/2025".into(),
        general_account: "61740000".into(),
        third_party_account: String::new(),
        label: "TPE 1 REM 1 COMMISSION HT".into(),
        debit: "1 234,56".into(),
        credit: String::new(),
    }];

    let range = read_sheet(write_workbook(&rows, DEFAULT_SHEET_NAME).unwrap());
    assert_eq!(cell(&range, 1, 4), Data::Float(1234.56));
    assert_eq!(cell(&range, 1, 5), Data::Empty);
    assert_eq!(cell(&range, 1, 0), Data::String("05/03/2025".into()));
}

#[test]
fn re_export_is_identical() {
    let rows = journalize(&[group("00011122233", "1"), group("123", "9")]);
    let first = read_sheet(write_workbook(&rows, DEFAULT_SHEET_NAME).unwrap());
    let second = read_sheet(write_workbook(&rows, DEFAULT_SHEET_NAME).unwrap());

    assert_eq!(first.get_size(), second.get_size());
    let a: Vec<Vec<Data>> = first.rows().map(|r| r.to_vec()).collect();
    let b: Vec<Vec<Data>> = second.rows().map(|r| r.to_vec()).collect();
    assert_eq!(a, b);
}

#[test]
fn zero_rows_export_header_only() {
    let range = read_sheet(write_workbook(&[], DEFAULT_SHEET_NAME).unwrap());
    assert_eq!(range.get_size(), (1, 6));
}

#[test]
fn malformed_amount_fails_closed() {
    let mut rows = journalize(&[group("00011122233", "1")]);
    rows[2].debit = "3.70".to_string();

    match write_workbook(&rows, DEFAULT_SHEET_NAME) {
        Err(ExportError::Amount { row, column, .. }) => {
            assert_eq!(row, 3);
            assert_eq!(column, "DEBIT");
        }
        other => panic!("expected amount error, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn rows_json_round_trip_into_export() {
    let json = serde_json::to_string(&journalize(&[group("00011122233", "1")])).unwrap();
    let rows: Vec<JournalRow> = serde_json::from_str(&json).unwrap();
    let range = read_sheet(write_workbook(&rows, DEFAULT_SHEET_NAME).unwrap());
    assert_eq!(cell(&range, 1, 5), Data::Float(1234.56));
    assert_eq!(cell(&range, 4, 4), Data::Float(1212.34));
}
