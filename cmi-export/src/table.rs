//! Plain terminal table of journal rows, in input order

use cmi_core::JournalRow;
use comfy_table::{Cell, CellAlignment, Table, TableComponent};

use crate::HEADERS;

pub fn render(rows: &[JournalRow]) -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);

    table.set_header(HEADERS.to_vec());

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.date),
            Cell::new(&row.general_account),
            Cell::new(&row.third_party_account),
            Cell::new(&row.label),
            Cell::new(&row.debit).set_alignment(CellAlignment::Right),
            Cell::new(&row.credit).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str) -> JournalRow {
        JournalRow {
            date: "05/03/2025".into(),
            general_account: "61740000".into(),
            third_party_account: String::new(),
            label: label.into(),
            debit: "30,00".into(),
            credit: String::new(),
        }
    }

    #[test]
    fn test_render_keeps_input_order() {
        let rows = vec![row("ZULU"), row("ALPHA"), row("MIKE")];
        let out = render(&rows).to_string();

        let header = out.find("COMPTE GENERAL").unwrap();
        let z = out.find("ZULU").unwrap();
        let a = out.find("ALPHA").unwrap();
        let m = out.find("MIKE").unwrap();
        assert!(header < z && z < a && a < m);
    }

    #[test]
    fn test_render_column_order() {
        let out = render(&[row("LBL")]).to_string();
        let line = out.lines().find(|l| l.contains("LBL")).unwrap();
        let positions: Vec<usize> = ["05/03/2025", "61740000", "LBL", "30,00"]
            .iter()
            .map(|needle| line.find(needle).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_render_empty() {
        let out = render(&[]).to_string();
        assert!(out.contains("LIBELLE"));
        assert!(!out.contains("61740000"));
    }
}
