//! Response-shape constraint sent alongside the instruction.
//!
//! Uses the OpenAPI subset understood by the generation endpoint: an `ARRAY`
//! of `OBJECT`s whose properties are all required `STRING`s.

use serde_json::{json, Map, Value};

use crate::prompt::ExtractionMode;

/// Journal row fields, in column order
pub const ROW_FIELDS: [(&str, &str); 6] = [
    ("date", "Remittance date, DD/MM/YYYY"),
    ("compteGeneral", "General ledger account"),
    ("compteTier", "Third-party account or empty string"),
    ("libelle", "Row label"),
    ("debit", "Debit amount with decimal comma, or empty string"),
    ("credit", "Credit amount with decimal comma, or empty string"),
];

/// Remittance group fields
pub const GROUP_FIELDS: [(&str, &str); 8] = [
    ("date", "Remittance date, DD/MM/YYYY"),
    ("terminalId", "Terminal (TPE) number"),
    ("remittanceNumber", "Remittance number"),
    ("cardFragment", "Masked card number fragment or empty string"),
    ("totalRemittance", "Remittance total with decimal comma"),
    ("commissionHT", "Commission excluding tax with decimal comma"),
    ("vatOnCommission", "VAT on commission with decimal comma"),
    ("netBalance", "Net settled amount with decimal comma"),
];

fn array_of_string_objects(fields: &[(&str, &str)]) -> Value {
    let mut properties = Map::new();
    for (name, description) in fields {
        properties.insert(
            name.to_string(),
            json!({ "type": "STRING", "description": description }),
        );
    }
    let names: Vec<&str> = fields.iter().map(|(n, _)| *n).collect();

    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": properties,
            "required": names,
            "propertyOrdering": names,
        }
    })
}

pub fn response_schema(mode: ExtractionMode) -> Value {
    match mode {
        ExtractionMode::Rows => array_of_string_objects(&ROW_FIELDS),
        ExtractionMode::Groups => array_of_string_objects(&GROUP_FIELDS),
    }
}
