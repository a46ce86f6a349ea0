//! Fixed instruction text sent with every statement

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the model is asked to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Finished journal rows; the model applies the accounting rule itself
    Rows,
    /// Raw remittance figures; the accounting rule is applied locally
    #[default]
    Groups,
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMode::Rows => f.write_str("rows"),
            ExtractionMode::Groups => f.write_str("groups"),
        }
    }
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rows" => Ok(ExtractionMode::Rows),
            "groups" => Ok(ExtractionMode::Groups),
            other => Err(format!("unknown extraction mode '{other}' (expected rows or groups)")),
        }
    }
}

pub const RULE_TABLE: &str = "\
| Row kind | General account | Third-party account | Debit | Credit |
|---|---|---|---|---|
| Total Remittance | \"34210000\" | \"CMI\"+last5(terminal id) | empty | amount |
| Commission Excl. Tax | \"61740000\" | empty | amount | empty |
| VAT on Commission | \"34552010\" | empty | amount | empty |
| Net Settlement Balance | \"34210000\" | \"CMI\"+last5(terminal id) | amount | empty |";

const CONTEXT: &str = "\
You are an accounting assistant. The attached document is a card-payment settlement \
statement (CMI). It lists, per payment terminal (TPE), one or more remittances \
(remises). For each remittance it shows the remittance total, the commission \
excluding tax (commission HT), the VAT on that commission (TVA) and the net amount \
settled to the merchant.";

const AMOUNTS: &str = "\
Write every amount exactly as a French decimal-comma number with two decimals and \
spaces as thousands separators, for example \"1 234,56\". Never use a decimal point. \
Dates are DD/MM/YYYY.";

const ROWS_TASK: &str = "\
Produce accounting-journal entries. For every remittance of every terminal emit \
exactly four rows, in this order, following this table:";

const ROWS_FIELDS: &str = "\
Field rules:
- date: the remittance date, DD/MM/YYYY.
- compteGeneral: the general account from the table.
- compteTier: \"CMI\" followed by the last five digits of the terminal id where the \
table says so, otherwise an empty string.
- libelle: \"TPE <terminal id> REM <remittance number>\", then \"CARTE <card number \
fragment>\" when the statement prints one, then the row description: \"TOTAL REMISE\", \
\"COMMISSION HT\", \"TVA SUR COMMISSION\" or \"SOLDE NET REMISE\".
- debit / credit: the amount on the side given by the table; the other side is an \
empty string.
Return only the JSON array of rows.";

const GROUPS_TASK: &str = "\
Extract the figures of every remittance of every terminal, in the order they appear. \
They will be booked with this table, so report each figure separately and do not \
compute the journal yourself:";

const GROUPS_FIELDS: &str = "\
Field rules:
- date: the remittance date, DD/MM/YYYY.
- terminalId: the full terminal (TPE) number, digits only.
- remittanceNumber: the remittance number as printed.
- cardFragment: the masked card number fragment when printed, otherwise an empty string.
- totalRemittance: the remittance total.
- commissionHT: the commission excluding tax.
- vatOnCommission: the VAT on the commission.
- netBalance: the net amount settled.
Return only the JSON array of remittances.";

/// The complete instruction for `mode`. Both variants embed the rule table.
pub fn instruction(mode: ExtractionMode) -> String {
    let (task, fields) = match mode {
        ExtractionMode::Rows => (ROWS_TASK, ROWS_FIELDS),
        ExtractionMode::Groups => (GROUPS_TASK, GROUPS_FIELDS),
    };
    format!("{CONTEXT}\n\n{task}\n\n{RULE_TABLE}\n\n{fields}\n\n{AMOUNTS}\n")
}
