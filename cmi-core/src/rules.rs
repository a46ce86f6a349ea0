//! Settlement accounting rule: four journal rows per terminal remittance.
//!
//! | Row kind               | General  | Third party        | Debit  | Credit |
//! |------------------------|----------|--------------------|--------|--------|
//! | Total Remittance       | 34210000 | CMI + last5(TPE)   |        | amount |
//! | Commission Excl. Tax   | 61740000 |                    | amount |        |
//! | VAT on Commission      | 34552010 |                    | amount |        |
//! | Net Settlement Balance | 34210000 | CMI + last5(TPE)   | amount |        |

use chrono::NaiveDate;
use log::warn;
use thiserror::Error;

use crate::amount::{Amount, AmountError};
use crate::model::{JournalRow, RemittanceGroup, RowKind, Side, THIRD_PARTY_PREFIX};

/// `CMI` followed by the last five digits of the terminal id.
///
/// Non-digit characters are ignored; ids shorter than five digits are used whole.
pub fn third_party_account(terminal_id: &str) -> String {
    let digits: Vec<char> = terminal_id.chars().filter(|c| c.is_ascii_digit()).collect();
    let start = digits.len().saturating_sub(5);
    let tail: String = digits[start..].iter().collect();
    format!("{THIRD_PARTY_PREFIX}{tail}")
}

/// Label for one row, e.g. `TPE 00012345678 REM 000451 CARTE 4111XXXXXXXX1111 TOTAL REMISE`
pub fn row_label(group: &RemittanceGroup, kind: RowKind) -> String {
    let mut parts = Vec::with_capacity(4);
    if !group.terminal_id.trim().is_empty() {
        parts.push(format!("TPE {}", group.terminal_id.trim()));
    }
    if !group.remittance_number.trim().is_empty() {
        parts.push(format!("REM {}", group.remittance_number.trim()));
    }
    if !group.card_fragment.trim().is_empty() {
        parts.push(format!("CARTE {}", group.card_fragment.trim()));
    }
    parts.push(kind.label().to_string());
    parts.join(" ")
}

fn row_for(group: &RemittanceGroup, kind: RowKind) -> JournalRow {
    let amount = group.amount_for(kind).to_string();
    let (debit, credit) = match kind.side() {
        Side::Debit => (amount, String::new()),
        Side::Credit => (String::new(), amount),
    };

    JournalRow {
        date: group.date.trim().to_string(),
        general_account: kind.general_account().to_string(),
        third_party_account: if kind.uses_third_party() {
            third_party_account(&group.terminal_id)
        } else {
            String::new()
        },
        label: row_label(group, kind),
        debit,
        credit,
    }
}

/// Apply the accounting rule. Groups keep their input order; each yields
/// exactly four rows in `RowKind::ALL` order.
pub fn journalize(groups: &[RemittanceGroup]) -> Vec<JournalRow> {
    let mut rows = Vec::with_capacity(groups.len() * RowKind::ALL.len());

    for group in groups {
        if NaiveDate::parse_from_str(group.date.trim(), "%d/%m/%Y").is_err() {
            warn!(
                "remittance {} on terminal {}: date '{}' is not DD/MM/YYYY",
                group.remittance_number, group.terminal_id, group.date
            );
        }

        let gap = group.balance_gap();
        if gap != 0 {
            warn!(
                "remittance {} on terminal {}: total minus commission, VAT and net is off by {}",
                group.remittance_number,
                group.terminal_id,
                Amount::from_cents(gap)
            );
        }

        rows.extend(RowKind::ALL.iter().map(|kind| row_for(group, *kind)));
    }

    rows
}

/// A way in which a row list departs from the accounting rule
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleViolation {
    #[error("{rows} rows is not a whole number of four-row groups")]
    IncompleteGroup { rows: usize },

    #[error("row {row} ({kind:?}): general account {found:?}, expected {expected:?}")]
    GeneralAccount {
        row: usize,
        kind: RowKind,
        expected: &'static str,
        found: String,
    },

    #[error("row {row} ({kind:?}): unexpected third-party account {found:?}")]
    ThirdParty { row: usize, kind: RowKind, found: String },

    #[error("row {row}: third-party account {found:?} differs from the group's {expected:?}")]
    ThirdPartyMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    #[error("row {row} ({kind:?}): amount must be on the {expected:?} side only")]
    WrongSide { row: usize, kind: RowKind, expected: Side },

    #[error("row {row}: {column} {error}")]
    Amount {
        row: usize,
        column: &'static str,
        error: AmountError,
    },
}

fn is_third_party_code(s: &str) -> bool {
    s.strip_prefix(THIRD_PARTY_PREFIX)
        .is_some_and(|tail| !tail.is_empty() && tail.len() <= 5 && tail.chars().all(|c| c.is_ascii_digit()))
}

/// Check a row list produced elsewhere (typically by the model) against the rule table.
///
/// Rows are numbered from 1. An empty list has no violations.
pub fn check_rows(rows: &[JournalRow]) -> Vec<RuleViolation> {
    let mut out = Vec::new();

    if rows.len() % RowKind::ALL.len() != 0 {
        out.push(RuleViolation::IncompleteGroup { rows: rows.len() });
    }

    for (i, row) in rows.iter().enumerate() {
        let n = i + 1;
        let kind = RowKind::at_position(i);

        if row.general_account.trim() != kind.general_account() {
            out.push(RuleViolation::GeneralAccount {
                row: n,
                kind,
                expected: kind.general_account(),
                found: row.general_account.clone(),
            });
        }

        let tier = row.third_party_account.trim();
        let tier_ok = if kind.uses_third_party() {
            is_third_party_code(tier)
        } else {
            tier.is_empty()
        };
        if !tier_ok {
            out.push(RuleViolation::ThirdParty {
                row: n,
                kind,
                found: row.third_party_account.clone(),
            });
        }

        if kind == RowKind::NetSettlementBalance && i >= 3 {
            let opening = rows[i - 3].third_party_account.trim();
            if is_third_party_code(opening) && tier_ok && opening != tier {
                out.push(RuleViolation::ThirdPartyMismatch {
                    row: n,
                    expected: opening.to_string(),
                    found: tier.to_string(),
                });
            }
        }

        let debit = Amount::parse_optional(&row.debit);
        let credit = Amount::parse_optional(&row.credit);
        for (column, parsed) in [("debit", &debit), ("credit", &credit)] {
            if let Err(error) = parsed {
                out.push(RuleViolation::Amount {
                    row: n,
                    column,
                    error: error.clone(),
                });
            }
        }

        if let (Ok(debit), Ok(credit)) = (debit, credit) {
            let placed = match kind.side() {
                Side::Debit => debit.is_some() && credit.is_none(),
                Side::Credit => credit.is_some() && debit.is_none(),
            };
            if !placed {
                out.push(RuleViolation::WrongSide {
                    row: n,
                    kind,
                    expected: kind.side(),
                });
            }
        }
    }

    out
}
