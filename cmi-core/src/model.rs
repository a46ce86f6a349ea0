//! Journal row types produced from a card-settlement statement

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Ledger account for the settlement clearing account (total remittance and net balance).
pub const ACCOUNT_SETTLEMENT: &str = "34210000";
/// Ledger account for bank commissions, excluding tax.
pub const ACCOUNT_COMMISSION: &str = "61740000";
/// Ledger account for recoverable VAT on commissions.
pub const ACCOUNT_VAT: &str = "34552010";

/// Prefix of the third-party account derived from a terminal id.
pub const THIRD_PARTY_PREFIX: &str = "CMI";

/// Which column of the journal carries the amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Debit,
    Credit,
}

/// The four row kinds emitted for every remittance group, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    #[serde(rename = "total-remittance")]
    TotalRemittance,
    #[serde(rename = "commission-excl-tax")]
    CommissionExclTax,
    #[serde(rename = "vat-on-commission")]
    VatOnCommission,
    #[serde(rename = "net-settlement-balance")]
    NetSettlementBalance,
}

impl RowKind {
    pub const ALL: [RowKind; 4] = [
        RowKind::TotalRemittance,
        RowKind::CommissionExclTax,
        RowKind::VatOnCommission,
        RowKind::NetSettlementBalance,
    ];

    pub fn general_account(&self) -> &'static str {
        match self {
            RowKind::TotalRemittance | RowKind::NetSettlementBalance => ACCOUNT_SETTLEMENT,
            RowKind::CommissionExclTax => ACCOUNT_COMMISSION,
            RowKind::VatOnCommission => ACCOUNT_VAT,
        }
    }

    /// True when the row carries the `CMI` third-party account
    pub fn uses_third_party(&self) -> bool {
        matches!(self, RowKind::TotalRemittance | RowKind::NetSettlementBalance)
    }

    pub fn side(&self) -> Side {
        match self {
            RowKind::TotalRemittance => Side::Credit,
            _ => Side::Debit,
        }
    }

    /// Description appended to the row label
    pub fn label(&self) -> &'static str {
        match self {
            RowKind::TotalRemittance => "TOTAL REMISE",
            RowKind::CommissionExclTax => "COMMISSION HT",
            RowKind::VatOnCommission => "TVA SUR COMMISSION",
            RowKind::NetSettlementBalance => "SOLDE NET REMISE",
        }
    }

    /// English name as used in the extraction instruction
    pub fn title(&self) -> &'static str {
        match self {
            RowKind::TotalRemittance => "Total Remittance",
            RowKind::CommissionExclTax => "Commission Excl. Tax",
            RowKind::VatOnCommission => "VAT on Commission",
            RowKind::NetSettlementBalance => "Net Settlement Balance",
        }
    }

    /// Kind expected at `index` within a well-formed row list
    pub fn at_position(index: usize) -> RowKind {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// One accounting-journal line.
///
/// All fields are kept as the strings shown to the user; amounts use the
/// decimal-comma form and an empty string means "no amount on this side".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalRow {
    /// DD/MM/YYYY as printed on the statement
    pub date: String,
    #[serde(rename = "compteGeneral")]
    pub general_account: String,
    #[serde(rename = "compteTier")]
    pub third_party_account: String,
    #[serde(rename = "libelle")]
    pub label: String,
    pub debit: String,
    pub credit: String,
}

impl JournalRow {
    pub fn amount_for(&self, side: Side) -> &str {
        match side {
            Side::Debit => &self.debit,
            Side::Credit => &self.credit,
        }
    }

    /// Values in display/export column order
    pub fn columns(&self) -> [&str; 6] {
        [
            &self.date,
            &self.general_account,
            &self.third_party_account,
            &self.label,
            &self.debit,
            &self.credit,
        ]
    }
}

/// Raw figures for one terminal remittance, before the accounting rule is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceGroup {
    pub date: String,
    pub terminal_id: String,
    pub remittance_number: String,
    /// Masked card number fragment, when the statement prints one
    #[serde(default)]
    pub card_fragment: String,
    pub total_remittance: Amount,
    pub commission_excl_tax: Amount,
    pub vat_on_commission: Amount,
    pub net_balance: Amount,
}

impl RemittanceGroup {
    pub fn amount_for(&self, kind: RowKind) -> Amount {
        match kind {
            RowKind::TotalRemittance => self.total_remittance,
            RowKind::CommissionExclTax => self.commission_excl_tax,
            RowKind::VatOnCommission => self.vat_on_commission,
            RowKind::NetSettlementBalance => self.net_balance,
        }
    }

    /// total - commission - vat - net, in cents. Zero for a balanced remittance.
    pub fn balance_gap(&self) -> i64 {
        self.total_remittance.cents()
            - self.commission_excl_tax.cents()
            - self.vat_on_commission.cents()
            - self.net_balance.cents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table() {
        let table: Vec<_> = RowKind::ALL
            .iter()
            .map(|k| (k.general_account(), k.uses_third_party(), k.side()))
            .collect();
        assert_eq!(
            table,
            vec![
                ("34210000", true, Side::Credit),
                ("61740000", false, Side::Debit),
                ("34552010", false, Side::Debit),
                ("34210000", true, Side::Debit),
            ]
        );
    }

    #[test]
    fn test_row_json_field_names() {
        let json = r#"{"date":"03/02/2025","compteGeneral":"61740000","compteTier":"",
            "libelle":"TPE 123 COMMISSION HT","debit":"12,50","credit":""}"#;
        let row: JournalRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.general_account, "61740000");
        assert_eq!(row.label, "TPE 123 COMMISSION HT");
        assert_eq!(row.amount_for(Side::Debit), "12,50");

        let back = serde_json::to_value(&row).unwrap();
        assert_eq!(back["compteTier"], "");
        assert_eq!(back["libelle"], "TPE 123 COMMISSION HT");
    }

    #[test]
    fn test_row_requires_all_fields() {
        let json = r#"{"date":"03/02/2025","compteGeneral":"61740000","libelle":"x","debit":"1","credit":""}"#;
        assert!(serde_json::from_str::<JournalRow>(json).is_err());
    }

    #[test]
    fn test_balance_gap() {
        let g = RemittanceGroup {
            date: "03/02/2025".into(),
            terminal_id: "00012345678".into(),
            remittance_number: "000451".into(),
            card_fragment: String::new(),
            total_remittance: Amount::from_cents(100_000),
            commission_excl_tax: Amount::from_cents(1_500),
            vat_on_commission: Amount::from_cents(150),
            net_balance: Amount::from_cents(98_350),
        };
        assert_eq!(g.balance_gap(), 0);
        assert_eq!(g.amount_for(RowKind::VatOnCommission).cents(), 150);
    }
}
