//! One statement in, journal rows out.
//!
//! The model is called exactly once per statement. Every failure is terminal
//! for that call; nothing is retried and no partial result is returned.

use cmi_core::{check_rows, journalize, Amount, AmountError, JournalRow, RemittanceGroup, RuleViolation};
use cmi_ingest::EncodedDocument;
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::backend::{GenerateRequest, ModelBackend};
use crate::prompt::{instruction, ExtractionMode};
use crate::schema::response_schema;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("the model returned an empty response: the document is unreadable or not a recognized settlement statement")]
    EmptyResponse,

    #[error("the model returned an invalid output format; retry with a clearer scan of the statement")]
    InvalidFormat(#[source] serde_json::Error),

    #[error("remittance {group}: {field} '{value}' is not a valid amount: {source}")]
    InvalidAmount {
        group: usize,
        field: &'static str,
        value: String,
        #[source]
        source: AmountError,
    },

    #[error("extracted rows break the accounting rule ({} issue(s)){}", .0.len(), first_violation(.0))]
    RuleCheck(Vec<RuleViolation>),

    #[error("extraction failed: {0}")]
    Service(String),
}

fn first_violation(violations: &[RuleViolation]) -> String {
    violations.first().map(|v| format!("; first: {v}")).unwrap_or_default()
}

/// Result of a successful extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub rows: Vec<JournalRow>,
    /// Rule-table departures found in model-produced rows (always empty in groups mode)
    pub violations: Vec<RuleViolation>,
}

/// Group record as returned by the model, amounts still unparsed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGroup {
    date: String,
    terminal_id: String,
    remittance_number: String,
    #[serde(default)]
    card_fragment: String,
    total_remittance: String,
    #[serde(rename = "commissionHT")]
    commission_ht: String,
    vat_on_commission: String,
    net_balance: String,
}

impl RawGroup {
    fn into_group(self, index: usize) -> Result<RemittanceGroup, ExtractError> {
        let parse = |field: &'static str, value: &str| {
            Amount::parse(value).map_err(|source| ExtractError::InvalidAmount {
                group: index + 1,
                field,
                value: value.to_string(),
                source,
            })
        };

        Ok(RemittanceGroup {
            total_remittance: parse("totalRemittance", &self.total_remittance)?,
            commission_excl_tax: parse("commissionHT", &self.commission_ht)?,
            vat_on_commission: parse("vatOnCommission", &self.vat_on_commission)?,
            net_balance: parse("netBalance", &self.net_balance)?,
            date: self.date,
            terminal_id: self.terminal_id,
            remittance_number: self.remittance_number,
            card_fragment: self.card_fragment,
        })
    }
}

/// Strip surrounding whitespace and a markdown code fence, if any.
fn payload(text: &str) -> &str {
    let t = text.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn json_payload(text: &str) -> Result<Value, ExtractError> {
    let p = payload(text);
    if p.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }
    let value: Value = serde_json::from_str(p).map_err(ExtractError::InvalidFormat)?;
    match &value {
        Value::Null => Err(ExtractError::EmptyResponse),
        Value::String(s) if s.trim().is_empty() => Err(ExtractError::EmptyResponse),
        _ => Ok(value),
    }
}

/// Decode model text into journal rows.
pub fn parse_rows(text: &str) -> Result<Vec<JournalRow>, ExtractError> {
    serde_json::from_value(json_payload(text)?).map_err(ExtractError::InvalidFormat)
}

/// Decode model text into remittance groups, validating every amount.
pub fn parse_groups(text: &str) -> Result<Vec<RemittanceGroup>, ExtractError> {
    let raw: Vec<RawGroup> = serde_json::from_value(json_payload(text)?).map_err(ExtractError::InvalidFormat)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, g)| g.into_group(i))
        .collect()
}

pub struct Extractor<B> {
    backend: B,
    mode: ExtractionMode,
    strict: bool,
}

impl<B: ModelBackend> Extractor<B> {
    pub fn new(backend: B, mode: ExtractionMode) -> Self {
        Self {
            backend,
            mode,
            strict: false,
        }
    }

    /// Fail instead of warning when model-produced rows break the rule table.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }

    pub async fn extract(&self, doc: &EncodedDocument) -> Result<Extraction, ExtractError> {
        let instruction = instruction(self.mode);
        let schema = response_schema(self.mode);
        let request = GenerateRequest {
            instruction: &instruction,
            mime_type: doc.media_type.mime(),
            data_base64: &doc.data_base64,
            response_schema: &schema,
        };

        let text = self
            .backend
            .generate(&request)
            .await
            .map_err(|e| ExtractError::Service(format!("{e:#}")))?;

        match self.mode {
            ExtractionMode::Groups => {
                let groups = parse_groups(&text)?;
                info!("{}: {} remittance group(s)", doc.file_name, groups.len());
                Ok(Extraction {
                    rows: journalize(&groups),
                    violations: Vec::new(),
                })
            }
            ExtractionMode::Rows => {
                let rows = parse_rows(&text)?;
                let violations = check_rows(&rows);
                info!("{}: {} row(s) from the model", doc.file_name, rows.len());
                if !violations.is_empty() {
                    if self.strict {
                        return Err(ExtractError::RuleCheck(violations));
                    }
                    for v in &violations {
                        warn!("{v}");
                    }
                }
                Ok(Extraction { rows, violations })
            }
        }
    }
}
