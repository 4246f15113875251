//! Fund list parser for the ETF/QDII JSON endpoints.
//!
//! Response shape: `{ "rows": [ { "cell": { "fund_id": "510500", ... } } ] }`.
//! Rates come as percent strings ("-1.10%") and are kept in percent points.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

use crate::mapping::FundMapping;
use crate::types::SourceRecord;

/// Parser for fund list payloads
pub struct FundListParser;

impl FundListParser {
    /// Pull the row list out of a decoded payload. A missing `rows` key is
    /// an empty list.
    pub fn rows(payload: Value) -> Result<Vec<Value>> {
        let response: FundListResponse = serde_json::from_value(payload)?;
        Ok(response.rows)
    }

    /// Normalize rows whose trading code is in the mapping.
    ///
    /// `fields[0]` names the trading-code field; every other field present
    /// on a row is coerced to a float.
    pub fn normalize(rows: &[Value], fields: &[String], mapping: &FundMapping) -> Vec<SourceRecord> {
        let codes = mapping.trading_codes();
        Self::collect(rows, fields, Some(&codes))
    }

    /// Normalize every row regardless of the mapping
    pub fn parse_all(rows: &[Value], fields: &[String]) -> Vec<SourceRecord> {
        Self::collect(rows, fields, None)
    }

    fn collect(rows: &[Value], fields: &[String], codes: Option<&HashSet<&str>>) -> Vec<SourceRecord> {
        let Some((code_field, value_fields)) = fields.split_first() else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|row| {
                let cell = row.get("cell")?.as_object()?;
                let code = cell.get(code_field.as_str()).and_then(code_text);

                let code = match (codes, code) {
                    (Some(codes), Some(code)) if codes.contains(code.as_str()) => code,
                    (Some(_), _) => return None,
                    (None, code) => code.unwrap_or_default(),
                };

                Some(Self::record(code, cell, value_fields))
            })
            .collect()
    }

    fn record(code: String, cell: &Map<String, Value>, value_fields: &[String]) -> SourceRecord {
        let mut record = SourceRecord {
            code,
            ..Default::default()
        };

        for field in value_fields {
            let Some(raw) = cell.get(field.as_str()) else {
                continue;
            };
            match coerce_value(raw) {
                Some(value) => {
                    record.fields.insert(field.clone(), value);
                }
                None => debug!("{}: unparseable {} value {}", record.code, field, raw),
            }
        }

        record
    }
}

/// Parse a percent-formatted rate: "3.25%" -> 3.25, "-1.10%" -> -1.10
pub fn parse_rate(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let trimmed = trimmed.trim_end_matches('%');
    trimmed.trim().replace(',', "").parse::<f64>().ok()
}

fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_rate(s),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn code_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Internal: list endpoint response
#[derive(Deserialize)]
struct FundListResponse {
    #[serde(default)]
    rows: Vec<Value>,
}
