//! Record types shared by the parsers, the joiner and the report sink.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Temperature of one tracked index, as read from the ranking page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    /// Index identifier, e.g. "000905" or "HSI"
    pub index_id: String,
    pub value: f64,
}

impl TemperatureReading {
    pub fn new(index_id: impl Into<String>, value: f64) -> Self {
        Self {
            index_id: index_id.into(),
            value,
        }
    }
}

/// One normalized row from a fund list endpoint.
///
/// `code` holds the trading-code field verbatim; every other projected
/// field is a float coerced from the source text, keyed by its source name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    pub code: String,
    pub fields: BTreeMap<String, f64>,
}

impl SourceRecord {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.fields.get(field).copied()
    }
}

/// A mapping entry enriched with whatever the sources could provide.
///
/// Missing data is `None`; an entry without `temperature` never shows up in
/// a temperature-ordered selection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FundEntry {
    /// Index identifier
    pub id: String,
    pub name: String,
    /// Exchange trading code
    pub cn: String,
    /// Off-exchange (alternate) fund code
    pub cw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<f64>,
    #[serde(rename = "yield", skip_serializing_if = "Option::is_none")]
    pub yield_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Projected fields without a dedicated slot (volume, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, f64>,
}

impl FundEntry {
    /// Set a field by its target name. Unknown names land in `extra`.
    pub fn set_field(&mut self, name: &str, value: f64) {
        match name {
            "price" => self.price = Some(value),
            "return" => self.return_rate = Some(value),
            "yield" => self.yield_rate = Some(value),
            "temperature" => self.temperature = Some(value),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }
}

/// Output row of a selection: `{name, code, temperature, return}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedFund {
    pub name: String,
    pub code: String,
    pub temperature: f64,
    #[serde(rename = "return")]
    pub return_rate: Option<f64>,
}

impl From<&FundEntry> for SelectedFund {
    fn from(entry: &FundEntry) -> Self {
        Self {
            name: entry.name.clone(),
            code: entry.cw.clone(),
            temperature: entry.temperature.unwrap_or_default(),
            return_rate: entry.return_rate,
        }
    }
}

/// Final report written by the `run` command
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub low_threshold: f64,
    pub high_threshold: f64,
    pub low: Vec<SelectedFund>,
    pub high: Vec<SelectedFund>,
    /// Every fund that received a quote, in table order
    pub funds: Vec<FundEntry>,
}

/// Fund company with its managed scale (unit: 亿)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyScale {
    pub name: String,
    pub scale: f64,
}

/// Market gauge panel. Values are kept as shown on the page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarketGauges {
    pub pe_ttm: Option<String>,
    pub bond_yield: Option<String>,
    pub epv: Option<String>,
    pub stock_attraction: Option<String>,
    pub buffett_index: Option<String>,
    pub turnover_7d: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_field_routes_known_names() {
        let mut entry = FundEntry::default();
        entry.set_field("price", 1.234);
        entry.set_field("return", -1.5);
        entry.set_field("yield", 0.2);
        entry.set_field("temperature", 42.0);
        entry.set_field("volume", 5000.0);

        assert_eq!(entry.price, Some(1.234));
        assert_eq!(entry.return_rate, Some(-1.5));
        assert_eq!(entry.yield_rate, Some(0.2));
        assert_eq!(entry.temperature, Some(42.0));
        assert_eq!(entry.extra.get("volume"), Some(&5000.0));
    }

    #[test]
    fn test_fund_entry_serializes_renamed_fields() {
        let mut entry = FundEntry {
            id: "000905".into(),
            name: "中证500".into(),
            cn: "510500".into(),
            cw: "160119".into(),
            ..Default::default()
        };
        entry.set_field("return", -1.5);

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["return"], -1.5);
        assert!(json.get("yield").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_selected_fund_uses_alternate_code() {
        let entry = FundEntry {
            id: "000905".into(),
            name: "中证500".into(),
            cn: "510500".into(),
            cw: "160119".into(),
            temperature: Some(42.0),
            return_rate: Some(-1.5),
            ..Default::default()
        };

        let selected = SelectedFund::from(&entry);
        assert_eq!(selected.code, "160119");
        assert_eq!(selected.temperature, 42.0);
        assert_eq!(selected.return_rate, Some(-1.5));
    }
}
