//! Index temperature parser for the ranking page.
//!
//! The page is a plain table where each index row carries links to the
//! index pages and a `colspan=3` cell with the temperature. Decorative rows
//! reuse the same layout with non-numeric text, so a row only counts when
//! the marker cell holds a plain decimal.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::types::TemperatureReading;

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)$").expect("valid regex"));

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

/// Decides whether a table row carries a reading, and extracts it
pub trait RowQualifier {
    fn reading(&self, row: ElementRef<'_>) -> Option<TemperatureReading>;
}

/// Default rule: enough links plus a numeric marker cell
pub struct MarkerCellQualifier {
    links: Selector,
    marker: Selector,
    min_links: usize,
}

impl MarkerCellQualifier {
    pub fn new(link_selector: &str, marker_selector: &str, min_links: usize) -> anyhow::Result<Self> {
        let parse = |s: &str| {
            Selector::parse(s).map_err(|e| anyhow::anyhow!("Invalid selector '{}': {}", s, e))
        };
        Ok(Self {
            links: parse(link_selector)?,
            marker: parse(marker_selector)?,
            min_links,
        })
    }
}

impl Default for MarkerCellQualifier {
    fn default() -> Self {
        Self {
            links: Selector::parse("a[href]").expect("valid selector"),
            marker: Selector::parse(r#"td[colspan="3"]"#).expect("valid selector"),
            min_links: 2,
        }
    }
}

impl RowQualifier for MarkerCellQualifier {
    fn reading(&self, row: ElementRef<'_>) -> Option<TemperatureReading> {
        let links: Vec<_> = row.select(&self.links).collect();
        if links.len() < self.min_links {
            return None;
        }

        let marker = row.select(&self.marker).next()?;
        let text = marker.text().collect::<String>();
        let text = text.trim();
        if !is_plain_decimal(text) {
            return None;
        }

        let value = text.parse::<f64>().ok()?;
        let index_id = links.first()?.text().collect::<String>().trim().to_string();

        Some(TemperatureReading { index_id, value })
    }
}

/// Non-negative decimal with at most one point, e.g. "42", "12.5", "7."
pub fn is_plain_decimal(text: &str) -> bool {
    PLAIN_DECIMAL.is_match(text)
}

/// Parser for the temperature ranking page
pub struct TemperatureParser<Q = MarkerCellQualifier> {
    qualifier: Q,
}

impl TemperatureParser {
    pub fn new() -> Self {
        Self {
            qualifier: MarkerCellQualifier::default(),
        }
    }
}

impl Default for TemperatureParser {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: RowQualifier> TemperatureParser<Q> {
    pub fn with_qualifier(qualifier: Q) -> Self {
        Self { qualifier }
    }

    /// Extract every qualifying reading, in document row order
    pub fn extract_readings(&self, html: &str) -> Vec<TemperatureReading> {
        let document = Html::parse_document(html);

        document
            .select(&ROW_SELECTOR)
            .filter_map(|row| self.qualifier.reading(row))
            .collect()
    }
}
