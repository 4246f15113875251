//! End-to-end fetch, normalize, join pipeline.
//!
//! Sources are fetched one after another. A source that fails to fetch or
//! decode contributes nothing; the run always carries on with the rest.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::SourcesConfig;
use crate::join::{join, JoinStats};
use crate::mapping::FundMapping;
use crate::scraper::parsers::{FundListParser, TemperatureParser};
use crate::scraper::{Fetch, PayloadKind};
use crate::selection::{select, select_in_order, Threshold};
use crate::types::{FundEntry, Report, SelectedFund, SourceRecord, TemperatureReading};

/// Rows of one fund list endpoint, empty when the source is unavailable
pub async fn fetch_rows<F: Fetch>(fetcher: &F, url: &str) -> Vec<Value> {
    let Some(payload) = fetcher.fetch_or_absent(url, PayloadKind::Json).await else {
        return Vec::new();
    };
    let Some(json) = payload.into_json() else {
        return Vec::new();
    };

    match FundListParser::rows(json) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Unexpected fund list shape from '{}': {}, skipping source", url, e);
            Vec::new()
        }
    }
}

/// Normalized records for mapped funds across all list endpoints
pub async fn fetch_records<F: Fetch>(
    fetcher: &F,
    sources: &SourcesConfig,
    mapping: &FundMapping,
) -> Vec<SourceRecord> {
    let mut records = Vec::new();

    for url in &sources.fund_list_urls {
        let rows = fetch_rows(fetcher, url).await;
        let normalized = FundListParser::normalize(&rows, &sources.fields, mapping);
        info!("{}: {} rows, {} mapped", url, rows.len(), normalized.len());
        records.extend(normalized);
    }

    records
}

/// Temperature readings from the ranking page, empty when unavailable
pub async fn fetch_readings<F: Fetch>(fetcher: &F, url: &str) -> Vec<TemperatureReading> {
    let Some(html) = fetcher
        .fetch_or_absent(url, PayloadKind::Text)
        .await
        .and_then(|p| p.into_text())
    else {
        return Vec::new();
    };

    let readings = TemperatureParser::new().extract_readings(&html);
    info!("{}: {} temperature readings", url, readings.len());
    readings
}

/// Fetch every source and join it onto fresh mapping entries
pub async fn enrich<F: Fetch>(
    fetcher: &F,
    sources: &SourcesConfig,
    mapping: &FundMapping,
) -> (Vec<FundEntry>, JoinStats) {
    let records = fetch_records(fetcher, sources, mapping).await;
    let readings = fetch_readings(fetcher, &sources.temperature_url).await;

    let mut entries = mapping.to_entries();
    let stats = join(&mut entries, &records, &readings);

    info!(
        "Enriched {} funds: {} with quotes, {} with temperature",
        entries.len(),
        entries.iter().filter(|e| e.return_rate.is_some()).count(),
        entries.iter().filter(|e| e.temperature.is_some()).count()
    );

    (entries, stats)
}

/// Low/high selections over enriched entries
pub fn build_report(entries: &[FundEntry], low: f64, high: f64) -> Report {
    let to_rows = |selected: Vec<FundEntry>| -> Vec<SelectedFund> {
        selected.iter().map(SelectedFund::from).collect()
    };

    Report {
        generated_at: chrono::Utc::now(),
        low_threshold: low,
        high_threshold: high,
        low: to_rows(select(entries, |e| Threshold::Below(low).matches(e))),
        high: to_rows(select(entries, |e| Threshold::Above(high).matches(e))),
        funds: select_in_order(entries, |e| e.return_rate.is_some()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingEntry;
    use crate::scraper::{FetchError, Payload};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory fetcher: unknown addresses fail as unreachable
    #[derive(Default)]
    struct StubFetcher {
        bodies: HashMap<String, String>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }
    }

    impl Fetch for StubFetcher {
        async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<Payload, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            match self.bodies.get(url) {
                Some(body) => crate::scraper::fetcher::decode_body(url, body.clone(), kind),
                None => Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }

    const TEMPS_URL: &str = "http://temps.test/index";
    const ETF_URL: &str = "http://list.test/etf";
    const QDII_A_URL: &str = "http://list.test/qdii/A";
    const QDII_E_URL: &str = "http://list.test/qdii/E";

    const TEMPS_HTML: &str = r#"<html><body><table>
        <tr><td><a href="/i/000905">000905</a></td><td><a href="/d/000905">中证500</a></td><td colspan="3">42.0</td></tr>
        <tr><td><a href="/i/HSI">HSI</a></td><td><a href="/d/HSI">恒生指数</a></td><td colspan="3">12.5</td></tr>
        <tr><td><a href="/i/SPX">SPX</a></td><td><a href="/d/SPX">标普500</a></td><td colspan="3">80</td></tr>
    </table></body></html>"#;

    const ETF_JSON: &str = r#"{"rows": [
        {"cell": {"fund_id": "510500", "price": "6.100", "increase_rt": "-1.5%", "discount_rt": "0.2%"}},
        {"cell": {"fund_id": "510050", "price": "2.700", "increase_rt": "-3.0%", "discount_rt": "0.1%"}}
    ]}"#;

    const QDII_E_JSON: &str = r#"{"rows": [
        {"cell": {"fund_id": "513500", "price": "1.800", "increase_rt": "2.10%", "discount_rt": "5.30%"}}
    ]}"#;

    fn sources() -> SourcesConfig {
        SourcesConfig {
            temperature_url: TEMPS_URL.to_string(),
            fund_list_urls: vec![ETF_URL.into(), QDII_A_URL.into(), QDII_E_URL.into()],
            ..Default::default()
        }
    }

    fn mapping() -> FundMapping {
        FundMapping::new(vec![
            MappingEntry::new("000905", "中证500", "510500", "160119"),
            MappingEntry::new("HSI", "恒生指数", "159920", "164705"),
            MappingEntry::new("SPX", "标普500", "513500", "050025"),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end() {
        let fetcher = StubFetcher::default()
            .with(TEMPS_URL, TEMPS_HTML)
            .with(ETF_URL, ETF_JSON)
            .with(QDII_A_URL, r#"{"rows": []}"#)
            .with(QDII_E_URL, QDII_E_JSON);

        let (entries, stats) = enrich(&fetcher, &sources(), &mapping()).await;

        assert_eq!(stats.records_matched, 2);
        assert_eq!(stats.readings_matched, 3);

        let csi500 = &entries[0];
        assert_eq!(csi500.temperature, Some(42.0));
        assert_eq!(csi500.return_rate, Some(-1.5));
        assert_eq!(csi500.yield_rate, Some(0.2));
        assert_eq!(csi500.price, Some(6.1));

        // HSI has a temperature but no quote
        assert_eq!(entries[1].temperature, Some(12.5));
        assert_eq!(entries[1].return_rate, None);

        let report = build_report(&entries, -1.0, 1.0);
        assert_eq!(report.low.len(), 1);
        assert_eq!(report.low[0].name, "中证500");
        assert_eq!(report.low[0].code, "160119");
        assert_eq!(report.low[0].temperature, 42.0);
        assert_eq!(report.high.len(), 1);
        assert_eq!(report.high[0].name, "标普500");

        let quoted: Vec<_> = report.funds.iter().map(|f| f.cn.as_str()).collect();
        assert_eq!(quoted, vec!["510500", "513500"]);
    }

    #[tokio::test]
    async fn test_failed_source_does_not_block_others() {
        // QDII A is not registered, so it is unreachable
        let fetcher = StubFetcher::default()
            .with(TEMPS_URL, TEMPS_HTML)
            .with(ETF_URL, ETF_JSON)
            .with(QDII_E_URL, QDII_E_JSON);

        let (entries, _) = enrich(&fetcher, &sources(), &mapping()).await;

        assert_eq!(entries[0].return_rate, Some(-1.5));
        assert_eq!(entries[2].return_rate, Some(2.1));
        assert_eq!(
            *fetcher.calls.borrow(),
            vec![ETF_URL, QDII_A_URL, QDII_E_URL, TEMPS_URL]
        );
    }

    #[tokio::test]
    async fn test_invalid_json_source_is_skipped() {
        let fetcher = StubFetcher::default()
            .with(TEMPS_URL, TEMPS_HTML)
            .with(ETF_URL, "<html>maintenance</html>")
            .with(QDII_A_URL, r#"{"rows": "none"}"#)
            .with(QDII_E_URL, QDII_E_JSON);

        let records = fetch_records(&fetcher, &sources(), &mapping()).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "513500");
    }

    #[tokio::test]
    async fn test_missing_temperature_page() {
        let fetcher = StubFetcher::default().with(ETF_URL, ETF_JSON);

        let (entries, stats) = enrich(&fetcher, &sources(), &mapping()).await;

        assert_eq!(stats.readings_matched, 0);
        assert_eq!(entries[0].return_rate, Some(-1.5));

        // Nothing has a temperature, so nothing is selected
        let report = build_report(&entries, -1.0, 1.0);
        assert!(report.low.is_empty());
        assert!(report.high.is_empty());
    }
}
