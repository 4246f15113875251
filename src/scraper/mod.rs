//! Web scraper module for fund data sources.
//!
//! Provides the HTTP fetcher and the HTML/JSON parsers.

pub mod fetcher;
pub mod parsers;

pub use fetcher::{Fetch, FetchError, HttpFetcher, Payload, PayloadKind};

/// Index temperature ranking page (also hosts the market gauge panel)
pub const TEMPERATURE_URL: &str = "http://caf-qibei.com/index?type=html";

/// Fund company ranking page
pub const COMPANY_URL: &str = "http://fund.eastmoney.com/company/default.html";

/// Base URL for the fund list JSON endpoints
pub const JISILU_URL: &str = "https://www.jisilu.cn";

/// Cache-busting `___jsl` query value expected by the list endpoints
fn jsl_param() -> String {
    format!("LST___t={}", chrono::Utc::now().timestamp_millis())
}

/// Build ETF list URL
pub fn etf_list_url() -> String {
    format!(
        "{}/data/etf/etf_list/?___jsl={}&rp=25&page=1",
        JISILU_URL,
        jsl_param()
    )
}

/// Build QDII list URL for a market group ("A" for Asia, "E" for Europe/America)
pub fn qdii_list_url(market: &str) -> String {
    format!(
        "{}/data/qdii/qdii_list/{}?___jsl={}&rp=22&page=1",
        JISILU_URL,
        market,
        jsl_param()
    )
}
