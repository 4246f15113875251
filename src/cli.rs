//! CLI commands for fund-temp.
//!
//! `run` is the full pipeline; the other commands print a single source.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::mapping::FundMapping;
use crate::pipeline::{build_report, enrich, fetch_readings, fetch_rows};
use crate::scraper::parsers::{large_companies, CompanyParser, FundListParser, GaugeParser};
use crate::scraper::{Fetch, HttpFetcher, PayloadKind};
use crate::types::{MarketGauges, Report, SourceRecord};

#[derive(Parser)]
#[command(name = "fund-temp")]
#[command(version, about = "Fund temperature scraper: index temperatures joined with ETF/QDII quotes", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./fund_temp.{toml,yaml,json} if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join temperatures with fund quotes and print low/high selections
    Run {
        /// Return threshold for the low list (percent points)
        #[arg(long, allow_negative_numbers = true)]
        low: Option<f64>,

        /// Return threshold for the high list (percent points)
        #[arg(long, allow_negative_numbers = true)]
        high: Option<f64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print index temperatures
    Temps {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print every row of the fund list endpoints
    Funds {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print fund companies above a managed scale
    Companies {
        /// Minimum managed scale in 亿
        #[arg(long)]
        min_scale: Option<f64>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Print the market gauge panel
    Gauges {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

impl Commands {
    /// Command used when none is given
    pub fn default_run() -> Self {
        Commands::Run {
            low: None,
            high: None,
            format: "table".to_string(),
        }
    }
}

/// Run the full pipeline.
pub async fn run_pipeline(
    config: AppConfig,
    low: Option<f64>,
    high: Option<f64>,
    format: String,
) -> anyhow::Result<()> {
    let mapping = FundMapping::new(config.funds)?;
    let fetcher = HttpFetcher::new(&config.http)?;

    let low = low.unwrap_or(config.selection.low_return);
    let high = high.unwrap_or(config.selection.high_return);

    tracing::info!("Tracking {} funds", mapping.len());
    let (entries, _) = enrich(&fetcher, &config.sources, &mapping).await;
    let report = build_report(&entries, low, high);

    if is_json(&format) {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Fetch and print temperature readings.
pub async fn run_temps(config: AppConfig, format: String) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let readings = fetch_readings(&fetcher, &config.sources.temperature_url).await;

    if is_json(&format) {
        println!("{}", serde_json::to_string_pretty(&readings)?);
    } else {
        println!("=== Index Temperatures ===");
        for r in &readings {
            println!("  {:<10} {:>8.2}", r.index_id, r.value);
        }
        println!();
        println!("{} readings", readings.len());
    }

    Ok(())
}

/// Fetch and print every fund list row.
pub async fn run_funds(config: AppConfig, format: String) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let fields = &config.sources.listing_fields;

    let mut records = Vec::new();
    for url in &config.sources.fund_list_urls {
        let rows = fetch_rows(&fetcher, url).await;
        records.extend(FundListParser::parse_all(&rows, fields));
    }

    if is_json(&format) {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        print_funds(&records, fields);
    }

    Ok(())
}

/// Fetch and print large fund companies.
pub async fn run_companies(
    config: AppConfig,
    min_scale: Option<f64>,
    format: String,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;
    let min_scale = min_scale.unwrap_or(config.companies.min_scale);

    let html = fetcher
        .fetch(&config.sources.company_url, PayloadKind::Text)
        .await?
        .into_text()
        .unwrap_or_default();

    let companies = CompanyParser::parse(&html);
    let large = large_companies(&companies, min_scale);
    tracing::info!("{} of {} companies above {}亿", large.len(), companies.len(), min_scale);

    if is_json(&format) {
        println!("{}", serde_json::to_string_pretty(&large)?);
    } else {
        println!("=== 管理规模大于{}亿的基金公司 ===", min_scale);
        for c in &large {
            println!("  {:<16} {:>12.2}", c.name, c.scale);
        }
    }

    Ok(())
}

/// Fetch and print the market gauge panel.
pub async fn run_gauges(config: AppConfig, format: String) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.http)?;

    let html = fetcher
        .fetch(&config.sources.gauges_url, PayloadKind::Text)
        .await?
        .into_text()
        .unwrap_or_default();

    let gauges = GaugeParser::parse(&html);

    if is_json(&format) {
        println!("{}", serde_json::to_string_pretty(&gauges)?);
    } else {
        print_gauges(&gauges);
    }

    Ok(())
}

fn is_json(format: &str) -> bool {
    match format {
        "json" => true,
        "table" => false,
        _ => {
            eprintln!("Unknown format: {}. Using table.", format);
            false
        }
    }
}

/// Print low/high selections in table format.
fn print_report(report: &Report) {
    let sections = [
        (format!("低温数据 (return < {})", report.low_threshold), &report.low),
        (format!("高温数据 (return > {})", report.high_threshold), &report.high),
    ];

    for (title, funds) in sections {
        println!("=== {} ===", title);
        if funds.is_empty() {
            println!("  (none)");
        }
        for f in funds {
            let ret = f
                .return_rate
                .map(|r| format!("{:+.2}%", r))
                .unwrap_or_else(|| "N/A".to_string());
            println!(
                "  {:<10} {:>8}  temp {:>6.2}  {:>8}",
                f.name, f.code, f.temperature, ret
            );
        }
        println!();
    }
}

/// Print fund list rows; missing fields show as N/A.
fn print_funds(records: &[SourceRecord], fields: &[String]) {
    println!("=== Fund List ===");
    for record in records {
        let values: Vec<String> = fields
            .iter()
            .skip(1)
            .map(|f| match record.get(f) {
                Some(v) => format!("{}={}", f, v),
                None => format!("{}=N/A", f),
            })
            .collect();
        println!("  {:<8} {}", record.code, values.join("  "));
    }
    println!();
    println!("总共抓取到 {} 条数据", records.len());
}

fn print_gauges(gauges: &MarketGauges) {
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

    println!("=== Market Gauges ===");
    println!("  PE TTM          {}", show(&gauges.pe_ttm));
    println!("  10Y bond yield  {}", show(&gauges.bond_yield));
    println!("  EPV             {}", show(&gauges.epv));
    println!("  股市吸引力      {}", show(&gauges.stock_attraction));
    println!("  巴菲特指数      {}", show(&gauges.buffett_index));
    println!("  七日换手率      {}", show(&gauges.turnover_7d));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_negative_threshold() {
        let cli = Cli::parse_from(["fund-temp", "run", "--low", "-2.5", "--high", "3"]);
        match cli.command {
            Some(Commands::Run { low, high, format }) => {
                assert_eq!(low, Some(-2.5));
                assert_eq!(high, Some(3.0));
                assert_eq!(format, "table");
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_without_subcommand() {
        let cli = Cli::parse_from(["fund-temp", "--verbose"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["fund-temp", "companies", "--config", "my.toml", "--min-scale", "500"]);
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        match cli.command {
            Some(Commands::Companies { min_scale, .. }) => assert_eq!(min_scale, Some(500.0)),
            _ => panic!("expected companies command"),
        }
    }

    #[test]
    fn test_is_json() {
        assert!(is_json("json"));
        assert!(!is_json("table"));
        assert!(!is_json("yaml"));
    }
}
