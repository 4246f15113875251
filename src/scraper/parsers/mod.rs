//! HTML and JSON parsers for the fund data sources.

pub mod company;
pub mod fund_list;
pub mod gauges;
pub mod temperature;

pub use company::{large_companies, CompanyParser};
pub use fund_list::{parse_rate, FundListParser};
pub use gauges::GaugeParser;
pub use temperature::{MarkerCellQualifier, RowQualifier, TemperatureParser};
