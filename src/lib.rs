//! fund-temp
//!
//! One-shot scraper that joins index temperatures with ETF/QDII quotes and
//! picks out the funds worth a look.

pub mod cli;
pub mod config;
pub mod join;
pub mod mapping;
pub mod pipeline;
pub mod scraper;
pub mod selection;
pub mod types;
