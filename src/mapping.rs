//! Static fund mapping table.
//!
//! Each entry ties a tracked index to the exchange fund that follows it.
//! The table is configuration: it is loaded once, validated, and passed by
//! reference into every pipeline stage.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::FundEntry;

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Index identifier (join key for temperatures)
    pub id: String,
    pub name: String,
    /// Exchange trading code (join key for fund list rows)
    pub cn: String,
    /// Off-exchange fund code
    #[serde(default)]
    pub cw: String,
}

impl MappingEntry {
    pub fn new(id: &str, name: &str, cn: &str, cw: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            cn: cn.to_string(),
            cw: cw.to_string(),
        }
    }
}

/// Validated, immutable mapping table
#[derive(Debug, Clone)]
pub struct FundMapping {
    entries: Vec<MappingEntry>,
}

impl FundMapping {
    /// Build a mapping, rejecting empty or duplicate join keys.
    pub fn new(entries: Vec<MappingEntry>) -> Result<Self> {
        let mapping = Self { entries };
        mapping.validate()?;
        Ok(mapping)
    }

    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        let mut codes = HashSet::new();

        for entry in &self.entries {
            if entry.id.trim().is_empty() {
                bail!("Mapping entry '{}' has an empty index id", entry.name);
            }
            if entry.cn.trim().is_empty() {
                bail!("Mapping entry '{}' has an empty trading code", entry.name);
            }
            if !ids.insert(entry.id.as_str()) {
                bail!("Duplicate index id in fund mapping: {}", entry.id);
            }
            if !codes.insert(entry.cn.as_str()) {
                bail!("Duplicate trading code in fund mapping: {}", entry.cn);
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set of all trading codes, used to filter fund list rows
    pub fn trading_codes(&self) -> HashSet<&str> {
        self.entries.iter().map(|e| e.cn.as_str()).collect()
    }

    /// Fresh, un-enriched entries in table order
    pub fn to_entries(&self) -> Vec<FundEntry> {
        self.entries
            .iter()
            .map(|m| FundEntry {
                id: m.id.clone(),
                name: m.name.clone(),
                cn: m.cn.clone(),
                cw: m.cw.clone(),
                ..Default::default()
            })
            .collect()
    }
}

/// Built-in table of tracked indices
pub fn default_entries() -> Vec<MappingEntry> {
    vec![
        MappingEntry::new("000905", "中证500", "510500", "160119"),
        MappingEntry::new("399975", "证券公司", "512000", "004069"),
        MappingEntry::new("399324", "深证红利", "159905", "481012"),
        MappingEntry::new("000922", "中证红利", "515890", "100032"),
        MappingEntry::new("H30533", "互联网50", "513050", "006327"),
        MappingEntry::new("399006", "创业板指", "159915", "161022"),
        MappingEntry::new("399971", "中证传媒", "512980", "004752"),
        MappingEntry::new("HSI", "恒生指数", "159920", "164705"),
        MappingEntry::new("000300", "沪深300", "510300", "160706"),
        MappingEntry::new("SPX", "标普500", "513500", "050025"),
        MappingEntry::new("GDAXI", "德国DAX", "513030", "000614"),
        MappingEntry::new("000932", "中证消费", "159928", "000248"),
        MappingEntry::new("399987", "中证酒", "512690", "160632"),
        MappingEntry::new("399396", "国证食品", "159843", "160222"),
        MappingEntry::new("399998", "中证煤炭", "515220", "161032"),
    ]
}
