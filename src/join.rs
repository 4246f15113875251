//! Identifier joiner.
//!
//! Merges fund list records (matched on trading code) and temperature
//! readings (matched on index id) into the enriched entries in place.

use std::collections::HashMap;
use tracing::debug;

use crate::types::{FundEntry, SourceRecord, TemperatureReading};

/// Source field name -> target field name. Fields not listed keep their name.
pub const FIELD_RENAMES: &[(&str, &str)] = &[("increase_rt", "return"), ("discount_rt", "yield")];

/// Target name for a source field
pub fn target_field(source: &str) -> &str {
    FIELD_RENAMES
        .iter()
        .find(|(from, _)| *from == source)
        .map(|(_, to)| *to)
        .unwrap_or(source)
}

/// Match counts from one join, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub records_matched: usize,
    pub records_missed: usize,
    pub readings_matched: usize,
    pub readings_missed: usize,
}

/// Copy record fields onto the entry with the same trading code.
/// Later records overwrite earlier ones.
pub fn join_records(entries: &mut [FundEntry], records: &[SourceRecord], stats: &mut JoinStats) {
    let by_code: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.cn.clone(), i))
        .collect();

    for record in records {
        let Some(&idx) = by_code.get(&record.code) else {
            stats.records_missed += 1;
            continue;
        };

        let entry = &mut entries[idx];
        for (field, value) in &record.fields {
            entry.set_field(target_field(field), *value);
        }
        stats.records_matched += 1;
    }
}

/// Set `temperature` on the entry with the same index id
pub fn join_readings(entries: &mut [FundEntry], readings: &[TemperatureReading], stats: &mut JoinStats) {
    let by_id: HashMap<String, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id.clone(), i))
        .collect();

    for reading in readings {
        match by_id.get(&reading.index_id) {
            Some(&idx) => {
                entries[idx].temperature = Some(reading.value);
                stats.readings_matched += 1;
            }
            None => stats.readings_missed += 1,
        }
    }
}

/// Run both join passes
pub fn join(
    entries: &mut [FundEntry],
    records: &[SourceRecord],
    readings: &[TemperatureReading],
) -> JoinStats {
    let mut stats = JoinStats::default();
    join_records(entries, records, &mut stats);
    join_readings(entries, readings, &mut stats);

    debug!(
        "Joined {} records ({} unmatched), {} readings ({} unmatched)",
        stats.records_matched, stats.records_missed, stats.readings_matched, stats.readings_missed
    );

    stats
}
