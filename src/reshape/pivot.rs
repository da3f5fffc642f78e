use std::collections::{BTreeMap, HashMap};

use crate::data::Cell;

use super::{discovery::split_group_suffix, melt::MoltenRecord};

/// One (source row, group) after repivoting.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PivotRow {
    pub row_id: usize,
    pub fixed: Vec<Cell>,
    pub group: String,
    pub attributes: HashMap<String, Cell>,
}

/// Spreads molten `attribute -> value` pairs back into one row per
/// (row identity, group index). The first value seen for an attribute wins.
/// Rows come out ordered by source row, then numeric group index.
pub(crate) fn repivot(records: Vec<MoltenRecord<'_>>) -> Vec<PivotRow> {
    let mut grouped: BTreeMap<(usize, u64, String), PivotRow> = BTreeMap::new();
    for record in records {
        let Some((base, suffix)) = split_group_suffix(record.source_column) else {
            continue;
        };
        let order = suffix.parse::<u64>().unwrap_or(u64::MAX);
        let row = grouped
            .entry((record.row_id, order, suffix.to_string()))
            .or_insert_with(|| PivotRow {
                row_id: record.row_id,
                fixed: record.fixed.to_vec(),
                group: suffix.to_string(),
                attributes: HashMap::new(),
            });
        row.attributes
            .entry(base.to_string())
            .or_insert(record.value);
    }
    grouped.into_values().collect()
}
