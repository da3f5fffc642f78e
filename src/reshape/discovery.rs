//! Schema discovery and column selection.
//!
//! Header names are trimmed once into a [`HeaderIndex`]; everything after that
//! works on trimmed names. Group suffixes are found by splitting on the last
//! underscore.

use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::{
    error::{ReshapeWarning, Stage},
    schema::ParcelSchema,
};

/// Trimmed header names with a first-wins name lookup.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(raw: &[String]) -> Self {
        let names = raw.iter().map(|h| h.trim().to_string()).collect::<Vec<_>>();
        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(idx);
        }
        Self { names, positions }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

/// Splits `name` at its last underscore when the tail is all ASCII digits.
pub fn split_group_suffix(name: &str) -> Option<(&str, &str)> {
    let (base, suffix) = name.rsplit_once('_')?;
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        Some((base, suffix))
    } else {
        None
    }
}

/// Group index carried by a header, if any. Suffixes too large for `u32` are
/// not treated as indices.
pub fn group_index(name: &str) -> Option<u32> {
    split_group_suffix(name).and_then(|(_, suffix)| suffix.parse().ok())
}

pub fn max_group_index<'a, I>(names: I) -> u32
where
    I: IntoIterator<Item = &'a String>,
{
    names
        .into_iter()
        .filter_map(|name| group_index(name))
        .max()
        .unwrap_or(0)
}

/// A fixed column that exists in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedColumn {
    pub name: String,
    pub position: usize,
}

/// A grouped column chosen for melting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumn {
    pub name: String,
    pub position: usize,
    pub group: u32,
}

/// Trims and deduplicates the requested fixed columns, keeping those present in
/// the headers and recording a warning for each one that is not.
pub fn resolve_fixed_columns(
    requested: &[String],
    headers: &HeaderIndex,
    stage: Stage,
    warnings: &mut Vec<ReshapeWarning>,
) -> Vec<FixedColumn> {
    requested
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .unique()
        .filter_map(|name| match headers.position(name) {
            Some(position) => Some(FixedColumn {
                name: name.to_string(),
                position,
            }),
            None => {
                warnings.push(ReshapeWarning::MissingFixedColumn {
                    column: name.to_string(),
                    stage,
                });
                None
            }
        })
        .collect()
}

/// Builds the melt list from the `<attribute>_<index>` headers actually
/// present: index-major, attributes in schema order within each index.
/// Excluded prefixes and fixed columns never make it in. Suffixes with a
/// leading zero or an index of 0 do not name a parcel.
pub fn select_columns(
    headers: &HeaderIndex,
    schema: &ParcelSchema,
    fixed: &[FixedColumn],
) -> Vec<SelectedColumn> {
    let mut candidates = Vec::new();
    for (position, name) in headers.names().iter().enumerate() {
        if headers.position(name) != Some(position) {
            continue;
        }
        let Some((base, suffix)) = split_group_suffix(name) else {
            continue;
        };
        if suffix.starts_with('0') || schema.is_excluded(name) {
            continue;
        }
        if fixed.iter().any(|f| &f.name == name) {
            continue;
        }
        let Some(attribute) = schema.attribute_position(base) else {
            continue;
        };
        let Ok(group) = suffix.parse::<u32>() else {
            continue;
        };
        candidates.push((
            group,
            attribute,
            SelectedColumn {
                name: name.clone(),
                position,
                group,
            },
        ));
    }
    candidates.sort_by_key(|(group, attribute, _)| (*group, *attribute));
    candidates.into_iter().map(|(_, _, column)| column).collect()
}

/// What discovery and selection make of a header row, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub max_group_index: u32,
    /// Attributes found per group index, in schema order.
    pub groups: BTreeMap<u32, Vec<String>>,
    /// Numbered columns that do not resolve to `<attribute>_<index>`.
    pub unrecognized: Vec<String>,
    /// Numbered columns dropped by the reserved-prefix rule.
    pub excluded: Vec<String>,
    pub melt_columns: usize,
}

impl DiscoveryReport {
    pub fn from_headers(raw: &[String], schema: &ParcelSchema) -> Self {
        let headers = HeaderIndex::new(raw);
        let max_group_index = max_group_index(headers.names());
        let selected = select_columns(&headers, schema, &[]);

        let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for column in &selected {
            if let Some((base, _)) = split_group_suffix(&column.name) {
                groups
                    .entry(column.group)
                    .or_default()
                    .push(base.to_string());
            }
        }

        let mut unrecognized = Vec::new();
        let mut excluded = Vec::new();
        for name in headers.names().iter().unique() {
            if split_group_suffix(name).is_none() {
                continue;
            }
            if schema.is_excluded(name) {
                excluded.push(name.clone());
            } else if !selected.iter().any(|c| &c.name == name) {
                unrecognized.push(name.clone());
            }
        }

        Self {
            max_group_index,
            groups,
            unrecognized,
            excluded,
            melt_columns: selected.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> HeaderIndex {
        HeaderIndex::new(&names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn split_group_suffix_uses_last_underscore() {
        assert_eq!(split_group_suffix("E_Tab_Opp_3"), Some(("E_Tab_Opp", "3")));
        assert_eq!(split_group_suffix("E_Tab_Opp_03"), Some(("E_Tab_Opp", "03")));
        assert_eq!(split_group_suffix("E_Tab_Opp"), None);
        assert_eq!(split_group_suffix("Note_"), None);
        assert_eq!(split_group_suffix("Note_2a"), None);
        assert_eq!(split_group_suffix("Note_-2"), None);
        assert_eq!(split_group_suffix("123"), None);
    }

    #[test]
    fn max_group_index_scans_every_header() {
        let index = headers(&["ID_Project", "E_Tab_Opp_2", "Whatever_11", "E_Tab_NN_1"]);
        assert_eq!(max_group_index(index.names()), 11);
        let flat = headers(&["ID_Project", "Note"]);
        assert_eq!(max_group_index(flat.names()), 0);
        let huge = headers(&["X_99999999999999999999"]);
        assert_eq!(max_group_index(huge.names()), 0);
    }

    #[test]
    fn header_index_trims_and_keeps_first_duplicate() {
        let index = headers(&[" ID_Project ", "E_Tab_Opp_1", "E_Tab_Opp_1 "]);
        assert_eq!(index.names()[0], "ID_Project");
        assert_eq!(index.position("ID_Project"), Some(0));
        assert_eq!(index.position("E_Tab_Opp_1"), Some(1));
    }

    #[test]
    fn selection_is_index_major_in_schema_order() {
        let schema = ParcelSchema::default();
        let index = headers(&["E_Tab_NN_2", "E_Tab_Opp_1", "E_Tab_Kad_Gem_2", "E_Tab_NN_1"]);
        let selected = select_columns(&index, &schema, &[]);
        let names = selected.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["E_Tab_Opp_1", "E_Tab_NN_1", "E_Tab_Kad_Gem_2", "E_Tab_NN_2"]
        );
        assert_eq!(selected[2].group, 2);
        assert_eq!(selected[2].position, 2);
    }

    #[test]
    fn selection_skips_reserved_prefix_even_when_in_vocabulary() {
        let mut schema = ParcelSchema::default();
        schema.attributes.push("E_Tab_Plus_Opp".to_string());
        let index = headers(&["E_Tab_Plus_Opp_1", "E_Tab_Opp_1"]);
        let selected = select_columns(&index, &schema, &[]);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "E_Tab_Opp_1");
    }

    #[test]
    fn selection_ignores_unknown_large_suffixes() {
        let schema = ParcelSchema::default();
        let index = headers(&[
            "ID_Project",
            "E_Tab_Opp_1",
            "Export_20240101",
            "E_Tab_NN_4294967295",
        ]);
        assert_eq!(max_group_index(index.names()), 4_294_967_295);
        let selected = select_columns(&index, &schema, &[]);
        let names = selected.iter().map(|c| (c.name.as_str(), c.group)).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![("E_Tab_Opp_1", 1), ("E_Tab_NN_4294967295", 4_294_967_295)]
        );
    }

    #[test]
    fn selection_skips_zero_padded_and_fixed_columns() {
        let schema = ParcelSchema::default();
        let index = headers(&["E_Tab_Opp_01", "E_Tab_Opp_0", "E_Tab_NN_1", "E_Tab_Opp_2"]);
        let fixed = vec![FixedColumn {
            name: "E_Tab_NN_1".into(),
            position: 2,
        }];
        let selected = select_columns(&index, &schema, &fixed);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "E_Tab_Opp_2");
        assert_eq!(selected[0].position, 3);
    }

    #[test]
    fn fixed_resolution_warns_and_deduplicates() {
        let index = headers(&["ID_Project", "E_Tab_Opp_1"]);
        let mut warnings = Vec::new();
        let requested = vec![
            " ID_Project".to_string(),
            "Nonexistent".to_string(),
            "ID_Project".to_string(),
            "  ".to_string(),
        ];
        let fixed = resolve_fixed_columns(&requested, &index, Stage::Selection, &mut warnings);
        assert_eq!(
            fixed,
            vec![FixedColumn {
                name: "ID_Project".into(),
                position: 0
            }]
        );
        assert_eq!(
            warnings,
            vec![ReshapeWarning::MissingFixedColumn {
                column: "Nonexistent".into(),
                stage: Stage::Selection
            }]
        );
    }

    #[test]
    fn discovery_report_classifies_numbered_columns() {
        let schema = ParcelSchema::default();
        let raw = ["ID", "E_Tab_Opp_1", "E_Tab_NN_2", "E_Tab_Plus_X_1", "Foo_3", "E_Tab_Opp_0"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let report = DiscoveryReport::from_headers(&raw, &schema);
        assert_eq!(report.max_group_index, 3);
        assert_eq!(report.groups[&1], vec!["E_Tab_Opp".to_string()]);
        assert_eq!(report.groups[&2], vec!["E_Tab_NN".to_string()]);
        assert_eq!(report.excluded, vec!["E_Tab_Plus_X_1".to_string()]);
        assert_eq!(
            report.unrecognized,
            vec!["Foo_3".to_string(), "E_Tab_Opp_0".to_string()]
        );
        assert_eq!(report.melt_columns, 2);
    }
}
