//! Header inspection without reshaping.
//!
//! Lists, per group index, which parcel attributes the input carries, plus
//! numbered columns that will be ignored.

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;

use crate::{
    cli::DiscoverArgs, io_utils, reshape::DiscoveryReport, schema::ParcelSchema, table,
};

pub fn execute(args: &DiscoverArgs) -> Result<()> {
    let delimiter = args.delimiter.unwrap_or(io_utils::DEFAULT_INPUT_DELIMITER);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let schema = ParcelSchema::load_or_default(args.schema.as_deref())?;
    let input = io_utils::read_table_from_path(&args.input, delimiter, encoding)?;
    let report = DiscoveryReport::from_headers(input.headers(), &schema);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Serializing discovery report")?;
        println!("{json}");
    } else {
        print!("{}", render_report(&report, schema.attributes.len()));
    }
    info!(
        "Found {} group index(es) and {} column(s) to melt in {:?}",
        report.groups.len(),
        report.melt_columns,
        args.input
    );
    Ok(())
}

pub fn render_report(report: &DiscoveryReport, attribute_count: usize) -> String {
    let headers = vec![
        "group".to_string(),
        "found".to_string(),
        "attributes".to_string(),
    ];
    let rows = report
        .groups
        .iter()
        .map(|(group, attributes)| {
            vec![
                group.to_string(),
                format!("{}/{attribute_count}", attributes.len()),
                attributes.iter().join(", "),
            ]
        })
        .collect::<Vec<_>>();

    let mut output = format!("Highest group index: {}\n", report.max_group_index);
    if rows.is_empty() {
        output.push_str("No parcel groups found.\n");
    } else {
        output.push_str(&table::render_table(&headers, &rows));
    }
    if !report.unrecognized.is_empty() {
        output.push_str(&format!(
            "Ignored numbered columns: {}\n",
            report.unrecognized.iter().join(", ")
        ));
    }
    if !report.excluded.is_empty() {
        output.push_str(&format!(
            "Excluded by reserved prefix: {}\n",
            report.excluded.iter().join(", ")
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_report_lists_groups_and_ignored_columns() {
        let headers = ["ID", "E_Tab_Opp_1", "E_Tab_NN_1", "E_Tab_Plus_Opp_1", "Foo_2"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let report = DiscoveryReport::from_headers(&headers, &ParcelSchema::default());
        let rendered = render_report(&report, 14);
        assert!(rendered.starts_with("Highest group index: 2\n"));
        assert!(rendered.contains("2/14"));
        assert!(rendered.contains("E_Tab_Opp, E_Tab_NN"));
        assert!(rendered.contains("Ignored numbered columns: Foo_2"));
        assert!(rendered.contains("Excluded by reserved prefix: E_Tab_Plus_Opp_1"));
    }

    #[test]
    fn render_report_handles_flat_headers() {
        let report = DiscoveryReport::from_headers(&["Note".to_string()], &ParcelSchema::default());
        assert!(render_report(&report, 14).contains("No parcel groups found."));
    }
}
