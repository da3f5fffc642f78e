use crate::{
    data::{Cell, Value, coerce_numeric, decode_cell},
    frame::{InputTable, OutputTable},
    schema::ParcelSchema,
};

use super::{discovery::FixedColumn, pivot::PivotRow};

/// Whether the group column gets its own output column. A fixed column with
/// the same name takes its place.
fn emits_group_column(fixed: &[FixedColumn], schema: &ParcelSchema) -> bool {
    !fixed.iter().any(|c| c.name == schema.group_column)
}

/// Final column list: fixed columns, the group column, then every attribute
/// in schema order. Names already taken by a fixed column are not repeated.
pub(crate) fn output_columns(fixed: &[FixedColumn], schema: &ParcelSchema) -> Vec<String> {
    let mut columns = Vec::with_capacity(fixed.len() + 1 + schema.attributes.len());
    columns.extend(fixed.iter().map(|c| c.name.clone()));
    if emits_group_column(fixed, schema) {
        columns.push(schema.group_column.clone());
    }
    for attribute in &schema.attributes {
        if !columns.contains(attribute) {
            columns.push(attribute.clone());
        }
    }
    columns
}

/// Fills absent attributes with nulls, coerces numeric attributes and lays
/// rows out under [`output_columns`]. The row identity is not carried over.
pub(crate) fn normalize(
    rows: Vec<PivotRow>,
    fixed: &[FixedColumn],
    schema: &ParcelSchema,
) -> (OutputTable, usize) {
    let with_group = emits_group_column(fixed, schema);
    let mut table = OutputTable::new(output_columns(fixed, schema));
    let attribute_columns = table.columns()[fixed.len() + usize::from(with_group)..].to_vec();
    let numeric = attribute_columns
        .iter()
        .map(|name| schema.is_numeric(name))
        .collect::<Vec<_>>();

    let mut coercion_failures = 0usize;
    for mut row in rows {
        let mut cells: Vec<Cell> = Vec::with_capacity(table.columns().len());
        cells.extend(row.fixed);
        if with_group {
            cells.push(Some(Value::Text(row.group)));
        }
        for (attribute, is_numeric) in attribute_columns.iter().zip(&numeric) {
            let raw = row.attributes.remove(attribute).flatten();
            if *is_numeric {
                let had_value = raw.is_some();
                let coerced = coerce_numeric(raw);
                if had_value && coerced.is_none() {
                    coercion_failures += 1;
                }
                cells.push(coerced);
            } else {
                cells.push(raw);
            }
        }
        table.push_row(cells);
    }
    (table, coercion_failures)
}

/// Degraded result holding only the surviving fixed columns, row for row.
pub(crate) fn pass_through(input: &InputTable, fixed: &[FixedColumn]) -> OutputTable {
    let mut table = OutputTable::new(fixed.iter().map(|c| c.name.clone()).collect());
    for row in 0..input.row_count() {
        table.push_row(
            fixed
                .iter()
                .map(|column| decode_cell(input.field(row, column.position)))
                .collect(),
        );
    }
    table
}
