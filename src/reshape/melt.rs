use crate::{
    data::{Cell, decode_cell},
    frame::InputTable,
};

use super::discovery::{FixedColumn, SelectedColumn};

/// One (row, grouped column) pair produced by the unpivot stage.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MoltenRecord<'a> {
    pub row_id: usize,
    pub fixed: &'a [Cell],
    pub source_column: &'a str,
    pub value: Cell,
}

/// Decodes the fixed columns of every row, indexed by row ordinal.
pub(crate) fn fixed_values(input: &InputTable, fixed: &[FixedColumn]) -> Vec<Vec<Cell>> {
    (0..input.row_count())
        .map(|row| {
            fixed
                .iter()
                .map(|column| decode_cell(input.field(row, column.position)))
                .collect()
        })
        .collect()
}

/// Long-format expansion: `rows × selected` records, row-major.
pub(crate) fn melt<'a>(
    input: &InputTable,
    fixed_values: &'a [Vec<Cell>],
    selected: &'a [SelectedColumn],
) -> Vec<MoltenRecord<'a>> {
    let mut records = Vec::with_capacity(input.row_count() * selected.len());
    for (row_id, fixed) in fixed_values.iter().enumerate() {
        for column in selected {
            records.push(MoltenRecord {
                row_id,
                fixed,
                source_column: &column.name,
                value: decode_cell(input.field(row_id, column.position)),
            });
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    #[test]
    fn melt_emits_one_record_per_row_and_column() {
        let input = InputTable::from_rows(
            ["ID", "E_Tab_Opp_1", "E_Tab_Opp_2"],
            [vec!["A", "1.5", ""], vec!["B", "", "3"]],
        );
        let fixed = vec![FixedColumn {
            name: "ID".into(),
            position: 0,
        }];
        let selected = vec![
            SelectedColumn {
                name: "E_Tab_Opp_1".into(),
                position: 1,
                group: 1,
            },
            SelectedColumn {
                name: "E_Tab_Opp_2".into(),
                position: 2,
                group: 2,
            },
        ];
        let values = fixed_values(&input, &fixed);
        let records = melt(&input, &values, &selected);
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].source_column, "E_Tab_Opp_1");
        assert_eq!(records[0].value, Some(Value::Text("1.5".into())));
        assert_eq!(records[1].value, None);
        assert_eq!(records[3].row_id, 1);
        assert_eq!(records[3].fixed, &[Some(Value::Text("B".into()))][..]);
    }
}
