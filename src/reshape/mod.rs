//! The reshape engine: wide parcel rows in, one row per parcel out.
//!
//! A call runs five stages in order and holds no state between calls:
//!
//! 1. **Discovery** trims the headers and finds the highest numeric group suffix.
//! 2. **Selection** resolves fixed columns and picks the `<attribute>_<index>`
//!    columns to melt, index-major.
//! 3. **Unpivot** emits one record per (row, selected column).
//! 4. **Repivot** folds records back into one row per (row, group index).
//! 5. **Normalization** fills missing attributes, coerces numeric ones and
//!    fixes the column order.
//!
//! Headers without group suffixes, or suffixes that match no attribute, do not
//! fail the call: the result degrades to the fixed columns alone, or to
//! [`ReshapeOutcome::Empty`] when there are none.

mod discovery;
mod melt;
mod normalize;
mod observer;
mod pivot;

pub use discovery::{
    DiscoveryReport, FixedColumn, HeaderIndex, SelectedColumn, group_index, max_group_index,
    resolve_fixed_columns, select_columns, split_group_suffix,
};
pub use observer::{LogObserver, NoopObserver, ReshapeObserver};

use log::debug;

use crate::{
    error::{ReshapeWarning, Stage},
    frame::{InputTable, OutputTable},
    schema::ParcelSchema,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ReshapeOutcome {
    /// One row per (input row, group index).
    Reshaped(OutputTable),
    /// Fixed columns only, one row per input row.
    PassThrough(OutputTable),
    /// Nothing worth returning.
    Empty,
}

impl ReshapeOutcome {
    pub fn table(&self) -> Option<&OutputTable> {
        match self {
            ReshapeOutcome::Reshaped(table) | ReshapeOutcome::PassThrough(table) => Some(table),
            ReshapeOutcome::Empty => None,
        }
    }

    pub fn into_table(self) -> Option<OutputTable> {
        match self {
            ReshapeOutcome::Reshaped(table) | ReshapeOutcome::PassThrough(table) => Some(table),
            ReshapeOutcome::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReshapeReport {
    pub outcome: ReshapeOutcome,
    pub warnings: Vec<ReshapeWarning>,
    pub max_group_index: u32,
    /// Numeric cells that held text which did not parse.
    pub coercion_failures: usize,
}

/// Runs the engine without progress notifications.
pub fn reshape(
    input: &InputTable,
    fixed_columns: &[String],
    schema: &ParcelSchema,
) -> ReshapeReport {
    reshape_with_observer(input, fixed_columns, schema, &mut NoopObserver)
}

pub fn reshape_with_observer(
    input: &InputTable,
    fixed_columns: &[String],
    schema: &ParcelSchema,
    observer: &mut dyn ReshapeObserver,
) -> ReshapeReport {
    let mut run = Run {
        observer,
        warnings: Vec::new(),
    };

    run.observer.stage_started(Stage::Discovery);
    let headers = HeaderIndex::new(input.headers());
    let max_group_index = max_group_index(headers.names());
    debug!("Highest group index in headers: {max_group_index}");
    run.observer.stage_completed(Stage::Discovery);

    if max_group_index == 0 {
        run.warn(ReshapeWarning::NoGroupedColumns);
        let fixed = run.resolve_fixed(fixed_columns, &headers, Stage::Discovery);
        let outcome = run.fallback(input, &fixed, Stage::Discovery);
        return run.finish(outcome, max_group_index, 0);
    }

    run.observer.stage_started(Stage::Selection);
    let fixed = run.resolve_fixed(fixed_columns, &headers, Stage::Selection);
    let selected = select_columns(&headers, schema, &fixed);
    debug!(
        "Selected {} column(s) to melt with {} fixed column(s)",
        selected.len(),
        fixed.len()
    );
    run.observer.stage_completed(Stage::Selection);

    if selected.is_empty() {
        run.warn(ReshapeWarning::NoColumnsToMelt { max_group_index });
        let outcome = run.fallback(input, &fixed, Stage::Selection);
        return run.finish(outcome, max_group_index, 0);
    }

    run.observer.stage_started(Stage::Unpivot);
    let fixed_values = melt::fixed_values(input, &fixed);
    let records = melt::melt(input, &fixed_values, &selected);
    debug!("Unpivoted into {} record(s)", records.len());
    run.observer.stage_completed(Stage::Unpivot);

    run.observer.stage_started(Stage::Repivot);
    let rows = pivot::repivot(records);
    debug!("Repivoted into {} parcel row(s)", rows.len());
    run.observer.stage_completed(Stage::Repivot);

    run.observer.stage_started(Stage::Normalization);
    let (table, coercion_failures) = normalize::normalize(rows, &fixed, schema);
    if coercion_failures > 0 {
        debug!("{coercion_failures} numeric cell(s) could not be parsed and were set to null");
    }
    run.observer.stage_completed(Stage::Normalization);

    run.finish(
        ReshapeOutcome::Reshaped(table),
        max_group_index,
        coercion_failures,
    )
}

struct Run<'o> {
    observer: &'o mut dyn ReshapeObserver,
    warnings: Vec<ReshapeWarning>,
}

impl Run<'_> {
    fn warn(&mut self, warning: ReshapeWarning) {
        self.observer.warning(&warning);
        self.warnings.push(warning);
    }

    fn resolve_fixed(
        &mut self,
        requested: &[String],
        headers: &HeaderIndex,
        stage: Stage,
    ) -> Vec<FixedColumn> {
        let mut missing = Vec::new();
        let fixed = resolve_fixed_columns(requested, headers, stage, &mut missing);
        for warning in missing {
            self.warn(warning);
        }
        fixed
    }

    fn fallback(
        &mut self,
        input: &InputTable,
        fixed: &[FixedColumn],
        stage: Stage,
    ) -> ReshapeOutcome {
        if fixed.is_empty() {
            self.warn(ReshapeWarning::NoMeaningfulOutput { stage });
            ReshapeOutcome::Empty
        } else {
            ReshapeOutcome::PassThrough(normalize::pass_through(input, fixed))
        }
    }

    fn finish(
        self,
        outcome: ReshapeOutcome,
        max_group_index: u32,
        coercion_failures: usize,
    ) -> ReshapeReport {
        self.observer.finished(&outcome);
        ReshapeReport {
            outcome,
            warnings: self.warnings,
            max_group_index,
            coercion_failures,
        }
    }
}
