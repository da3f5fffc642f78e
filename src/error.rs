//! Failure and warning types for the reshape pipeline.
//!
//! Only [`ParseFailure`] is terminal: it is raised by the input decoder when the
//! bytes cannot be read as a delimited table. Everything the engine itself
//! runs into is a [`ReshapeWarning`] and degrades to a narrower result.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The five engine stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Discovery,
    Selection,
    Unpivot,
    Repivot,
    Normalization,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Discovery,
        Stage::Selection,
        Stage::Unpivot,
        Stage::Repivot,
        Stage::Normalization,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Discovery => "schema discovery",
            Stage::Selection => "selection",
            Stage::Unpivot => "unpivot",
            Stage::Repivot => "repivot",
            Stage::Normalization => "schema normalization",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input that cannot be decoded as a delimited table.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("input is empty: no header row found")]
    Empty,

    #[error("header row contains no column names")]
    NoColumns,

    #[error("malformed delimited data near line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("row {row} has {found} field(s) but the header declares {expected}")]
    TooManyFields {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row} is not valid {encoding} text")]
    Decode { row: usize, encoding: &'static str },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal irregularities reported alongside a reshape result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReshapeWarning {
    /// A requested fixed column does not exist in the input headers.
    MissingFixedColumn { column: String, stage: Stage },
    /// No header ends in a numeric group suffix.
    NoGroupedColumns,
    /// Numbered headers exist but none resolve to a known attribute.
    NoColumnsToMelt { max_group_index: u32 },
    /// Neither groups nor fixed columns survived; the result is empty.
    NoMeaningfulOutput { stage: Stage },
}

impl ReshapeWarning {
    pub fn stage(&self) -> Stage {
        match self {
            ReshapeWarning::MissingFixedColumn { stage, .. } => *stage,
            ReshapeWarning::NoGroupedColumns => Stage::Discovery,
            ReshapeWarning::NoColumnsToMelt { .. } => Stage::Selection,
            ReshapeWarning::NoMeaningfulOutput { stage } => *stage,
        }
    }
}

impl fmt::Display for ReshapeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReshapeWarning::MissingFixedColumn { column, stage } => write!(
                f,
                "fixed column '{column}' not found in input during {stage}; it is skipped"
            ),
            ReshapeWarning::NoGroupedColumns => f.write_str(
                "no numbered parcel columns found; continuing with fixed columns only",
            ),
            ReshapeWarning::NoColumnsToMelt { max_group_index } => write!(
                f,
                "numbered columns up to index {max_group_index} exist but none match a known attribute"
            ),
            ReshapeWarning::NoMeaningfulOutput { stage } => write!(
                f,
                "no meaningful output after {stage}: no parcel groups or fixed columns found"
            ),
        }
    }
}
