//! Typed failures raised by the reconciliation core.
//!
//! Everything in here is a structural problem with one of the two input
//! tables. None of them are retryable: the caller has to fix the roster and
//! run again. I/O and parsing failures in the CLI layers stay on `anyhow`.

use std::fmt;

use thiserror::Error;

/// Which of the two rosters a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSide {
    Planned,
    Actual,
}

impl fmt::Display for TableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSide::Planned => f.write_str("planned"),
            TableSide::Actual => f.write_str("actual"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("{table} roster is missing required column '{column}'")]
    MissingColumn { table: TableSide, column: String },

    #[error("{table} roster has no date column '{column}'")]
    MissingDateColumn { table: TableSide, column: String },

    #[error("{table} roster lists crew id '{crew_id}' more than once (rows {first} and {second})")]
    DuplicateCrewId {
        table: TableSide,
        crew_id: String,
        first: usize,
        second: usize,
    },

    #[error("no date columns to compare; every column of the planned roster is an identifier column")]
    NoDateColumns,
}

impl ReconcileError {
    pub(crate) fn missing_column(table: TableSide, column: &str) -> Self {
        ReconcileError::MissingColumn {
            table,
            column: column.to_string(),
        }
    }
}
