//! In-memory roster tables.
//!
//! A [`RosterTable`] is a header row plus one row of cells per crew member,
//! exactly as read from the file. Nothing is interpreted at load time; column
//! roles are resolved by name when the table is reconciled.

use std::{io::Read, path::Path};

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    error::{ReconcileError, TableSide},
    io_utils,
};

pub const DEFAULT_IDENTIFIER_COLUMNS: &[&str] = &[
    "No",
    "Crew ID",
    "Crew Name",
    "Company",
    "Rank",
    "Period",
    "Training Qualification",
    "Under Training Status",
    "Crew Category",
];

/// How a roster file is laid out on disk.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
    /// Number of lines before the header line (report titles and the like).
    pub header_row: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RosterTable {
    /// Builds a table from already split cells. Short rows are padded with
    /// blanks so every row has one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width.max(row.len()), String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn from_path(path: &Path, options: &ReadOptions) -> Result<Self> {
        let input = io_utils::open_input(path)?;
        Self::from_reader(input, options).with_context(|| format!("Reading roster {path:?}"))
    }

    pub fn from_reader<R: Read>(reader: R, options: &ReadOptions) -> Result<Self> {
        let mut reader = io_utils::open_roster_reader(reader, options.delimiter);
        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (line_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading line {}", line_idx + 1))?;
            if line_idx < options.header_row {
                continue;
            }
            let decoded = io_utils::decode_record(&record, options.encoding)
                .with_context(|| format!("Decoding line {}", line_idx + 1))?;
            if headers.is_none() {
                headers = Some(decoded);
                continue;
            }
            if decoded.iter().all(|cell| cell.trim().is_empty()) {
                debug!("Skipping blank line {}", line_idx + 1);
                continue;
            }
            rows.push(decoded);
        }

        let Some(headers) = headers else {
            bail!(
                "No header line found (expected after {} leading line(s))",
                options.header_row
            );
        };
        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers.iter().position(|h| h == name)
    }

    pub(crate) fn require_column(
        &self,
        side: TableSide,
        name: &str,
    ) -> Result<usize, ReconcileError> {
        self.column_index(name)
            .ok_or_else(|| ReconcileError::missing_column(side, name))
    }

    /// Cell text at `row`/`column`, blank when out of range.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    /// Every header that is not an identifier column, in table order.
    pub fn date_columns<S: AsRef<str>>(&self, identifier_columns: &[S]) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| !h.is_empty())
            .filter(|h| !identifier_columns.iter().any(|id| id.as_ref().trim() == h.as_str()))
            .cloned()
            .collect()
    }

    /// SHA-256 over headers and cells, used to key memoised reconciliations.
    pub fn content_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hash_row(&mut hasher, &self.headers);
        for row in &self.rows {
            hash_row(&mut hasher, row);
        }
        hasher.finalize().into()
    }
}

fn hash_row(hasher: &mut Sha256, row: &[String]) {
    hasher.update((row.len() as u64).to_le_bytes());
    for cell in row {
        hasher.update((cell.len() as u64).to_le_bytes());
        hasher.update(cell.as_bytes());
    }
}
