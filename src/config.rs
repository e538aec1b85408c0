//! YAML settings for roster layout and the equivalence policy.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! standard roster export: `Crew ID`/`Crew Name`/`Rank` columns, `SA1`/`SA2`
//! standby, `OFF` rest days and tolerant matching. Command-line flags are
//! layered on top by the caller.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result, bail, ensure};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    cli::InitConfigArgs,
    policy::CellRules,
    rank::{DEFAULT_COCKPIT_RANKS, RankClassifier},
    reconcile::{ColumnNames, ScheduleReconciler},
    roster::DEFAULT_IDENTIFIER_COLUMNS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub columns: ColumnNames,
    /// Columns that are never treated as dates.
    pub identifier_columns: Vec<String>,
    /// Lines to skip before the header line.
    pub header_row: usize,
    pub cockpit_ranks: Vec<String>,
    pub cells: CellRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            identifier_columns: DEFAULT_IDENTIFIER_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            header_row: 0,
            cockpit_ranks: DEFAULT_COCKPIT_RANKS.iter().map(|r| r.to_string()).collect(),
            cells: CellRules::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading settings file {path:?}"))?;
        let settings = Self::from_yaml(&raw)
            .with_context(|| format!("Parsing settings file {path:?}"))?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = self.to_yaml()?;
        let mut file =
            File::create(path).with_context(|| format!("Creating settings file {path:?}"))?;
        file.write_all(serialized.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.columns.crew_id.trim().is_empty(),
            "columns.crew_id cannot be empty"
        );
        ensure!(
            !self.columns.rank.trim().is_empty(),
            "columns.rank cannot be empty"
        );
        ensure!(
            !self.cells.off_marker.trim().is_empty(),
            "cells.off_marker cannot be empty"
        );
        if let Some(code) = self
            .cells
            .standby_codes
            .iter()
            .find(|code| code.trim().eq_ignore_ascii_case(self.cells.off_marker.trim()))
        {
            bail!("'{code}' cannot be both a standby code and the off marker");
        }
        Ok(())
    }

    /// Identifier columns plus the configured crew id, name and rank columns,
    /// so those can never be mistaken for dates.
    pub fn effective_identifier_columns(&self) -> Vec<String> {
        let mut columns = self
            .identifier_columns
            .iter()
            .map(|c| c.trim().to_string())
            .collect::<Vec<_>>();
        for required in [
            &self.columns.crew_id,
            &self.columns.crew_name,
            &self.columns.rank,
        ] {
            let required = required.trim();
            if !columns.iter().any(|c| c == required) {
                columns.push(required.to_string());
            }
        }
        columns
    }

    pub fn reconciler(&self) -> ScheduleReconciler {
        ScheduleReconciler::new(
            self.columns.clone(),
            RankClassifier::new(&self.cockpit_ranks),
            self.cells.clone(),
        )
    }
}

pub fn execute_init(args: &InitConfigArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!(
            "{:?} already exists; pass --force to overwrite it",
            args.output
        );
    }
    Settings::default()
        .save(&args.output)
        .with_context(|| format!("Writing settings to {:?}", args.output))?;
    info!("Default settings written to {:?}", args.output);
    Ok(())
}
