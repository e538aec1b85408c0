//! Shared input handling for the commands that compare two rosters.

use std::path::Path;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use log::{debug, info, warn};

use crate::{
    cli::{FilterArgs, RosterArgs},
    config::Settings,
    filter::RecordFilter,
    io_utils,
    policy::MatchMode,
    reconcile::{Reconciliation, ScheduleReconciler},
    roster::{ReadOptions, RosterTable},
};

/// Both rosters loaded with their settings resolved.
#[derive(Debug)]
pub struct Session {
    pub settings: Settings,
    pub reconciler: ScheduleReconciler,
    pub planned: RosterTable,
    pub actual: RosterTable,
    pub date_columns: Vec<String>,
}

impl Session {
    pub fn load(args: &RosterArgs) -> Result<Self> {
        if io_utils::is_dash(&args.planned) && io_utils::is_dash(&args.actual) {
            bail!("Only one of --planned and --actual can be read from stdin");
        }
        let settings = load_settings(args.config.as_deref(), args.header_row, args.policy)?;
        let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

        let read = |path: &Path| -> Result<RosterTable> {
            let options = ReadOptions {
                delimiter: io_utils::resolve_input_delimiter(path, args.delimiter),
                encoding,
                header_row: settings.header_row,
            };
            info!(
                "Reading roster '{}' with delimiter '{}'",
                path.display(),
                crate::printable_delimiter(options.delimiter)
            );
            RosterTable::from_path(path, &options)
        };
        let planned = read(args.planned.as_path())?;
        let actual = read(args.actual.as_path())?;
        info!(
            "Loaded planned roster: {} row(s), actual roster: {} row(s)",
            planned.len(),
            actual.len()
        );

        let identifiers = settings.effective_identifier_columns();
        let date_columns = planned.date_columns(&identifiers);
        debug!("Date columns: {}", date_columns.iter().join(", "));
        let extra = actual
            .date_columns(&identifiers)
            .into_iter()
            .filter(|d| !date_columns.contains(d))
            .collect::<Vec<_>>();
        if !extra.is_empty() {
            warn!(
                "Ignoring {} date column(s) only present in the actual roster: {}",
                extra.len(),
                extra.iter().join(", ")
            );
        }

        let reconciler = settings.reconciler();
        Ok(Self {
            settings,
            reconciler,
            planned,
            actual,
            date_columns,
        })
    }

    pub fn reconcile(&self) -> Result<Reconciliation> {
        let outcome = self
            .reconciler
            .run(&self.planned, &self.actual, &self.date_columns)?;
        info!(
            "Reconciled {} crew across {} date(s): {} record(s), {} new crew, {} crew missing from actual",
            outcome.matched_crew + outcome.new_crew,
            self.date_columns.len(),
            outcome.records.len(),
            outcome.new_crew,
            outcome.departed_crew
        );
        if !outcome.warnings.is_empty() {
            info!(
                "{} cell(s) did not look like a flight, standby or off marker and were compared as plain text",
                outcome.warnings.len()
            );
        }
        Ok(outcome)
    }

    pub fn record_filter(&self, args: &FilterArgs) -> RecordFilter {
        let filter = RecordFilter::new(args.rank, &args.dates);
        let unknown = filter.unknown_dates(&self.date_columns);
        if !unknown.is_empty() {
            warn!(
                "Requested date(s) not found in the planned roster: {}",
                unknown.iter().join(", ")
            );
        }
        filter
    }
}

/// Settings file (or defaults) with command-line overrides applied.
pub(crate) fn load_settings(
    path: Option<&Path>,
    header_row: Option<usize>,
    policy: Option<MatchMode>,
) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(rows) = header_row {
        settings.header_row = rows;
    }
    if let Some(policy) = policy {
        settings.cells.policy = policy;
    }
    settings.validate().context("Validating settings")?;
    Ok(settings)
}
