//! Record and summary writers.
//!
//! `export` mirrors the sheets of the workbook analysts used to download:
//! the detail list, the per-date, per-rank and per-crew summaries and the
//! overall totals, one CSV file each.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::ExportArgs,
    io_utils,
    reconcile::ClassificationRecord,
    report::Report,
    session::Session,
    table::TextTable,
};

pub const DETAIL_FILE: &str = "detail.csv";
pub const PER_DATE_FILE: &str = "per_date.csv";
pub const PER_RANK_FILE: &str = "per_rank.csv";
pub const PER_CREW_FILE: &str = "per_crew.csv";
pub const SUMMARY_TOTAL_FILE: &str = "summary_total.csv";

pub fn write_records_csv<W: Write>(
    writer: &mut csv::Writer<W>,
    records: &[&ClassificationRecord],
) -> Result<usize> {
    writer
        .write_record(ClassificationRecord::HEADERS)
        .context("Writing record headers")?;
    for (idx, record) in records.iter().enumerate() {
        writer
            .write_record(record.to_row())
            .with_context(|| format!("Writing record {}", idx + 1))?;
    }
    writer.flush().context("Flushing record output")?;
    Ok(records.len())
}

pub fn write_records_json<W: Write>(
    mut writer: W,
    records: &[&ClassificationRecord],
) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records).context("Serializing records as JSON")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_table_csv<W: Write>(writer: &mut csv::Writer<W>, table: &TextTable) -> Result<()> {
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the detail list and every summary into `dir`, returning the paths
/// written in order.
pub fn export_directory(
    dir: &Path,
    delimiter: u8,
    records: &[&ClassificationRecord],
    report: &Report,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Creating export directory {dir:?}"))?;

    let detail = dir.join(DETAIL_FILE);
    let mut writer = io_utils::open_csv_writer(Some(detail.as_path()), delimiter)?;
    write_records_csv(&mut writer, records)
        .with_context(|| format!("Writing {detail:?}"))?;

    let mut written = vec![detail];
    for (name, table) in [
        (PER_DATE_FILE, report.date_table()),
        (PER_RANK_FILE, report.rank_table()),
        (PER_CREW_FILE, report.crew_table()),
        (SUMMARY_TOTAL_FILE, report.totals_table()),
    ] {
        let path = dir.join(name);
        let mut writer = io_utils::open_csv_writer(Some(path.as_path()), delimiter)?;
        write_table_csv(&mut writer, &table).with_context(|| format!("Writing {path:?}"))?;
        written.push(path);
    }
    Ok(written)
}

pub fn execute(args: &ExportArgs) -> Result<()> {
    let session = Session::load(&args.roster)?;
    let outcome = session.reconcile()?;
    let filter = session.record_filter(&args.filter);
    let selected = filter.apply(&outcome.records);
    let report = Report::build(&selected);
    let delimiter = args.output_delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);

    let written = export_directory(&args.dir, delimiter, &selected, &report)?;
    info!(
        "Exported {} record(s) for {} into {} file(s) under {:?}",
        selected.len(),
        filter.rank.label(),
        written.len(),
        args.dir
    );
    Ok(())
}
