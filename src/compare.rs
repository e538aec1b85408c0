use std::io::Write;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::{CompareArgs, OutputFormat},
    export, io_utils,
    reconcile::ClassificationRecord,
    session::Session,
    table::TextTable,
};

pub fn execute(args: &CompareArgs) -> Result<()> {
    let session = Session::load(&args.roster)?;
    let outcome = session.reconcile()?;
    if args.show_warnings {
        for warning in &outcome.warnings {
            warn!("{warning}");
        }
    }

    let filter = session.record_filter(&args.filter);
    let selected = filter.apply(&outcome.records);
    let output_path = args.output.as_deref();

    match args.format {
        OutputFormat::Csv => {
            let delimiter = io_utils::resolve_output_delimiter(output_path, args.output_delimiter);
            let mut writer = io_utils::open_csv_writer(output_path, delimiter)?;
            export::write_records_csv(&mut writer, &selected)?;
        }
        OutputFormat::Json => {
            let writer = io_utils::open_output(output_path)?;
            export::write_records_json(writer, &selected)?;
        }
        OutputFormat::Table => {
            let mut table = TextTable::new(ClassificationRecord::HEADERS);
            for record in &selected {
                table.push(record.to_row());
            }
            let mut writer = io_utils::open_output(output_path)?;
            writer
                .write_all(table.render().as_bytes())
                .context("Writing table output")?;
            writer.flush()?;
        }
    }

    info!(
        "Wrote {} of {} record(s) ({}) to {}",
        selected.len(),
        outcome.records.len(),
        filter.rank.label(),
        io_utils::describe_output(output_path)
    );
    Ok(())
}
