use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{
    cli::PreviewArgs,
    io_utils,
    roster::{ReadOptions, RosterTable},
    session, table,
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let settings = session::load_settings(args.config.as_deref(), args.header_row, None)?;
    let options = ReadOptions {
        delimiter: io_utils::resolve_input_delimiter(&args.input, args.delimiter),
        encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
        header_row: settings.header_row,
    };
    let roster = RosterTable::from_path(&args.input, &options)?;
    let rows = roster
        .rows()
        .iter()
        .take(args.rows)
        .cloned()
        .collect::<Vec<_>>();

    table::print_table(roster.headers(), &rows);
    let dates = roster.date_columns(&settings.effective_identifier_columns());
    println!();
    println!("Date columns ({}): {}", dates.len(), dates.iter().join(", "));
    for (label, column) in [
        ("crew id", &settings.columns.crew_id),
        ("rank", &settings.columns.rank),
    ] {
        if roster.column_index(column).is_none() {
            println!("Missing {label} column '{column}'");
        }
    }
    info!(
        "Displayed {} of {} row(s) from {:?}",
        rows.len(),
        roster.len(),
        args.input
    );
    Ok(())
}
