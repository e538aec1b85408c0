use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{filter::RankFilter, policy::MatchMode};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Compare planned and actual crew rosters",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every crew/date cell as maintain or change
    Compare(CompareArgs),
    /// Print maintain/change counts per date, rank, crew and in total
    Summary(SummaryArgs),
    /// Write the detail records and every summary as CSV files into a directory
    Export(ExportArgs),
    /// Show the first rows of a roster and the date columns found in it
    Preview(PreviewArgs),
    /// Write the default settings file
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
pub struct RosterArgs {
    /// Planned roster (CSV/TSV, '-' for stdin)
    #[arg(short = 'p', long = "planned")]
    pub planned: PathBuf,
    /// Actual roster (CSV/TSV, '-' for stdin)
    #[arg(short = 'a', long = "actual")]
    pub actual: PathBuf,
    /// YAML settings file (column names, standby codes, policy)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of both rosters (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of lines before the header line (overrides the settings file)
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
    /// Cell matching policy (overrides the settings file)
    #[arg(long, value_enum)]
    pub policy: Option<MatchMode>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Restrict output to one rank category
    #[arg(long, value_enum, default_value = "all")]
    pub rank: RankFilter,
    /// Restrict output to these date columns (repeatable, comma separated)
    #[arg(long = "date", action = clap::ArgAction::Append)]
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Table,
    Json,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub roster: RosterArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Output file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: OutputFormat,
    /// Delimiter for CSV output (defaults from the output extension)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Also print each cell that was compared as plain text
    #[arg(long = "show-warnings")]
    pub show_warnings: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum SummaryKind {
    Date,
    Rank,
    Crew,
    Total,
}

impl SummaryKind {
    pub const ALL: [SummaryKind; 4] = [
        SummaryKind::Total,
        SummaryKind::Date,
        SummaryKind::Rank,
        SummaryKind::Crew,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SummaryKind::Date => "Maintain and change per date",
            SummaryKind::Rank => "Maintain and change per rank",
            SummaryKind::Crew => "Maintain and change per crew",
            SummaryKind::Total => "Totals",
        }
    }
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub roster: RosterArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Summaries to print (repeatable, comma separated; all when omitted)
    #[arg(long = "by", value_enum, value_delimiter = ',', action = clap::ArgAction::Append)]
    pub by: Vec<SummaryKind>,
    /// Print every summary as one JSON document instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub roster: RosterArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Directory receiving detail.csv, per_date.csv, per_rank.csv, per_crew.csv and summary_total.csv
    #[arg(short = 'd', long = "dir")]
    pub dir: PathBuf,
    /// Delimiter for the exported files
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Roster file to preview
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// YAML settings file
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// CSV delimiter character
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding for input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Number of lines before the header line
    #[arg(long = "header-row")]
    pub header_row: Option<usize>,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Destination settings file
    #[arg(short = 'o', long = "output", default_value = "crew-recon.yml")]
    pub output: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
