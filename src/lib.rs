pub mod cell;
pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod flight;
pub mod io_utils;
pub mod memo;
pub mod policy;
pub mod preview;
pub mod rank;
pub mod reconcile;
pub mod report;
pub mod roster;
pub mod session;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::{Cli, Commands};

pub use crate::{
    error::{ReconcileError, TableSide},
    policy::{Category, CellRules, MatchMode, is_maintain},
    rank::{RankCategory, RankClassifier, classify},
    reconcile::{ClassificationRecord, Reconciliation, ScheduleReconciler, reconcile},
    roster::RosterTable,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("crew_recon", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("{:?}", cli.command);
    match cli.command {
        Commands::Compare(args) => compare::execute(&args),
        Commands::Summary(args) => report::execute(&args),
        Commands::Export(args) => export::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::InitConfig(args) => config::execute_init(&args),
    }
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}
