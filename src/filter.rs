use std::collections::HashSet;

use clap::ValueEnum;

use crate::{rank::RankCategory, reconcile::ClassificationRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum RankFilter {
    #[default]
    All,
    Cockpit,
    Cabin,
}

impl RankFilter {
    pub fn matches(&self, rank: RankCategory) -> bool {
        match self {
            RankFilter::All => true,
            RankFilter::Cockpit => rank == RankCategory::Cockpit,
            RankFilter::Cabin => rank == RankCategory::Cabin,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankFilter::All => "All ranks",
            RankFilter::Cockpit => "Cockpit",
            RankFilter::Cabin => "Cabin crew",
        }
    }
}

/// Rank and date selection applied to reconciled records.
///
/// An empty date list keeps every date.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub rank: RankFilter,
    pub dates: Vec<String>,
}

impl RecordFilter {
    pub fn new(rank: RankFilter, dates: &[String]) -> Self {
        Self {
            rank,
            dates: parse_date_list(dates),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.rank == RankFilter::All && self.dates.is_empty()
    }

    pub fn matches(&self, record: &ClassificationRecord) -> bool {
        self.rank.matches(record.rank)
            && (self.dates.is_empty() || self.dates.iter().any(|d| *d == record.date))
    }

    pub fn apply<'a>(&self, records: &'a [ClassificationRecord]) -> Vec<&'a ClassificationRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Requested dates that are not among `available`.
    pub fn unknown_dates<'a>(&'a self, available: &[String]) -> Vec<&'a str> {
        let known = available.iter().map(String::as_str).collect::<HashSet<_>>();
        self.dates
            .iter()
            .map(String::as_str)
            .filter(|d| !known.contains(d))
            .collect()
    }
}

/// Flattens repeated and comma separated `--date` values, dropping blanks and
/// repeats while keeping first-seen order.
pub fn parse_date_list(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| seen.insert(d.to_string()))
        .map(str::to_string)
        .collect()
}
