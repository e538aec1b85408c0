//! Maintain/change summaries over reconciled records.
//!
//! Every summary accepts any iterator of record references, so the same code
//! serves the full record list and a filtered view of it.

use std::collections::{BTreeMap, HashMap, HashSet};

use anyhow::Result;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    cli::{SummaryArgs, SummaryKind},
    policy::Category,
    rank::RankCategory,
    reconcile::ClassificationRecord,
    session::Session,
    table::TextTable,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub maintain: usize,
    pub change: usize,
}

impl CategoryCounts {
    pub fn add(&mut self, category: Category) {
        match category {
            Category::Maintain => self.maintain += 1,
            Category::Change => self.change += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.maintain + self.change
    }

    /// Share of `category` in percent; zero when there is nothing to count.
    pub fn percent(&self, category: Category) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let count = match category {
            Category::Maintain => self.maintain,
            Category::Change => self.change,
        };
        count as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSummary {
    pub date: String,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankSummary {
    pub rank: RankCategory,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewSummary {
    pub crew_id: String,
    pub crew_name: String,
    pub rank: RankCategory,
    #[serde(flatten)]
    pub counts: CategoryCounts,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub records: usize,
    pub maintain: usize,
    pub change: usize,
    pub maintain_percent: f64,
    pub change_percent: f64,
    pub crew: usize,
}

/// Counts per date column, in the order dates first appear.
pub fn by_date<'a, I>(records: I) -> Vec<DateSummary>
where
    I: IntoIterator<Item = &'a ClassificationRecord>,
{
    let mut order: Vec<DateSummary> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    for record in records {
        let slot = *slots.entry(record.date.as_str()).or_insert_with(|| {
            order.push(DateSummary {
                date: record.date.clone(),
                counts: CategoryCounts::default(),
            });
            order.len() - 1
        });
        order[slot].counts.add(record.category);
    }
    order
}

/// Counts per rank category, cockpit first.
pub fn by_rank<'a, I>(records: I) -> Vec<RankSummary>
where
    I: IntoIterator<Item = &'a ClassificationRecord>,
{
    let mut groups: BTreeMap<RankCategory, CategoryCounts> = BTreeMap::new();
    for record in records {
        groups.entry(record.rank).or_default().add(record.category);
    }
    groups
        .into_iter()
        .map(|(rank, counts)| RankSummary { rank, counts })
        .collect()
}

/// Counts per crew member, most records first; ties keep roster order.
pub fn by_crew<'a, I>(records: I) -> Vec<CrewSummary>
where
    I: IntoIterator<Item = &'a ClassificationRecord>,
{
    let mut order: Vec<CrewSummary> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();
    for record in records {
        let slot = *slots.entry(record.crew_id.as_str()).or_insert_with(|| {
            order.push(CrewSummary {
                crew_id: record.crew_id.clone(),
                crew_name: record.crew_name.clone(),
                rank: record.rank,
                counts: CategoryCounts::default(),
            });
            order.len() - 1
        });
        order[slot].counts.add(record.category);
    }
    order
        .into_iter()
        .sorted_by(|a, b| b.counts.total().cmp(&a.counts.total()))
        .collect()
}

pub fn totals<'a, I>(records: I) -> Totals
where
    I: IntoIterator<Item = &'a ClassificationRecord>,
{
    let mut counts = CategoryCounts::default();
    let mut crew = HashSet::new();
    for record in records {
        counts.add(record.category);
        crew.insert(record.crew_id.as_str());
    }
    Totals {
        records: counts.total(),
        maintain: counts.maintain,
        change: counts.change,
        maintain_percent: round2(counts.percent(Category::Maintain)),
        change_percent: round2(counts.percent(Category::Change)),
        crew: crew.len(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent_cell(value: f64) -> String {
    format!("{value:.2}%")
}

fn count_cells(counts: &CategoryCounts) -> [String; 3] {
    [
        counts.maintain.to_string(),
        counts.change.to_string(),
        counts.total().to_string(),
    ]
}

/// All four summaries of one record selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub per_date: Vec<DateSummary>,
    pub per_rank: Vec<RankSummary>,
    pub per_crew: Vec<CrewSummary>,
    pub totals: Totals,
}

impl Report {
    pub fn build(records: &[&ClassificationRecord]) -> Self {
        Self {
            per_date: by_date(records.iter().copied()),
            per_rank: by_rank(records.iter().copied()),
            per_crew: by_crew(records.iter().copied()),
            totals: totals(records.iter().copied()),
        }
    }

    pub fn date_table(&self) -> TextTable {
        let mut table = TextTable::new(["Date", "maintain", "change", "Total", "Change %"]);
        for row in &self.per_date {
            let [maintain, change, total] = count_cells(&row.counts);
            table.push(vec![
                row.date.clone(),
                maintain,
                change,
                total,
                percent_cell(row.counts.percent(Category::Change)),
            ]);
        }
        table
    }

    pub fn rank_table(&self) -> TextTable {
        let mut table = TextTable::new(["Rank", "maintain", "change", "Total", "Change %"]);
        for row in &self.per_rank {
            let [maintain, change, total] = count_cells(&row.counts);
            table.push(vec![
                row.rank.to_string(),
                maintain,
                change,
                total,
                percent_cell(row.counts.percent(Category::Change)),
            ]);
        }
        table
    }

    pub fn crew_table(&self) -> TextTable {
        let mut table = TextTable::new([
            "Crew ID",
            "Crew Name",
            "Rank",
            "maintain",
            "change",
            "Total",
        ]);
        for row in &self.per_crew {
            let [maintain, change, total] = count_cells(&row.counts);
            table.push(vec![
                row.crew_id.clone(),
                row.crew_name.clone(),
                row.rank.to_string(),
                maintain,
                change,
                total,
            ]);
        }
        table
    }

    pub fn totals_table(&self) -> TextTable {
        let totals = &self.totals;
        let mut table = TextTable::new(["Category", "Count", "Percent"]);
        table.push(vec![
            Category::Maintain.to_string(),
            totals.maintain.to_string(),
            percent_cell(totals.maintain_percent),
        ]);
        table.push(vec![
            Category::Change.to_string(),
            totals.change.to_string(),
            percent_cell(totals.change_percent),
        ]);
        table
    }

    pub fn table(&self, kind: SummaryKind) -> TextTable {
        match kind {
            SummaryKind::Date => self.date_table(),
            SummaryKind::Rank => self.rank_table(),
            SummaryKind::Crew => self.crew_table(),
            SummaryKind::Total => self.totals_table(),
        }
    }
}

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let session = Session::load(&args.roster)?;
    let outcome = session.reconcile()?;
    let filter = session.record_filter(&args.filter);
    let selected = filter.apply(&outcome.records);
    let report = Report::build(&selected);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let kinds = if args.by.is_empty() {
            SummaryKind::ALL.to_vec()
        } else {
            args.by.iter().copied().unique().collect()
        };
        println!(
            "{}: {} record(s), {} crew",
            filter.rank.label(),
            report.totals.records,
            report.totals.crew
        );
        for kind in kinds {
            println!();
            println!("{}", kind.title());
            print!("{}", report.table(kind).render());
        }
    }
    info!(
        "Summarised {} of {} record(s): {} maintain, {} change",
        report.totals.records,
        outcome.records.len(),
        report.totals.maintain,
        report.totals.change
    );
    Ok(())
}
