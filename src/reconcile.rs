//! Planned vs actual roster reconciliation.
//!
//! The reconciler walks the planned roster in order, pairs every crew member
//! with the same crew id in the actual roster and classifies each date cell
//! through [`CellRules`]. Crew that only appear in the actual roster are
//! appended afterwards against an empty plan. Crew that disappeared from the
//! actual roster produce no records at all.
//!
//! Output order is fully determined by the two input tables, so running the
//! same reconciliation twice yields identical record lists.

use std::{collections::HashMap, fmt};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cell::{CellValue, EMPTY_CELL},
    error::{ReconcileError, TableSide},
    policy::{Category, CellRules},
    rank::{RankCategory, RankClassifier},
    roster::RosterTable,
};

/// Header names of the identifier columns the reconciler reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub crew_id: String,
    pub crew_name: String,
    pub rank: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            crew_id: "Crew ID".to_string(),
            crew_name: "Crew Name".to_string(),
            rank: "Rank".to_string(),
        }
    }
}

/// One crew member on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    pub crew_id: String,
    pub crew_name: String,
    pub rank: RankCategory,
    pub date: String,
    pub planned: String,
    pub actual: String,
    pub category: Category,
}

impl ClassificationRecord {
    pub const HEADERS: [&'static str; 7] = [
        "Crew ID",
        "Crew Name",
        "Rank",
        "Date",
        "Planned",
        "Actual",
        "Category",
    ];

    pub fn is_maintain(&self) -> bool {
        self.category == Category::Maintain
    }

    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.crew_id.clone(),
            self.crew_name.clone(),
            self.rank.to_string(),
            self.date.clone(),
            self.planned.clone(),
            self.actual.clone(),
            self.category.to_string(),
        ]
    }
}

/// A non-empty cell that is neither standby, off nor a flight list.
///
/// It is still classified, by exact text only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCoercionWarning {
    pub table: TableSide,
    pub crew_id: String,
    pub date: String,
    pub value: String,
}

impl fmt::Display for ValueCoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} roster, crew '{}', date '{}': '{}' compared as plain text",
            self.table, self.crew_id, self.date, self.value
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: Vec<ClassificationRecord>,
    pub warnings: Vec<ValueCoercionWarning>,
    /// Crew ids present in both rosters.
    pub matched_crew: usize,
    /// Crew ids only in the actual roster.
    pub new_crew: usize,
    /// Crew ids only in the planned roster; these emit no records.
    pub departed_crew: usize,
}

impl Reconciliation {
    pub fn into_records(self) -> Vec<ClassificationRecord> {
        self.records
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScheduleReconciler {
    columns: ColumnNames,
    ranks: RankClassifier,
    rules: CellRules,
}

impl ScheduleReconciler {
    pub fn new(columns: ColumnNames, ranks: RankClassifier, rules: CellRules) -> Self {
        Self {
            columns,
            ranks,
            rules,
        }
    }

    pub fn columns(&self) -> &ColumnNames {
        &self.columns
    }

    pub fn ranks(&self) -> &RankClassifier {
        &self.ranks
    }

    pub fn rules(&self) -> &CellRules {
        &self.rules
    }

    /// Classifies every reconciled crew member on every date.
    pub fn reconcile(
        &self,
        planned: &RosterTable,
        actual: &RosterTable,
        date_columns: &[String],
    ) -> Result<Vec<ClassificationRecord>, ReconcileError> {
        self.run(planned, actual, date_columns)
            .map(Reconciliation::into_records)
    }

    /// Same as [`ScheduleReconciler::reconcile`], keeping warnings and crew
    /// counters alongside the records.
    pub fn run(
        &self,
        planned: &RosterTable,
        actual: &RosterTable,
        date_columns: &[String],
    ) -> Result<Reconciliation, ReconcileError> {
        let planned_roles = RoleColumns::resolve(planned, TableSide::Planned, &self.columns)?;
        let actual_roles = RoleColumns::resolve(actual, TableSide::Actual, &self.columns)?;
        if date_columns.is_empty() {
            return Err(ReconcileError::NoDateColumns);
        }
        let planned_dates = date_indices(planned, TableSide::Planned, date_columns)?;
        let actual_dates = date_indices(actual, TableSide::Actual, date_columns)?;
        let planned_crew = CrewIndex::build(planned, TableSide::Planned, planned_roles.crew_id)?;
        let actual_crew = CrewIndex::build(actual, TableSide::Actual, actual_roles.crew_id)?;

        let mut out = Reconciliation::default();
        out.records
            .reserve((planned_crew.order.len() + actual_crew.order.len()) * date_columns.len());

        for (planned_row, crew_id) in &planned_crew.order {
            let Some(&actual_row) = actual_crew.lookup.get(crew_id) else {
                debug!("Crew '{crew_id}' is missing from the actual roster; no records emitted");
                out.departed_crew += 1;
                continue;
            };
            out.matched_crew += 1;
            let crew = CrewContext {
                crew_id,
                crew_name: planned_roles.name(planned, *planned_row),
                rank: self.ranks.classify(planned_roles.rank(planned, *planned_row)),
            };
            for (position, date) in date_columns.iter().enumerate() {
                let planned_value = self.read_cell(planned, *planned_row, planned_dates[position]);
                let actual_value = self.read_cell(actual, actual_row, actual_dates[position]);
                self.note_opaque(
                    &mut out.warnings,
                    TableSide::Planned,
                    &crew,
                    date,
                    &planned_value,
                );
                self.note_opaque(
                    &mut out.warnings,
                    TableSide::Actual,
                    &crew,
                    date,
                    &actual_value,
                );
                out.records
                    .push(self.classify(&crew, date, planned_value, actual_value));
            }
        }

        for (actual_row, crew_id) in &actual_crew.order {
            if planned_crew.lookup.contains_key(crew_id) {
                continue;
            }
            debug!("Crew '{crew_id}' only appears in the actual roster");
            out.new_crew += 1;
            let crew = CrewContext {
                crew_id,
                crew_name: actual_roles.name(actual, *actual_row),
                rank: self.ranks.classify(actual_roles.rank(actual, *actual_row)),
            };
            for (position, date) in date_columns.iter().enumerate() {
                let actual_value = self.read_cell(actual, *actual_row, actual_dates[position]);
                self.note_opaque(
                    &mut out.warnings,
                    TableSide::Actual,
                    &crew,
                    date,
                    &actual_value,
                );
                out.records
                    .push(self.classify(&crew, date, EMPTY_CELL.to_string(), actual_value));
            }
        }

        Ok(out)
    }

    fn read_cell(&self, table: &RosterTable, row: usize, column: usize) -> String {
        self.rules.normalize(table.cell(row, column))
    }

    fn classify(
        &self,
        crew: &CrewContext<'_>,
        date: &str,
        planned: String,
        actual: String,
    ) -> ClassificationRecord {
        let category = self.rules.categorize(&planned, &actual);
        ClassificationRecord {
            crew_id: crew.crew_id.to_string(),
            crew_name: crew.crew_name.to_string(),
            rank: crew.rank,
            date: date.to_string(),
            planned,
            actual,
            category,
        }
    }

    fn note_opaque(
        &self,
        warnings: &mut Vec<ValueCoercionWarning>,
        table: TableSide,
        crew: &CrewContext<'_>,
        date: &str,
        value: &str,
    ) {
        if CellValue::interpret(value, &self.rules).is_opaque() {
            debug!(
                "{table} roster: '{value}' for crew '{}' on '{date}' is not a known cell shape",
                crew.crew_id
            );
            warnings.push(ValueCoercionWarning {
                table,
                crew_id: crew.crew_id.to_string(),
                date: date.to_string(),
                value: value.to_string(),
            });
        }
    }
}

/// Reconciles with the default column names, rank set and tolerant rules.
pub fn reconcile(
    planned: &RosterTable,
    actual: &RosterTable,
    date_columns: &[String],
) -> Result<Vec<ClassificationRecord>, ReconcileError> {
    ScheduleReconciler::default().reconcile(planned, actual, date_columns)
}

struct CrewContext<'a> {
    crew_id: &'a str,
    crew_name: &'a str,
    rank: RankCategory,
}

struct RoleColumns {
    crew_id: usize,
    crew_name: Option<usize>,
    rank: usize,
}

impl RoleColumns {
    fn resolve(
        table: &RosterTable,
        side: TableSide,
        names: &ColumnNames,
    ) -> Result<Self, ReconcileError> {
        Ok(Self {
            crew_id: table.require_column(side, &names.crew_id)?,
            rank: table.require_column(side, &names.rank)?,
            crew_name: table.column_index(&names.crew_name),
        })
    }

    fn name<'t>(&self, table: &'t RosterTable, row: usize) -> &'t str {
        self.crew_name
            .map(|column| table.cell(row, column).trim())
            .unwrap_or("")
    }

    fn rank<'t>(&self, table: &'t RosterTable, row: usize) -> &'t str {
        table.cell(row, self.rank)
    }
}

fn date_indices(
    table: &RosterTable,
    side: TableSide,
    date_columns: &[String],
) -> Result<Vec<usize>, ReconcileError> {
    date_columns
        .iter()
        .map(|date| {
            table
                .column_index(date)
                .ok_or_else(|| ReconcileError::MissingDateColumn {
                    table: side,
                    column: date.clone(),
                })
        })
        .collect()
}

/// Crew ids of one table in row order plus an id → row lookup.
struct CrewIndex {
    order: Vec<(usize, String)>,
    lookup: HashMap<String, usize>,
}

impl CrewIndex {
    fn build(table: &RosterTable, side: TableSide, column: usize) -> Result<Self, ReconcileError> {
        let mut order = Vec::with_capacity(table.len());
        let mut lookup = HashMap::with_capacity(table.len());
        for row in 0..table.len() {
            let crew_id = table.cell(row, column).trim();
            if crew_id.is_empty() {
                debug!("{side} roster row {} has no crew id; skipped", row + 1);
                continue;
            }
            if let Some(&first) = lookup.get(crew_id) {
                return Err(ReconcileError::DuplicateCrewId {
                    table: side,
                    crew_id: crew_id.to_string(),
                    first: first + 1,
                    second: row + 1,
                });
            }
            lookup.insert(crew_id.to_string(), row);
            order.push((row, crew_id.to_string()));
        }
        Ok(Self { order, lookup })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::MatchMode;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RosterTable {
        RosterTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn dates(names: &[&str]) -> Vec<String> {
        names.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn classifies_matched_and_new_crew() {
        let planned = table(
            &["Crew ID", "Crew Name", "Rank", "1"],
            &[&["C1", "Ann", "CPT", "JT100"], &["C2", "Bea", "FA", "SA1"]],
        );
        let actual = table(
            &["Crew ID", "Crew Name", "Rank", "1"],
            &[
                &["C1", "Ann", "CPT", "JT100A"],
                &["C2", "Bea", "FA", "OFF"],
                &["C3", "Cid", "FA", "JT500"],
            ],
        );
        let outcome = ScheduleReconciler::default()
            .run(&planned, &actual, &dates(&["1"]))
            .expect("reconcile");

        let summary: Vec<_> = outcome
            .records
            .iter()
            .map(|r| (r.crew_id.as_str(), r.rank, r.category))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("C1", RankCategory::Cockpit, Category::Maintain),
                ("C2", RankCategory::Cabin, Category::Maintain),
                ("C3", RankCategory::Cabin, Category::Change),
            ]
        );
        assert_eq!(outcome.records[2].planned, "-");
        assert_eq!(outcome.records[2].actual, "JT500");
        assert_eq!(outcome.matched_crew, 2);
        assert_eq!(outcome.new_crew, 1);
        assert_eq!(outcome.departed_crew, 0);
    }

    #[test]
    fn departed_crew_emit_nothing() {
        let planned = table(
            &["Crew ID", "Rank", "1", "2"],
            &[&["C1", "CPT", "JT1", "JT2"], &["C9", "FO", "JT3", "JT4"]],
        );
        let actual = table(&["Crew ID", "Rank", "1", "2"], &[&["C1", "CPT", "JT1", "OFF"]]);
        let outcome = ScheduleReconciler::default()
            .run(&planned, &actual, &dates(&["1", "2"]))
            .expect("reconcile");
        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.records.iter().all(|r| r.crew_id == "C1"));
        assert_eq!(outcome.departed_crew, 1);
        assert_eq!(outcome.records[0].crew_name, "");
    }

    #[test]
    fn records_follow_planned_then_actual_order() {
        let planned = table(
            &["Crew ID", "Rank", "a", "b"],
            &[&["P2", "FA", "", ""], &["P1", "FA", "", ""]],
        );
        let actual = table(
            &["Rank", "Crew ID", "b", "a"],
            &[
                &["FA", "N2", "", ""],
                &["FA", "P1", "", ""],
                &["FA", "N1", "", ""],
                &["FA", "P2", "", ""],
            ],
        );
        let records =
            reconcile(&planned, &actual, &dates(&["a", "b"])).expect("reconcile");
        let keys: Vec<_> = records
            .iter()
            .map(|r| format!("{}:{}", r.crew_id, r.date))
            .collect();
        assert_eq!(
            keys,
            vec!["P2:a", "P2:b", "P1:a", "P1:b", "N2:a", "N2:b", "N1:a", "N1:b"]
        );
    }

    #[test]
    fn cells_are_matched_by_column_name() {
        let planned = table(&["Crew ID", "Rank", "1", "2"], &[&["C1", "FA", "JT1", "JT2"]]);
        let actual = table(&["Crew ID", "Rank", "2", "1"], &[&["C1", "FA", "JT2", "JT1"]]);
        let records = reconcile(&planned, &actual, &dates(&["1", "2"])).expect("reconcile");
        assert!(records.iter().all(ClassificationRecord::is_maintain));
    }

    #[test]
    fn missing_rank_column_fails_without_output() {
        let planned = table(&["Crew ID", "Rank", "1"], &[&["C1", "FA", "JT1"]]);
        let actual = table(&["Crew ID", "1"], &[&["C1", "JT1"]]);
        assert_eq!(
            reconcile(&planned, &actual, &dates(&["1"])),
            Err(ReconcileError::MissingColumn {
                table: TableSide::Actual,
                column: "Rank".into()
            })
        );
    }

    #[test]
    fn missing_date_column_in_actual_fails() {
        let planned = table(&["Crew ID", "Rank", "1", "2"], &[]);
        let actual = table(&["Crew ID", "Rank", "1"], &[]);
        assert_eq!(
            reconcile(&planned, &actual, &dates(&["1", "2"])),
            Err(ReconcileError::MissingDateColumn {
                table: TableSide::Actual,
                column: "2".into()
            })
        );
    }

    #[test]
    fn duplicate_crew_id_fails() {
        let planned = table(
            &["Crew ID", "Rank", "1"],
            &[&["C1", "FA", ""], &["C2", "FA", ""], &[" C1 ", "FA", ""]],
        );
        let actual = table(&["Crew ID", "Rank", "1"], &[]);
        assert_eq!(
            reconcile(&planned, &actual, &dates(&["1"])),
            Err(ReconcileError::DuplicateCrewId {
                table: TableSide::Planned,
                crew_id: "C1".into(),
                first: 1,
                second: 3
            })
        );
    }

    #[test]
    fn empty_date_list_is_rejected() {
        let planned = table(&["Crew ID", "Rank"], &[]);
        let actual = table(&["Crew ID", "Rank"], &[]);
        assert_eq!(
            reconcile(&planned, &actual, &[]),
            Err(ReconcileError::NoDateColumns)
        );
    }

    #[test]
    fn blank_crew_ids_are_skipped() {
        let planned = table(
            &["Crew ID", "Rank", "1"],
            &[&["", "FA", "TOTAL"], &["C1", "FA", "JT1"]],
        );
        let actual = table(&["Crew ID", "Rank", "1"], &[&["C1", "FA", "JT1"], &["  ", "", "x"]]);
        let records = reconcile(&planned, &actual, &dates(&["1"])).expect("reconcile");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn opaque_values_raise_warnings_but_still_classify() {
        let planned = table(&["Crew ID", "Rank", "1", "2"], &[&["C1", "FA", "AL", "JT1"]]);
        let actual = table(&["Crew ID", "Rank", "1", "2"], &[&["C1", "FA", "al", "nan"]]);
        let outcome = ScheduleReconciler::default()
            .run(&planned, &actual, &dates(&["1", "2"]))
            .expect("reconcile");
        assert_eq!(outcome.records[0].category, Category::Maintain);
        assert_eq!(outcome.records[1].actual, "-");
        assert_eq!(outcome.records[1].category, Category::Change);
        assert_eq!(outcome.warnings.len(), 2);
        assert_eq!(outcome.warnings[0].table, TableSide::Planned);
        assert_eq!(outcome.warnings[1].value, "AL");
    }

    #[test]
    fn custom_columns_and_strict_rules() {
        let planned = table(&["ID", "Position", "d1"], &[&["1", "captain", "JT1A"]]);
        let actual = table(&["ID", "Position", "d1"], &[&["1", "captain", "JT1B"]]);
        let reconciler = ScheduleReconciler::new(
            ColumnNames {
                crew_id: "ID".into(),
                crew_name: "Name".into(),
                rank: "Position".into(),
            },
            RankClassifier::new(["CAPTAIN"]),
            CellRules::default().with_policy(MatchMode::Strict),
        );
        let records = reconciler
            .reconcile(&planned, &actual, &dates(&["d1"]))
            .expect("reconcile");
        assert_eq!(records[0].rank, RankCategory::Cockpit);
        assert_eq!(records[0].category, Category::Change);
    }

    #[test]
    fn record_rows_match_headers() {
        let record = ClassificationRecord {
            crew_id: "C1".into(),
            crew_name: "Ann".into(),
            rank: RankCategory::Cockpit,
            date: "1".into(),
            planned: "JT1".into(),
            actual: "JT1A".into(),
            category: Category::Maintain,
        };
        assert_eq!(record.to_row().len(), ClassificationRecord::HEADERS.len());
        assert_eq!(record.to_row()[2], "Cockpit");
        assert_eq!(record.to_row()[6], "maintain");
    }
}
