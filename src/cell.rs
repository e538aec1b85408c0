//! Roster cell normalisation and interpretation.
//!
//! A cell is cleaned once (trim, uppercase, missing markers folded to `-`) and
//! every later comparison works on that cleaned text. [`CellValue`] gives the
//! cleaned text a shape so the reconciler can flag tokens it does not
//! recognise.

use std::fmt;

use crate::{flight, policy::CellRules};

/// Canonical display text of an empty cell.
pub const EMPTY_CELL: &str = "-";

/// Markers that spreadsheet exports write for missing values.
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["NAN"];

/// Cleans a raw cell: trims, uppercases and folds blanks and missing markers
/// into [`EMPTY_CELL`].
pub fn normalize_cell<S: AsRef<str>>(raw: &str, missing_markers: &[S]) -> String {
    let cleaned = raw.trim().to_uppercase();
    let is_missing = cleaned.is_empty()
        || cleaned == EMPTY_CELL
        || missing_markers
            .iter()
            .any(|marker| marker.as_ref().trim().eq_ignore_ascii_case(&cleaned));
    if is_missing {
        EMPTY_CELL.to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Empty,
    Standby(String),
    Off,
    Flights(Vec<String>),
    /// Anything else. Only ever compared by exact text.
    Opaque(String),
}

impl CellValue {
    /// Interprets an already normalised cell.
    pub fn interpret(normalized: &str, rules: &CellRules) -> Self {
        if normalized == EMPTY_CELL {
            return CellValue::Empty;
        }
        if rules.is_standby(normalized) {
            return CellValue::Standby(normalized.to_string());
        }
        if rules.is_off(normalized) {
            return CellValue::Off;
        }
        let legs = flight::legs(normalized).collect::<Vec<_>>();
        if legs.iter().all(|leg| flight::is_flight_code(leg)) {
            CellValue::Flights(legs.into_iter().map(str::to_string).collect())
        } else {
            CellValue::Opaque(normalized.to_string())
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, CellValue::Opaque(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Standby(_) => "standby",
            CellValue::Off => "off",
            CellValue::Flights(_) => "flights",
            CellValue::Opaque(_) => "opaque",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => f.write_str(EMPTY_CELL),
            CellValue::Standby(code) => f.write_str(code),
            CellValue::Off => f.write_str("OFF"),
            CellValue::Flights(legs) => f.write_str(&legs.join("/")),
            CellValue::Opaque(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> String {
        normalize_cell(raw, DEFAULT_MISSING_MARKERS)
    }

    #[test]
    fn blanks_and_markers_become_dash() {
        assert_eq!(clean(""), "-");
        assert_eq!(clean("   "), "-");
        assert_eq!(clean("nan"), "-");
        assert_eq!(clean("NaN"), "-");
        assert_eq!(clean(" - "), "-");
    }

    #[test]
    fn values_are_trimmed_and_uppercased() {
        assert_eq!(clean(" jt100a "), "JT100A");
        assert_eq!(clean("off"), "OFF");
    }

    #[test]
    fn custom_markers() {
        assert_eq!(normalize_cell("N/A", &["n/a", "null"]), "-");
        assert_eq!(normalize_cell("NULL", &["n/a", "null"]), "-");
        assert_eq!(normalize_cell("nan", &[] as &[&str]), "NAN");
    }

    #[test]
    fn interprets_cell_shapes() {
        let rules = CellRules::default();
        assert_eq!(CellValue::interpret("-", &rules), CellValue::Empty);
        assert_eq!(
            CellValue::interpret("SA1", &rules),
            CellValue::Standby("SA1".into())
        );
        assert_eq!(CellValue::interpret("OFF", &rules), CellValue::Off);
        assert_eq!(
            CellValue::interpret("JT100/JT200A", &rules),
            CellValue::Flights(vec!["JT100".into(), "JT200A".into()])
        );
        assert!(CellValue::interpret("AL", &rules).is_opaque());
        assert!(CellValue::interpret("JT100/SIM", &rules).is_opaque());
    }

    #[test]
    fn display_round_trips_the_cleaned_text() {
        let rules = CellRules::default();
        for text in ["-", "SA2", "OFF", "JT1/JT2B", "SIM"] {
            assert_eq!(CellValue::interpret(text, &rules).to_string(), text);
        }
    }
}
