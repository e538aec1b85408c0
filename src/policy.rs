//! Maintain/change decision for a single roster cell pair.
//!
//! Rules are applied in order and the first one that fires decides:
//!
//! 1. both cells are normalised (trim, uppercase, missing → `-`);
//! 2. both empty → maintain;
//! 3. exactly one empty → change;
//! 4. planned standby and actual `OFF` → maintain;
//! 5. planned standby and actual's first leg looks like a flight and is not
//!    itself a standby code → maintain;
//! 6. identical text → maintain;
//! 7. different number of `/`-separated legs → change;
//! 8. legs compared in order after flight suffixes are stripped.
//!
//! A standby that ends up empty in the actual roster is a change: rule 3
//! fires before the standby rules ever see it.
//!
//! [`MatchMode::Strict`] keeps only rules 1 and 6, which is how older reports
//! were produced.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    cell::{DEFAULT_MISSING_MARKERS, EMPTY_CELL, normalize_cell},
    flight,
};

pub const DEFAULT_STANDBY_CODES: &[&str] = &["SA1", "SA2"];
pub const DEFAULT_OFF_MARKER: &str = "OFF";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum MatchMode {
    /// Standby, suffix and multi-leg tolerance
    #[default]
    Tolerant,
    /// Plain text equality after normalisation
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Maintain,
    Change,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Maintain => "maintain",
            Category::Change => "change",
        }
    }

    fn from_maintain(maintain: bool) -> Self {
        if maintain {
            Category::Maintain
        } else {
            Category::Change
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of the cell equivalence policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellRules {
    pub policy: MatchMode,
    pub standby_codes: Vec<String>,
    pub off_marker: String,
    pub missing_markers: Vec<String>,
}

impl Default for CellRules {
    fn default() -> Self {
        Self {
            policy: MatchMode::Tolerant,
            standby_codes: DEFAULT_STANDBY_CODES.iter().map(|s| s.to_string()).collect(),
            off_marker: DEFAULT_OFF_MARKER.to_string(),
            missing_markers: DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CellRules {
    pub fn with_policy(mut self, policy: MatchMode) -> Self {
        self.policy = policy;
        self
    }

    pub fn normalize(&self, raw: &str) -> String {
        normalize_cell(raw, &self.missing_markers)
    }

    pub fn is_standby(&self, normalized: &str) -> bool {
        self.standby_codes
            .iter()
            .any(|code| code.trim().eq_ignore_ascii_case(normalized))
    }

    pub fn is_off(&self, normalized: &str) -> bool {
        self.off_marker.trim().eq_ignore_ascii_case(normalized)
    }

    /// Decides whether the planned cell was kept in the actual roster.
    ///
    /// Both arguments are raw cell text.
    pub fn is_maintain(&self, planned: &str, actual: &str) -> bool {
        let planned = self.normalize(planned);
        let actual = self.normalize(actual);
        match self.policy {
            MatchMode::Strict => planned == actual,
            MatchMode::Tolerant => self.tolerant_match(&planned, &actual),
        }
    }

    pub fn categorize(&self, planned: &str, actual: &str) -> Category {
        Category::from_maintain(self.is_maintain(planned, actual))
    }

    fn tolerant_match(&self, planned: &str, actual: &str) -> bool {
        let planned_empty = planned == EMPTY_CELL;
        let actual_empty = actual == EMPTY_CELL;
        if planned_empty && actual_empty {
            return true;
        }
        if planned_empty != actual_empty {
            return false;
        }

        if self.is_standby(planned) {
            if self.is_off(actual) {
                return true;
            }
            // A standby code such as SA2 also has the shape of a flight code.
            let first_leg = actual.split('/').next().unwrap_or_default();
            if !self.is_standby(first_leg.trim()) && flight::starts_like_flight(first_leg) {
                return true;
            }
        }

        if planned == actual {
            return true;
        }

        let planned_legs = flight::legs(planned).collect::<Vec<_>>();
        let actual_legs = flight::legs(actual).collect::<Vec<_>>();
        if planned_legs.len() != actual_legs.len() {
            return false;
        }
        planned_legs
            .iter()
            .zip(&actual_legs)
            .all(|(p, a)| flight::normalize(p) == flight::normalize(a))
    }
}

/// Applies the default tolerant rules.
pub fn is_maintain(planned: &str, actual: &str) -> bool {
    CellRules::default().is_maintain(planned, actual)
}
