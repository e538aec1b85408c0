use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_COCKPIT_RANKS: &[&str] = &["CPT", "FO"];

/// Coarse crew grouping used by every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankCategory {
    Cockpit,
    Cabin,
}

impl RankCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankCategory::Cockpit => "Cockpit",
            RankCategory::Cabin => "Cabin",
        }
    }
}

impl fmt::Display for RankCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps raw rank codes onto [`RankCategory`].
///
/// Codes are compared after trimming and uppercasing. Anything that is not a
/// known cockpit code, including an empty cell, lands in the cabin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankClassifier {
    cockpit: Vec<String>,
}

impl Default for RankClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_COCKPIT_RANKS.iter().copied())
    }
}

impl RankClassifier {
    pub fn new<I, S>(cockpit_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cockpit = cockpit_codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .collect();
        Self { cockpit }
    }

    pub fn classify(&self, rank_code: &str) -> RankCategory {
        let code = rank_code.trim().to_uppercase();
        if self.cockpit.iter().any(|c| *c == code) {
            RankCategory::Cockpit
        } else {
            RankCategory::Cabin
        }
    }

    pub fn cockpit_codes(&self) -> &[String] {
        &self.cockpit
    }
}

/// Classifies with the default cockpit set (`CPT`, `FO`).
pub fn classify(rank_code: &str) -> RankCategory {
    if DEFAULT_COCKPIT_RANKS
        .iter()
        .any(|code| rank_code.trim().eq_ignore_ascii_case(code))
    {
        RankCategory::Cockpit
    } else {
        RankCategory::Cabin
    }
}
