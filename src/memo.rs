//! Caller-side memoisation of reconciliations.
//!
//! Reconciliation is pure, so an interactive front end that re-renders the
//! same two rosters with different filters can keep the result around. Keys
//! are SHA-256 digests of both tables, the date list and every reconciler
//! setting, so a changed cell or setting always misses.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use sha2::{Digest, Sha256};

use crate::{
    error::ReconcileError,
    policy::MatchMode,
    reconcile::{Reconciliation, ScheduleReconciler},
    roster::RosterTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn compute(
        reconciler: &ScheduleReconciler,
        planned: &RosterTable,
        actual: &RosterTable,
        date_columns: &[String],
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(planned.content_digest());
        hasher.update(actual.content_digest());
        update_list(&mut hasher, date_columns);

        let columns = reconciler.columns();
        update_list(
            &mut hasher,
            [&columns.crew_id, &columns.crew_name, &columns.rank],
        );
        update_list(&mut hasher, reconciler.ranks().cockpit_codes());

        let rules = reconciler.rules();
        hasher.update([match rules.policy {
            MatchMode::Tolerant => 0u8,
            MatchMode::Strict => 1u8,
        }]);
        update_list(&mut hasher, &rules.standby_codes);
        update_list(&mut hasher, [&rules.off_marker]);
        update_list(&mut hasher, &rules.missing_markers);
        Self(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

fn update_list<I, S>(hasher: &mut Sha256, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut count = 0u64;
    for item in items {
        let item = item.as_ref();
        hasher.update((item.len() as u64).to_le_bytes());
        hasher.update(item.as_bytes());
        count += 1;
    }
    hasher.update(count.to_le_bytes());
}

#[derive(Debug, Default)]
pub struct ReconcileCache {
    entries: HashMap<CacheKey, Arc<Reconciliation>>,
    hits: usize,
    misses: usize,
}

impl ReconcileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored reconciliation for these inputs, computing it on
    /// the first request. Failures are not cached.
    pub fn get_or_run(
        &mut self,
        reconciler: &ScheduleReconciler,
        planned: &RosterTable,
        actual: &RosterTable,
        date_columns: &[String],
    ) -> Result<Arc<Reconciliation>, ReconcileError> {
        let key = CacheKey::compute(reconciler, planned, actual, date_columns);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            debug!("Reconciliation cache hit {}", key.to_hex());
            return Ok(Arc::clone(hit));
        }
        self.misses += 1;
        let outcome = Arc::new(reconciler.run(planned, actual, date_columns)?);
        self.entries.insert(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
