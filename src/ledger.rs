//! Deduplication ledger.
//!
//! The ledger is the sole counting gate: a vehicle is credited to its
//! category exactly once, on first observation, no matter how many frames
//! re-detect it. The seen set and the totals only ever grow for the lifetime
//! of one session.

use std::collections::HashSet;

use crate::category::{Category, CATEGORIES};
use crate::identity::EntityId;

/// Cumulative unique-vehicle count per category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    counts: [u64; CATEGORIES.len()],
}

impl CategoryTotals {
    pub fn get(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        CATEGORIES
            .iter()
            .map(move |category| (*category, self.counts[category.index()]))
    }

    fn credit(&mut self, category: Category) {
        self.counts[category.index()] += 1;
    }
}

/// Seen set plus category totals for one processing session.
#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashSet<EntityId>,
    totals: CategoryTotals,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation of `id`.
    ///
    /// Returns true iff this is the first time the id has been observed, in
    /// which case the category is credited. The category recorded at first
    /// observation is final; a re-observation under a different label changes
    /// nothing.
    pub fn observe(&mut self, id: EntityId, category: Category) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.totals.credit(category);
        true
    }

    /// Number of distinct entities ever observed.
    pub fn unique_count(&self) -> usize {
        self.seen.len()
    }

    pub fn totals(&self) -> &CategoryTotals {
        &self.totals
    }

    /// Take the final totals out of the ledger at end of stream.
    pub fn into_totals(self) -> CategoryTotals {
        self.totals
    }
}
