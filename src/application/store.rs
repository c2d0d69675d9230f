//! Local opportunity store.
//!
//! Owns the client's copy of the authority's opportunity set. Two kinds of
//! writes reach it: incremental ([`OpportunityStore::upsert`],
//! [`OpportunityStore::remove`]) from push deltas, and authoritative
//! ([`OpportunityStore::replace_all`]) from pull refreshes. Keeping them
//! separate means a missed delta can only leave the store stale until the
//! next pull, never permanently.
//!
//! The store stores everything it is given; the view parameters only decide
//! what [`OpportunityStore::view`] returns.

use std::collections::HashMap;

use tracing::trace;

use crate::domain::{OpportunityId, OpportunityRecord, OpportunityView, ViewParams};

/// Counts from one authoritative replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Ids present in the pull but not in the store.
    pub inserted: usize,
    /// Ids present in both; the pulled record wins.
    pub replaced: usize,
    /// Ids in the store that the pull no longer lists.
    pub removed: usize,
}

/// Id-keyed opportunity collection with a cached derived view.
#[derive(Debug, Default)]
pub struct OpportunityStore {
    /// Every known record, keyed by id. At most one record per id.
    records: HashMap<OpportunityId, OpportunityRecord>,
    /// Last computed view, dropped whenever the records change.
    cached: Option<OpportunityView>,
}

impl OpportunityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, or fully replace the record with the same id.
    ///
    /// Returns `true` when the id was not present before.
    pub fn upsert(&mut self, record: OpportunityRecord) -> bool {
        self.cached = None;
        let id = record.id.clone();
        let inserted = self.records.insert(id, record).is_none();
        trace!(inserted, total = self.records.len(), "Upserted opportunity");
        inserted
    }

    /// Delete the record with `id`. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<OpportunityRecord> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            self.cached = None;
        }
        removed
    }

    /// Make the store contain exactly `records`.
    ///
    /// Ids absent from the input are removed. When the input repeats an id,
    /// the last occurrence wins.
    pub fn replace_all<I>(&mut self, records: I) -> ReplaceSummary
    where
        I: IntoIterator<Item = OpportunityRecord>,
    {
        let mut next: HashMap<OpportunityId, OpportunityRecord> = HashMap::new();
        for record in records {
            next.insert(record.id.clone(), record);
        }

        let mut summary = ReplaceSummary::default();
        for id in next.keys() {
            if self.records.contains_key(id) {
                summary.replaced += 1;
            } else {
                summary.inserted += 1;
            }
        }
        summary.removed = self
            .records
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();

        self.records = next;
        self.cached = None;
        summary
    }

    /// Filtered, sorted snapshot for `params`.
    ///
    /// Recomputed only after a mutation or a change of parameters; otherwise
    /// the previous snapshot is shared.
    pub fn view(&mut self, params: ViewParams) -> OpportunityView {
        if let Some(cached) = &self.cached {
            if cached.params() == params {
                return cached.clone();
            }
        }

        let mut records: Vec<OpportunityRecord> = self
            .records
            .values()
            .filter(|record| params.admits(record))
            .cloned()
            .collect();
        let sort_key = params.sort_key();
        records.sort_by(|a, b| sort_key.compare(a, b));

        let view = OpportunityView::new(params, records);
        self.cached = Some(view.clone());
        view
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&OpportunityRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
