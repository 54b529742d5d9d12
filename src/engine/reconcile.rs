//! Delta summary between two refresh snapshots.
//!
//! Refresh replaces the forest wholesale; the only thing reconciled is
//! navigation state (by issue id) and this before/after summary for the
//! status toast. No node-level patching happens anywhere.

use crate::data::{IssueRecord, Status};
use std::collections::{BTreeMap, HashMap};

/// Counts describing what changed between two fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshDelta {
    pub added: usize,
    pub changed: usize,
    pub removed: usize,
    /// Issue totals by status after the refresh, stable display order.
    pub status_counts: BTreeMap<String, usize>,
}

impl RefreshDelta {
    pub fn compute(
        old: &HashMap<String, IssueRecord>,
        new: &HashMap<String, IssueRecord>,
    ) -> Self {
        let mut delta = RefreshDelta::default();
        for (id, record) in new {
            match old.get(id) {
                None => delta.added += 1,
                Some(prev) => {
                    if prev.updated_at != record.updated_at
                        || prev.status != record.status
                        || prev.title != record.title
                    {
                        delta.changed += 1;
                    }
                }
            }
            let key: String = record.status.clone().into();
            *delta.status_counts.entry(key).or_insert(0) += 1;
        }
        delta.removed = old.keys().filter(|id| !new.contains_key(*id)).count();
        delta
    }

    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.changed == 0 && self.removed == 0
    }

    pub fn net_change(&self) -> i64 {
        self.added as i64 - self.removed as i64
    }

    pub fn open_count(&self) -> usize {
        self.status_counts
            .iter()
            .filter(|(status, _)| {
                !Status::from(status.to_string()).is_terminal()
            })
            .map(|(_, n)| n)
            .sum()
    }

    /// One-line summary for the toast, e.g. "+2 ~1 -0 (14 open)".
    pub fn summary(&self) -> String {
        if self.is_noop() {
            format!("no changes ({} open)", self.open_count())
        } else {
            format!(
                "+{} ~{} -{} ({} open)",
                self.added,
                self.changed,
                self.removed,
                self.open_count()
            )
        }
    }
}
