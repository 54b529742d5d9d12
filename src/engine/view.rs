//! Tree state and the visible row list.
//!
//! `TreeState` is the only state that survives a rebuild: cursor (restored
//! by issue id, not index), the expansion set (keyed by issue id so every
//! instance of a multi-parent issue toggles together), and the filter
//! string. The visible row list is derived and recomputed after any change;
//! it is never persisted.

use super::forest::{Forest, NodeId};
use crate::data::IssueRecord;
use std::collections::HashSet;

/// Navigation state carried across rebuilds.
#[derive(Debug, Default, Clone)]
pub struct TreeState {
    /// Index into the current visible row list.
    pub cursor: usize,
    /// Issue id under the cursor; authoritative across rebuilds.
    pub cursor_id: Option<String>,
    /// Expanded issue ids. Shared by all instances of an issue.
    pub expanded: HashSet<String>,
    /// Active filter string; empty means no filter.
    pub filter: String,
    /// Whether default expansion has been seeded (initial load only).
    seeded: bool,
}

impl TreeState {
    /// Seed default expansion from active subtrees, once. Later refreshes
    /// never overwrite user toggles.
    pub fn seed_expansion(&mut self, forest: &Forest) {
        if self.seeded {
            return;
        }
        self.expanded = forest.default_expanded_ids();
        self.seeded = true;
    }

    /// Toggle expansion for an issue id, affecting every instance.
    pub fn toggle_expanded(&mut self, issue_id: &str) {
        if !self.expanded.remove(issue_id) {
            self.expanded.insert(issue_id.to_string());
        }
    }

    pub fn is_expanded(&self, issue_id: &str) -> bool {
        self.expanded.contains(issue_id)
    }

    pub fn filter_active(&self) -> bool {
        !self.filter.is_empty()
    }

    /// Move the cursor by `delta` within `rows`, updating the remembered id.
    pub fn move_cursor(&mut self, delta: i32, rows: &[VisibleRow], forest: &Forest) {
        if rows.is_empty() {
            self.cursor = 0;
            return;
        }
        let max = rows.len() - 1;
        self.cursor = if delta >= 0 {
            self.cursor.saturating_add(delta as usize).min(max)
        } else {
            self.cursor.saturating_sub(delta.unsigned_abs() as usize)
        };
        self.remember_cursor(rows, forest);
    }

    pub fn cursor_to(&mut self, index: usize, rows: &[VisibleRow], forest: &Forest) {
        if rows.is_empty() {
            self.cursor = 0;
            return;
        }
        self.cursor = index.min(rows.len() - 1);
        self.remember_cursor(rows, forest);
    }

    fn remember_cursor(&mut self, rows: &[VisibleRow], forest: &Forest) {
        self.cursor_id = rows
            .get(self.cursor)
            .map(|row| forest.node(row.node).record.id.clone());
    }

    /// After a rebuild, put the cursor back on the same issue if it is still
    /// visible; otherwise clamp to the nearest valid index. Never panics on
    /// an empty list.
    pub fn restore_cursor(&mut self, rows: &[VisibleRow], forest: &Forest) {
        if rows.is_empty() {
            self.cursor = 0;
            return;
        }
        if let Some(id) = &self.cursor_id {
            if let Some(pos) = rows
                .iter()
                .position(|row| forest.node(row.node).record.id == *id)
            {
                self.cursor = pos;
                return;
            }
        }
        self.cursor = self.cursor.min(rows.len() - 1);
        self.remember_cursor(rows, forest);
    }
}

/// One line of the tree as the presentation layer should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub node: NodeId,
    pub depth: usize,
    pub has_children: bool,
    /// Whether this row's children follow it in the list.
    pub expanded: bool,
    /// Child count shown as a marker when collapsed with hidden content.
    pub hidden_children: usize,
}

/// Title filter predicate: empty query matches everything, otherwise a
/// case-insensitive substring match on the title.
pub fn matches(record: &IssueRecord, query: &str) -> bool {
    query.is_empty() || record.title.to_lowercase().contains(&query.to_lowercase())
}

/// Per-instance match and subtree-match flags for an arbitrary predicate.
/// Subtree flags are OR'd bottom-up with an explicit stack.
pub fn match_flags<F>(forest: &Forest, predicate: F) -> MatchFlags
where
    F: Fn(&IssueRecord) -> bool,
{
    let mut own = vec![false; forest.len()];
    let mut subtree = vec![false; forest.len()];
    let mut stack: Vec<(NodeId, bool)> = forest.roots().iter().map(|&r| (r, false)).collect();
    while let Some((node_id, children_done)) = stack.pop() {
        if !children_done {
            stack.push((node_id, true));
            for &child in &forest.node(node_id).children {
                stack.push((child, false));
            }
            continue;
        }
        own[node_id] = predicate(&forest.node(node_id).record);
        subtree[node_id] = own[node_id]
            || forest
                .node(node_id)
                .children
                .iter()
                .any(|&child| subtree[child]);
    }
    MatchFlags { own, subtree }
}

pub struct MatchFlags {
    pub own: Vec<bool>,
    pub subtree: Vec<bool>,
}

/// Flatten the forest into the rows to draw, honoring expansion state and
/// the active filter. With a filter, ancestors of matches are always shown
/// and collapse state is overridden wherever a match would be hidden.
pub fn visible_rows(forest: &Forest, state: &TreeState) -> Vec<VisibleRow> {
    let filter = state.filter.clone();
    let flags = match_flags(forest, |record| matches(record, &filter));
    visible_rows_with(forest, state, &flags)
}

/// Same walk, caller-supplied match flags (used by the fuzzy search-all
/// mode, which matches on more than the title).
pub fn visible_rows_with(
    forest: &Forest,
    state: &TreeState,
    flags: &MatchFlags,
) -> Vec<VisibleRow> {
    let filtering = state.filter_active();
    let mut rows = Vec::new();
    // Explicit pre-order stack; children pushed in reverse to keep order.
    let mut stack: Vec<(NodeId, usize)> = forest
        .roots()
        .iter()
        .rev()
        .map(|&r| (r, 0usize))
        .collect();
    while let Some((node_id, depth)) = stack.pop() {
        let node = forest.node(node_id);
        if filtering && !flags.subtree[node_id] {
            continue;
        }
        let has_children = !node.children.is_empty();
        let descend = if filtering {
            // A hidden match must never stay hidden.
            node.children.iter().any(|&c| flags.subtree[c])
        } else {
            has_children && state.is_expanded(&node.record.id)
        };
        let hidden_children = if descend { 0 } else { node.children.len() };
        rows.push(VisibleRow {
            node: node_id,
            depth,
            has_children,
            expanded: descend,
            hidden_children,
        });
        if descend {
            for &child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
    rows
}
