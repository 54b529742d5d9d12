//! Prioritization of roots and sibling groups.
//!
//! Single source of truth for the active/ready/else partition so the tree
//! view and the detail lists never disagree about what comes first.

use super::forest::{Forest, Node, NodeId};
use crate::data::IssueRecord;

/// Primary rank: actionable work first.
/// 0 = subtree contains active (in-progress) work,
/// 1 = subtree contains ready (open, unblocked) work and nothing active,
/// 2 = everything else.
pub fn status_rank(node: &Node) -> u8 {
    if node.has_active_descendant {
        0
    } else if node.has_ready_descendant {
        1
    } else {
        2
    }
}

/// Order roots and every sibling group by `(status_rank, created_at)`,
/// oldest first. Deterministic: equal keys fall back to the issue id, so
/// sorting an unchanged forest twice yields identical order.
pub fn sort_forest(forest: &mut Forest) {
    let key = |forest: &Forest, id: NodeId| {
        let node = forest.node(id);
        (
            status_rank(node),
            node.record.created_at,
            node.record.id.clone(),
        )
    };

    let mut roots = std::mem::take(forest.roots_mut());
    roots.sort_by_key(|&id| key(forest, id));
    *forest.roots_mut() = roots;

    for node_id in 0..forest.len() {
        let mut children = std::mem::take(&mut forest.node_mut(node_id).children);
        children.sort_by_key(|&id| key(forest, id));
        forest.node_mut(node_id).children = children;
    }
}

/// Secondary ordering for detail lists (children, blockers, dependents):
/// status first, then priority, then age. Presentation-only; the tree keeps
/// its own `(status_rank, created_at)` order.
pub fn sort_detail_list<'a>(mut records: Vec<&'a IssueRecord>) -> Vec<&'a IssueRecord> {
    records.sort_by(|a, b| {
        a.status
            .sort_order()
            .cmp(&b.status.sort_order())
            .then_with(|| a.priority.cmp(&b.priority))
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}
