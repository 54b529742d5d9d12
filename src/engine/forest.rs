//! Graph construction: flat issue records in, navigable forest out.
//!
//! The forest is an arena of node instances addressed by index. An issue that
//! is a child of two parents gets two instances, one per parent edge; they
//! share expansion state through the issue id, never through the instance.
//! The builder never fails: bad input (duplicate ids, dangling targets,
//! cycles, self edges) is rejected edge-by-edge and counted in `BuildStats`.

use crate::data::{IssueRecord, RelationType, Status};
use std::collections::{HashMap, HashSet};

/// Index of a node instance within the forest arena.
pub type NodeId = usize;

/// One instance of an issue in the tree. Multi-parent issues have several.
#[derive(Debug, Clone)]
pub struct Node {
    pub record: IssueRecord,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// True iff a `blocks` relationship points at a known, non-terminal issue.
    pub blocked_by_unresolved: bool,
    /// Self-or-descendant has status in_progress. Set by `propagate`.
    pub has_active_descendant: bool,
    /// Self-or-descendant is open and unblocked. Set by `propagate`.
    pub has_ready_descendant: bool,
}

impl Node {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn is_ready(&self) -> bool {
        self.record.status == Status::Open && !self.blocked_by_unresolved
    }
}

/// Diagnostic counts from one build pass. Data-quality problems only; none
/// of these prevent the builder from returning a usable forest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub duplicate_ids: usize,
    pub dangling_targets: usize,
    pub cycle_edges: usize,
    pub self_edges: usize,
}

impl BuildStats {
    pub fn rejected_edges(&self) -> usize {
        self.dangling_targets + self.cycle_edges + self.self_edges
    }
}

/// The full set of trees built in one pipeline pass. Rebuilt wholesale on
/// every refresh; identity across rebuilds is the issue id, not the NodeId.
#[derive(Debug, Default)]
pub struct Forest {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    /// Issue id -> ids of issues it is blocked by (known blockers only).
    blockers: HashMap<String, Vec<String>>,
    /// Issue id -> ids of issues it blocks.
    dependents: HashMap<String, Vec<String>>,
    pub stats: BuildStats,
}

impl Forest {
    /// Build a forest from a flat record list. Always succeeds; see
    /// [`BuildStats`] for what got rejected along the way.
    pub fn build(records: Vec<IssueRecord>) -> Self {
        let mut stats = BuildStats::default();

        // Index by id, last-write-wins on duplicates.
        let mut order: Vec<String> = Vec::with_capacity(records.len());
        let mut index: HashMap<String, IssueRecord> = HashMap::with_capacity(records.len());
        for record in records {
            if index.insert(record.id.clone(), record.clone()).is_some() {
                stats.duplicate_ids += 1;
                tracing::warn!(id = %record.id, "duplicate issue id, keeping last");
            } else {
                order.push(record.id.clone());
            }
        }

        // Collect candidate parent edges from both declaration directions.
        let mut candidates: Vec<(String, String)> = Vec::new();
        for id in &order {
            for rel in &index[id].relationships {
                match rel.rel_type {
                    RelationType::ParentChild => {
                        candidates.push((rel.target.clone(), id.clone()))
                    }
                    RelationType::ParentOf => candidates.push((id.clone(), rel.target.clone())),
                    _ => {}
                }
            }
        }

        // Accept edges one at a time, guarding against self edges, dangling
        // targets, duplicates, and cycle-closing edges.
        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut has_parent: HashSet<String> = HashSet::new();
        let mut accepted: HashSet<(String, String)> = HashSet::new();
        for (parent, child) in candidates {
            if parent == child {
                stats.self_edges += 1;
                tracing::warn!(id = %parent, "self-referential parent edge rejected");
                continue;
            }
            if !index.contains_key(&parent) || !index.contains_key(&child) {
                stats.dangling_targets += 1;
                tracing::debug!(%parent, %child, "parent edge with unresolved endpoint");
                continue;
            }
            if accepted.contains(&(parent.clone(), child.clone())) {
                continue; // both directions declared the same edge
            }
            if reaches(&children_of, &child, &parent) {
                stats.cycle_edges += 1;
                tracing::warn!(%parent, %child, "cycle-closing parent edge rejected");
                continue;
            }
            children_of.entry(parent.clone()).or_default().push(child.clone());
            has_parent.insert(child.clone());
            accepted.insert((parent, child));
        }

        // Blocked flags and blocker/dependent side indexes, by issue id.
        // Unknown relationship types and unresolved targets are non-blocking.
        let mut blocked: HashMap<&str, bool> = HashMap::new();
        let mut blockers: HashMap<String, Vec<String>> = HashMap::new();
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        for id in &order {
            let mut is_blocked = false;
            for rel in &index[id].relationships {
                if rel.rel_type != RelationType::Blocks {
                    continue;
                }
                let Some(target) = index.get(&rel.target) else {
                    continue;
                };
                blockers.entry(id.clone()).or_default().push(rel.target.clone());
                dependents.entry(rel.target.clone()).or_default().push(id.clone());
                if !target.status.is_terminal() {
                    is_blocked = true;
                }
            }
            blocked.insert(id, is_blocked);
        }

        // Default child order before the prioritization pass runs.
        for childs in children_of.values_mut() {
            childs.sort_by(|a, b| {
                index[a]
                    .created_at
                    .cmp(&index[b].created_at)
                    .then_with(|| a.cmp(b))
            });
        }
        let mut root_ids: Vec<&String> = order.iter().filter(|id| !has_parent.contains(*id)).collect();
        root_ids.sort_by(|a, b| {
            index[*a]
                .created_at
                .cmp(&index[*b].created_at)
                .then_with(|| a.cmp(b))
        });

        // Materialize node instances, one per parent edge, with an explicit
        // stack. The accepted edge set is acyclic so this terminates.
        let mut forest = Forest {
            nodes: Vec::new(),
            roots: Vec::new(),
            blockers,
            dependents,
            stats,
        };
        let empty: Vec<String> = Vec::new();
        for root_id in root_ids {
            let root = forest.alloc(&index, &blocked, root_id, None);
            forest.roots.push(root);
            let mut stack: Vec<NodeId> = vec![root];
            while let Some(node_id) = stack.pop() {
                let issue_id = forest.nodes[node_id].record.id.clone();
                let child_ids = children_of.get(&issue_id).unwrap_or(&empty).clone();
                for child_issue in child_ids {
                    let child = forest.alloc(&index, &blocked, &child_issue, Some(node_id));
                    forest.nodes[node_id].children.push(child);
                    stack.push(child);
                }
            }
        }

        forest.propagate();
        forest
    }

    fn alloc(
        &mut self,
        index: &HashMap<String, IssueRecord>,
        blocked: &HashMap<&str, bool>,
        issue_id: &str,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            record: index[issue_id].clone(),
            parent,
            children: Vec::new(),
            blocked_by_unresolved: blocked.get(issue_id).copied().unwrap_or(false),
            has_active_descendant: false,
            has_ready_descendant: false,
        });
        id
    }

    /// Single bottom-up pass seeding aggregate flags from each node's own
    /// status, then OR'ing them up from children.
    fn propagate(&mut self) {
        // Post-order over instances with an explicit two-phase stack.
        let mut stack: Vec<(NodeId, bool)> = self.roots.iter().map(|&r| (r, false)).collect();
        while let Some((node_id, children_done)) = stack.pop() {
            if !children_done {
                stack.push((node_id, true));
                for &child in &self.nodes[node_id].children {
                    stack.push((child, false));
                }
                continue;
            }
            let mut active = self.nodes[node_id].record.is_active();
            let mut ready = self.nodes[node_id].is_ready();
            for &child in &self.nodes[node_id].children.clone() {
                active |= self.nodes[child].has_active_descendant;
                ready |= self.nodes[child].has_ready_descendant;
            }
            self.nodes[node_id].has_active_descendant = active;
            self.nodes[node_id].has_ready_descendant = ready;
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub(crate) fn roots_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.roots
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All instances, arena order. Mostly useful for tests and diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    /// Instances of a given issue id (one per parent edge).
    pub fn instances_of(&self, issue_id: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.record.id == issue_id)
            .map(|(i, _)| i)
            .collect()
    }

    /// Ids of the known issues blocking `issue_id`, store order.
    pub fn blockers_of(&self, issue_id: &str) -> &[String] {
        self.blockers.get(issue_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of the known issues `issue_id` blocks, store order.
    pub fn dependents_of(&self, issue_id: &str) -> &[String] {
        self.dependents.get(issue_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First instance carrying the given issue id, if any.
    pub fn find_instance(&self, issue_id: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.record.id == issue_id)
    }

    /// Issue ids whose subtree contains active work. Used once, at initial
    /// load, to seed the expansion set; user toggles take precedence after.
    pub fn default_expanded_ids(&self) -> HashSet<String> {
        self.nodes
            .iter()
            .filter(|n| !n.children.is_empty() && n.has_active_descendant)
            .map(|n| n.record.id.clone())
            .collect()
    }
}

/// Whether `to` is reachable from `from` via accepted child edges.
/// Explicit stack so input depth can't overflow ours.
fn reaches(children_of: &HashMap<String, Vec<String>>, from: &str, to: &str) -> bool {
    let mut stack: Vec<&str> = vec![from];
    let mut seen: HashSet<&str> = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == to {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(children) = children_of.get(current) {
            stack.extend(children.iter().map(String::as_str));
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Priority, Relationship};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, status: &str, minute: u32, rels: Vec<Relationship>) -> IssueRecord {
        IssueRecord {
            id: id.to_string(),
            title: format!("Issue {id}"),
            description: None,
            status: status.to_string().into(),
            priority: Priority(2),
            labels: vec![],
            relationships: rels,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap(),
        }
    }

    fn parent_rel(target: &str) -> Relationship {
        Relationship::new(target, RelationType::ParentChild)
    }

    #[test]
    fn test_flat_records_become_roots() {
        let forest = Forest::build(vec![
            record("a", "open", 0, vec![]),
            record("b", "open", 1, vec![]),
        ]);
        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.stats, BuildStats::default());
    }

    #[test]
    fn test_child_attaches_under_parent() {
        let forest = Forest::build(vec![
            record("epic", "open", 0, vec![]),
            record("task", "open", 1, vec![parent_rel("epic")]),
        ]);
        assert_eq!(forest.roots().len(), 1);
        let root = forest.node(forest.roots()[0]);
        assert_eq!(root.id(), "epic");
        assert_eq!(root.children.len(), 1);
        assert_eq!(forest.node(root.children[0]).id(), "task");
        assert_eq!(forest.node(root.children[0]).parent, Some(forest.roots()[0]));
    }

    #[test]
    fn test_parent_of_declaration_is_equivalent() {
        let forest = Forest::build(vec![
            record(
                "epic",
                "open",
                0,
                vec![Relationship::new("task", RelationType::ParentOf)],
            ),
            record("task", "open", 1, vec![]),
        ]);
        let root = forest.node(forest.roots()[0]);
        assert_eq!(root.id(), "epic");
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_both_directions_dedupe_to_one_edge() {
        let forest = Forest::build(vec![
            record(
                "epic",
                "open",
                0,
                vec![Relationship::new("task", RelationType::ParentOf)],
            ),
            record("task", "open", 1, vec![parent_rel("epic")]),
        ]);
        let root = forest.node(forest.roots()[0]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(forest.stats.rejected_edges(), 0);
    }

    #[test]
    fn test_two_node_cycle_rejected() {
        let forest = Forest::build(vec![
            record("a", "open", 0, vec![parent_rel("b")]),
            record("b", "open", 1, vec![parent_rel("a")]),
        ]);
        // One edge wins, the closing edge is rejected.
        assert_eq!(forest.stats.cycle_edges, 1);
        assert_eq!(forest.roots().len(), 1);
        // No instance is its own ancestor.
        for (id, node) in forest.iter() {
            let mut ancestor = node.parent;
            while let Some(a) = ancestor {
                assert_ne!(a, id);
                assert_ne!(forest.node(a).record.id, node.record.id);
                ancestor = forest.node(a).parent;
            }
        }
    }

    #[test]
    fn test_three_node_cycle_rejected_edge_count() {
        let forest = Forest::build(vec![
            record("a", "open", 0, vec![parent_rel("c")]),
            record("b", "open", 1, vec![parent_rel("a")]),
            record("c", "open", 2, vec![parent_rel("b")]),
        ]);
        assert_eq!(forest.stats.cycle_edges, 1);
        assert_eq!(forest.roots().len(), 1);
    }

    #[test]
    fn test_self_edge_rejected() {
        let forest = Forest::build(vec![record("a", "open", 0, vec![parent_rel("a")])]);
        assert_eq!(forest.stats.self_edges, 1);
        assert_eq!(forest.roots().len(), 1);
    }

    #[test]
    fn test_dangling_parent_counted_child_becomes_root() {
        let forest = Forest::build(vec![record("a", "open", 0, vec![parent_rel("ghost")])]);
        assert_eq!(forest.stats.dangling_targets, 1);
        assert_eq!(forest.roots().len(), 1);
    }

    #[test]
    fn test_duplicate_ids_last_write_wins() {
        let mut newer = record("a", "closed", 5, vec![]);
        newer.title = "Replacement".to_string();
        let forest = Forest::build(vec![record("a", "open", 0, vec![]), newer]);
        assert_eq!(forest.stats.duplicate_ids, 1);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest.node(forest.roots()[0]).record.title, "Replacement");
    }

    #[test]
    fn test_diamond_parentage_yields_two_instances() {
        let forest = Forest::build(vec![
            record("p1", "open", 0, vec![]),
            record("p2", "open", 1, vec![]),
            record("kid", "open", 2, vec![parent_rel("p1"), parent_rel("p2")]),
        ]);
        assert_eq!(forest.roots().len(), 2);
        assert_eq!(forest.instances_of("kid").len(), 2);
    }

    #[test]
    fn test_blocked_by_open_issue() {
        let forest = Forest::build(vec![
            record(
                "a",
                "open",
                0,
                vec![Relationship::new("b", RelationType::Blocks)],
            ),
            record("b", "open", 1, vec![]),
        ]);
        let a = forest.node(forest.find_instance("a").unwrap());
        assert!(a.blocked_by_unresolved);
        assert!(!a.is_ready());
        assert_eq!(forest.blockers_of("a"), ["b"]);
        assert_eq!(forest.dependents_of("b"), ["a"]);
    }

    #[test]
    fn test_closed_blocker_does_not_block() {
        let forest = Forest::build(vec![
            record(
                "a",
                "open",
                0,
                vec![Relationship::new("b", RelationType::Blocks)],
            ),
            record("b", "closed", 1, vec![]),
        ]);
        assert!(!forest.node(forest.find_instance("a").unwrap()).blocked_by_unresolved);
    }

    #[test]
    fn test_unresolved_blocker_defaults_non_blocking() {
        let forest = Forest::build(vec![record(
            "a",
            "open",
            0,
            vec![Relationship::new("ghost", RelationType::Blocks)],
        )]);
        let a = forest.node(forest.find_instance("a").unwrap());
        assert!(!a.blocked_by_unresolved);
        assert!(a.is_ready());
    }

    #[test]
    fn test_unknown_relation_type_is_decorative() {
        let forest = Forest::build(vec![
            record(
                "a",
                "open",
                0,
                vec![Relationship::new("b", RelationType::Unknown("gates".into()))],
            ),
            record("b", "open", 1, vec![]),
        ]);
        assert!(!forest.node(forest.find_instance("a").unwrap()).blocked_by_unresolved);
    }

    #[test]
    fn test_propagation_flags() {
        let forest = Forest::build(vec![
            record("epic", "deferred", 0, vec![]),
            record("doing", "in_progress", 1, vec![parent_rel("epic")]),
            record("todo", "open", 2, vec![parent_rel("epic")]),
        ]);
        let root = forest.node(forest.roots()[0]);
        assert!(root.has_active_descendant);
        assert!(root.has_ready_descendant);
        let doing = forest.node(forest.find_instance("doing").unwrap());
        assert!(doing.has_active_descendant);
        assert!(!doing.has_ready_descendant);
    }

    #[test]
    fn test_default_expansion_follows_active_subtrees() {
        let forest = Forest::build(vec![
            record("hot", "open", 0, vec![]),
            record("work", "in_progress", 1, vec![parent_rel("hot")]),
            record("cold", "open", 2, vec![]),
            record("later", "open", 3, vec![parent_rel("cold")]),
        ]);
        let seeds = forest.default_expanded_ids();
        assert!(seeds.contains("hot"));
        assert!(!seeds.contains("cold"));
        assert!(!seeds.contains("work")); // leaf, nothing to expand
    }
}
