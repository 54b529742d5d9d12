//! Tests for prioritized tree ordering.
//!
//! Roots and every sibling group are ordered by actionable-work rank
//! (active subtree, then ready subtree, then the rest), with creation time
//! and id as tiebreakers. The order must be deterministic so unrelated
//! refreshes never shuffle the tree.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use treetop::data::{IssueRecord, Priority, RelationType, Relationship};
use treetop::engine::{sort_forest, visible_rows, Forest, TreeState};

fn make_record(id: &str, status: &str, minute: u32, parent: Option<&str>) -> IssueRecord {
    IssueRecord {
        id: id.to_string(),
        title: format!("Issue {id}"),
        description: None,
        status: status.to_string().into(),
        priority: Priority(2),
        labels: Vec::new(),
        relationships: parent
            .map(|p| vec![Relationship::new(p, RelationType::ParentChild)])
            .unwrap_or_default(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
    }
}

fn sorted_forest(records: Vec<IssueRecord>) -> Forest {
    let mut forest = Forest::build(records);
    sort_forest(&mut forest);
    forest
}

fn root_ids(forest: &Forest) -> Vec<&str> {
    forest.roots().iter().map(|&r| forest.node(r).id()).collect()
}

#[test]
fn test_roots_ordered_active_ready_rest() {
    let forest = sorted_forest(vec![
        make_record("done", "closed", 0, None),
        make_record("parked", "deferred", 1, None),
        make_record("todo", "open", 2, None),
        make_record("doing", "in_progress", 3, None),
    ]);
    assert_eq!(root_ids(&forest), ["doing", "todo", "done", "parked"]);
}

#[test]
fn test_subtree_activity_outranks_own_status() {
    // A closed epic with an in-progress task inside outranks an open leaf.
    let forest = sorted_forest(vec![
        make_record("leaf", "open", 0, None),
        make_record("epic", "closed", 1, None),
        make_record("task", "in_progress", 2, Some("epic")),
    ]);
    assert_eq!(root_ids(&forest), ["epic", "leaf"]);
}

#[test]
fn test_blocked_subtree_falls_behind_ready_work() {
    let mut blocked = make_record("stuck", "open", 0, None);
    blocked
        .relationships
        .push(Relationship::new("wall", RelationType::Blocks));
    let forest = sorted_forest(vec![
        blocked,
        make_record("wall", "open", 1, None),
        make_record("closed", "closed", 2, None),
    ]);
    // stuck is open but blocked, so it ranks with "the rest", after the
    // ready wall; the tiebreak against closed is creation time.
    assert_eq!(root_ids(&forest), ["wall", "stuck", "closed"]);
}

#[test]
fn test_deep_nesting_sorts_every_level() {
    let forest = sorted_forest(vec![
        make_record("epic", "open", 0, None),
        make_record("f1", "open", 1, Some("epic")),
        make_record("f2", "open", 2, Some("epic")),
        make_record("f1-done", "closed", 3, Some("f1")),
        make_record("f2-doing", "in_progress", 4, Some("f2")),
    ]);
    let epic = forest.node(forest.roots()[0]);
    let features: Vec<&str> = epic
        .children
        .iter()
        .map(|&c| forest.node(c).id())
        .collect();
    // f2 carries the active work, so it jumps ahead of the older f1.
    assert_eq!(features, ["f2", "f1"]);
}

#[test]
fn test_order_is_stable_across_rebuilds() {
    let records = vec![
        make_record("a", "open", 5, None),
        make_record("b", "open", 5, None),
        make_record("c", "in_progress", 5, None),
    ];
    let first = root_ids(&sorted_forest(records.clone())).join(",");
    // Same data, shuffled input order.
    let mut shuffled = records;
    shuffled.reverse();
    let second = root_ids(&sorted_forest(shuffled)).join(",");
    assert_eq!(first, second);
    assert_eq!(first, "c,a,b"); // equal timestamps fall back to id
}

#[test]
fn test_visible_rows_follow_sorted_order() {
    let forest = sorted_forest(vec![
        make_record("quiet", "open", 0, None),
        make_record("epic", "deferred", 1, None),
        make_record("work", "in_progress", 2, Some("epic")),
    ]);
    let mut state = TreeState::default();
    state.seed_expansion(&forest);
    let rows = visible_rows(&forest, &state);
    let ids: Vec<&str> = rows.iter().map(|r| forest.node(r.node).id()).collect();
    // Active epic first (auto-expanded by seeding), then the ready root.
    assert_eq!(ids, ["epic", "work", "quiet"]);
}
