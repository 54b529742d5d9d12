//! Tests for message-driven navigation at the app level.
//!
//! Exercises the update loop the way key dispatch does: cursor movement,
//! expand/collapse, filter entry, and the detail modal, all against an
//! in-memory snapshot (no store process involved).

use chrono::{TimeZone, Utc};
use treetop::config::Config;
use treetop::data::{IssueRecord, Priority, RelationType, Relationship};
use treetop::tui::{App, Message, ModalState};

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

fn app_with(records: Vec<IssueRecord>) -> App {
    let mut app = App::new(Config::default());
    app.apply_snapshot(records);
    app
}

fn cursor_id(app: &App) -> Option<&str> {
    app.selected_issue().map(|r| r.id.as_str())
}

#[tokio::test]
async fn test_move_and_clamp() {
    let mut app = app_with(vec![
        make_record("a", "open", 0, None),
        make_record("b", "open", 1, None),
        make_record("c", "open", 2, None),
    ]);

    assert_eq!(cursor_id(&app), Some("a"));
    app.update(Message::MoveDown).await.unwrap();
    assert_eq!(cursor_id(&app), Some("b"));
    app.update(Message::GotoBottom).await.unwrap();
    assert_eq!(cursor_id(&app), Some("c"));
    app.update(Message::MoveDown).await.unwrap();
    assert_eq!(cursor_id(&app), Some("c")); // clamped
    app.update(Message::GotoTop).await.unwrap();
    assert_eq!(cursor_id(&app), Some("a"));
}

#[tokio::test]
async fn test_toggle_expand_affects_all_instances() {
    let mut shared = make_record("kid", "open", 2, Some("p1"));
    shared
        .relationships
        .push(Relationship::new("p2", RelationType::ParentChild));
    let mut app = app_with(vec![
        make_record("p1", "open", 0, None),
        make_record("p2", "open", 1, None),
        shared,
    ]);

    assert_eq!(app.rows.len(), 2); // both parents collapsed
    app.update(Message::ToggleExpand).await.unwrap();
    // Expanding p1's issue id shows kid under p1 only; p2 stays collapsed
    // until its own id is expanded.
    assert_eq!(app.rows.len(), 3);
    app.update(Message::GotoBottom).await.unwrap();
    assert_eq!(cursor_id(&app), Some("p2"));
    app.update(Message::ToggleExpand).await.unwrap();
    assert_eq!(app.rows.len(), 4);
}

#[tokio::test]
async fn test_expand_descend_collapse_ascend() {
    let mut app = app_with(vec![
        make_record("epic", "open", 0, None),
        make_record("task", "open", 1, Some("epic")),
    ]);

    app.update(Message::Expand).await.unwrap(); // open
    assert_eq!(app.rows.len(), 2);
    app.update(Message::Expand).await.unwrap(); // step onto child
    assert_eq!(cursor_id(&app), Some("task"));
    app.update(Message::Collapse).await.unwrap(); // jump to parent
    assert_eq!(cursor_id(&app), Some("epic"));
    app.update(Message::Collapse).await.unwrap(); // close
    assert_eq!(app.rows.len(), 1);
}

#[tokio::test]
async fn test_collapse_all() {
    let mut app = app_with(vec![
        make_record("epic", "open", 0, None),
        make_record("task", "in_progress", 1, Some("epic")),
    ]);
    // Seeding auto-expanded the active epic.
    assert_eq!(app.rows.len(), 2);
    app.update(Message::CollapseAll).await.unwrap();
    assert_eq!(app.rows.len(), 1);
}

#[tokio::test]
async fn test_filter_entry_and_clear() {
    let mut app = app_with(vec![
        make_record("a", "open", 0, None),
        make_record("b", "open", 1, None),
    ]);

    app.update(Message::EnterFilter { search_all: false })
        .await
        .unwrap();
    assert!(app.filter_entry);
    for c in "issue b".chars() {
        app.update(Message::FilterInput(c)).await.unwrap();
    }
    assert_eq!(app.rows.len(), 1);
    assert_eq!(cursor_id(&app), Some("b"));

    app.update(Message::ConfirmFilter).await.unwrap();
    assert!(!app.filter_entry);
    assert!(app.tree.filter_active());

    app.update(Message::ClearFilter).await.unwrap();
    assert!(!app.tree.filter_active());
    assert_eq!(app.rows.len(), 2);
    // Cursor stays on the issue it was on when the filter cleared.
    assert_eq!(cursor_id(&app), Some("b"));
}

#[tokio::test]
async fn test_detail_modal_navigation_stack() {
    let mut app = app_with(vec![
        make_record("epic", "open", 0, None),
        make_record("f1", "open", 1, Some("epic")),
        make_record("f2", "in_progress", 2, Some("epic")),
    ]);

    app.update(Message::OpenDetail).await.unwrap();
    assert_eq!(app.modal, ModalState::Detail);
    assert_eq!(app.detail_issue().unwrap().id, "epic");
    // Children come in detail order: in-progress first.
    let children: Vec<String> = app.detail_children().iter().map(|r| r.id.clone()).collect();
    assert_eq!(children, ["f2", "f1"]);

    app.update(Message::DetailNextChild).await.unwrap();
    app.update(Message::DetailNavigateToChild).await.unwrap();
    assert_eq!(app.detail_issue().unwrap().id, "f2");

    app.update(Message::DetailNavigateToParent).await.unwrap();
    assert_eq!(app.detail_issue().unwrap().id, "epic");

    // Back unwinds the stack to the cursor issue before closing.
    app.update(Message::DetailBack).await.unwrap();
    assert_eq!(app.detail_issue().unwrap().id, "f2");
    app.update(Message::DetailBack).await.unwrap();
    app.update(Message::DetailBack).await.unwrap();
    assert_eq!(app.modal, ModalState::Detail);
    app.update(Message::DetailBack).await.unwrap();
    assert_eq!(app.modal, ModalState::None);
}

#[tokio::test]
async fn test_help_toggles() {
    let mut app = app_with(vec![make_record("a", "open", 0, None)]);
    app.update(Message::ToggleHelp).await.unwrap();
    assert_eq!(app.modal, ModalState::Help);
    app.update(Message::ToggleHelp).await.unwrap();
    assert_eq!(app.modal, ModalState::None);
}

#[tokio::test]
async fn test_quit_returns_true() {
    let mut app = app_with(vec![]);
    assert!(app.update(Message::Quit).await.unwrap());
    assert!(!app.update(Message::None).await.unwrap());
}
