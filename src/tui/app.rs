use crate::config::Config;
use crate::data::{IssueRecord, RelationType, Relationship, Status};
use crate::engine::{self, Forest, RefreshDelta, TreeState, VisibleRow};
use crate::store::CliStore;
use crate::tui::search::FuzzySearch;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Braille spinner frames for the loading animation
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Result delivered by the background fetch task. A refresh either hands
/// over a complete snapshot or fails; there is no partial application.
pub enum RefreshResult {
    Complete(Vec<IssueRecord>),
    Error(String),
}

/// Active modal; only one at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModalState {
    #[default]
    None,
    Help,
    Detail,
    StatusMenu,
    Input {
        purpose: super::message::InputPurpose,
        buffer: String,
    },
    ConfirmDelete,
}

impl ModalState {
    pub fn is_none(&self) -> bool {
        matches!(self, ModalState::None)
    }
}

/// Transient, auto-dismissing notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub error: bool,
    expires: Instant,
}

pub struct App {
    pub config: Arc<Config>,
    store: Arc<CliStore>,

    /// Latest snapshot, by issue id. Replaced wholesale on refresh.
    pub records: HashMap<String, IssueRecord>,
    pub forest: Forest,
    pub tree: TreeState,
    pub rows: Vec<VisibleRow>,

    pub modal: ModalState,
    /// Whether the filter line is capturing keystrokes.
    pub filter_entry: bool,
    /// Fuzzy search-all mode instead of title substring.
    pub search_all: bool,

    pub is_loading: bool,
    pub spinner_frame: usize,
    pub last_refresh: Option<DateTime<Utc>>,
    pub last_delta: Option<RefreshDelta>,
    pub toast: Option<Toast>,

    refresh_rx: Option<mpsc::Receiver<RefreshResult>>,
    detail_rx: Option<mpsc::Receiver<RefreshResult>>,
    last_refresh_attempt: Option<Instant>,

    // Detail modal navigation (stack of issue ids)
    pub detail_issue_id: Option<String>,
    pub detail_stack: Vec<String>,
    pub detail_child_idx: Option<usize>,
    pub detail_scroll: usize,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = Arc::new(CliStore::new(&config.store));
        Self {
            config: Arc::new(config),
            store,
            records: HashMap::new(),
            forest: Forest::default(),
            tree: TreeState::default(),
            rows: Vec::new(),
            modal: ModalState::None,
            filter_entry: false,
            search_all: false,
            is_loading: false,
            spinner_frame: 0,
            last_refresh: None,
            last_delta: None,
            toast: None,
            refresh_rx: None,
            detail_rx: None,
            last_refresh_attempt: None,
            detail_issue_id: None,
            detail_stack: Vec::new(),
            detail_child_idx: None,
            detail_scroll: 0,
        }
    }

    /// Process a message and update state (Elm Architecture update function).
    ///
    /// Returns `Ok(true)` if the app should quit, `Ok(false)` to continue.
    pub async fn update(&mut self, msg: super::Message) -> Result<bool> {
        use super::Message;
        match msg {
            Message::Quit => return Ok(true),
            Message::Refresh => self.start_background_refresh(),

            Message::MoveUp => self.move_cursor(-1),
            Message::MoveDown => self.move_cursor(1),
            Message::GotoTop => self.cursor_to(0),
            Message::GotoBottom => self.cursor_to(self.rows.len().saturating_sub(1)),
            Message::PageUp => self.move_cursor(-10),
            Message::PageDown => self.move_cursor(10),

            Message::ToggleExpand => self.toggle_expand(),
            Message::Expand => self.expand_or_descend(),
            Message::Collapse => self.collapse_or_ascend(),
            Message::CollapseAll => {
                self.tree.expanded.clear();
                self.rebuild_rows();
            }

            Message::EnterFilter { search_all } => self.enter_filter(search_all),
            Message::ExitFilter => self.exit_filter(),
            Message::ConfirmFilter => self.filter_entry = false,
            Message::FilterInput(c) => {
                self.tree.filter.push(c);
                self.rebuild_rows();
            }
            Message::FilterBackspace => {
                self.tree.filter.pop();
                self.rebuild_rows();
            }
            Message::ClearFilter => self.exit_filter(),

            Message::ToggleHelp => {
                self.modal = if self.modal == ModalState::Help {
                    ModalState::None
                } else {
                    ModalState::Help
                };
            }
            Message::CloseModal => self.close_modal(),
            Message::OpenDetail => self.open_detail(),
            Message::DetailNextChild => self.detail_move_child(1),
            Message::DetailPrevChild => self.detail_move_child(-1),
            Message::DetailNavigateToChild => self.detail_navigate_to_child(),
            Message::DetailNavigateToParent => self.detail_navigate_to_parent(),
            Message::DetailBack => {
                if !self.detail_back() {
                    self.close_modal();
                }
            }
            Message::ScrollDetail(delta) => {
                self.detail_scroll =
                    (self.detail_scroll as i64 + delta as i64).max(0) as usize;
            }

            Message::OpenStatusMenu => {
                if self.target_issue_id().is_some() {
                    self.modal = ModalState::StatusMenu;
                }
            }
            Message::SetStatus(status) => self.set_status(status).await,
            Message::OpenInput(purpose) => {
                if self.target_issue_id().is_some()
                    || purpose == super::message::InputPurpose::CreateRoot
                {
                    self.modal = ModalState::Input {
                        purpose,
                        buffer: String::new(),
                    };
                }
            }
            Message::InputChar(c) => {
                if let ModalState::Input { buffer, .. } = &mut self.modal {
                    buffer.push(c);
                }
            }
            Message::InputBackspace => {
                if let ModalState::Input { buffer, .. } = &mut self.modal {
                    buffer.pop();
                }
            }
            Message::CancelInput => self.modal = ModalState::None,
            Message::SubmitInput => self.submit_input().await,
            Message::OpenDeleteConfirm => {
                if self.target_issue_id().is_some() {
                    self.modal = ModalState::ConfirmDelete;
                }
            }
            Message::ConfirmDelete => self.delete_selected().await,

            Message::None => {}
        }
        Ok(false)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pipeline: records -> forest -> rows
    // ─────────────────────────────────────────────────────────────────────

    /// Rebuild the forest from the current record snapshot and re-derive
    /// the visible rows. Navigation state carries over by issue id.
    pub fn rebuild(&mut self) {
        let mut forest = Forest::build(self.records.values().cloned().collect());
        engine::sort_forest(&mut forest);
        self.tree.seed_expansion(&forest);
        self.forest = forest;
        self.rebuild_rows();
    }

    /// Recompute the visible row list and restore the cursor.
    pub fn rebuild_rows(&mut self) {
        self.rows = if self.search_all && self.tree.filter_active() {
            let mut fuzzy = FuzzySearch::new();
            let query = self.tree.filter.clone();
            let matched: HashSet<String> = self
                .records
                .values()
                .filter(|r| fuzzy.search_record(r, &query).is_some())
                .map(|r| r.id.clone())
                .collect();
            let flags = engine::view::match_flags(&self.forest, |r| matched.contains(&r.id));
            engine::view::visible_rows_with(&self.forest, &self.tree, &flags)
        } else {
            engine::visible_rows(&self.forest, &self.tree)
        };
        self.tree.restore_cursor(&self.rows, &self.forest);
    }

    /// Apply a freshly fetched snapshot, replacing the forest wholesale
    /// while keeping navigation state.
    pub fn apply_snapshot(&mut self, records: Vec<IssueRecord>) {
        let new: HashMap<String, IssueRecord> =
            records.into_iter().map(|r| (r.id.clone(), r)).collect();
        let delta = RefreshDelta::compute(&self.records, &new);
        self.records = new;
        self.rebuild();
        self.last_refresh = Some(Utc::now());
        if !delta.is_noop() {
            self.toast(delta.summary(), false);
        }
        self.last_delta = Some(delta);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Background refresh
    // ─────────────────────────────────────────────────────────────────────

    /// Kick off a fetch on a background task (non-blocking). The result
    /// comes back through a single-slot channel drained on tick.
    pub fn start_background_refresh(&mut self) {
        if self.refresh_rx.is_some() {
            return; // one in flight already
        }
        self.is_loading = true;
        self.last_refresh_attempt = Some(Instant::now());

        let (tx, rx) = mpsc::channel(1);
        self.refresh_rx = Some(rx);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = match store.list().await {
                Ok(records) => RefreshResult::Complete(records),
                Err(e) => RefreshResult::Error(e.to_string()),
            };
            let _ = tx.send(result).await;
        });
    }

    /// Drain the refresh channel (non-blocking, called from the tick).
    /// A failed fetch leaves the previous forest and navigation state
    /// completely untouched.
    pub fn poll_refresh(&mut self) -> bool {
        let Some(mut rx) = self.refresh_rx.take() else {
            return false;
        };
        match rx.try_recv() {
            Ok(RefreshResult::Complete(records)) => {
                self.is_loading = false;
                self.apply_snapshot(records);
                true
            }
            Ok(RefreshResult::Error(msg)) => {
                self.is_loading = false;
                tracing::warn!("refresh failed: {msg}");
                self.toast(format!("Refresh failed: {msg}"), true);
                true
            }
            Err(_) => {
                self.refresh_rx = Some(rx);
                false
            }
        }
    }

    /// Pull full detail for the issue in the modal and its relationship
    /// targets. Advisory enrichment; the modal renders local data until
    /// the batch lands, and a failure changes nothing.
    fn start_detail_fetch(&mut self) {
        let Some(issue) = self.detail_issue() else {
            return;
        };
        let mut ids = vec![issue.id.clone()];
        ids.extend(issue.relationships.iter().map(|rel| rel.target.clone()));
        ids.retain(|id| self.records.contains_key(id));
        ids.sort_unstable();
        ids.dedup();

        let (tx, rx) = mpsc::channel(1);
        self.detail_rx = Some(rx);
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let result = match store.show(&ids).await {
                Ok(records) => RefreshResult::Complete(records),
                Err(e) => RefreshResult::Error(e.to_string()),
            };
            let _ = tx.send(result).await;
        });
    }

    fn poll_detail(&mut self) {
        let Some(mut rx) = self.detail_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(RefreshResult::Complete(records)) => {
                for record in records {
                    self.records.insert(record.id.clone(), record);
                }
                self.rebuild();
            }
            Ok(RefreshResult::Error(msg)) => {
                tracing::debug!("detail fetch failed: {msg}");
            }
            Err(_) => self.detail_rx = Some(rx),
        }
    }

    /// Start a refresh when the configured interval has elapsed.
    fn maybe_auto_refresh(&mut self) {
        let interval = self.config.polling.refresh_interval_secs;
        if interval == 0 || self.is_loading {
            return;
        }
        let due = match self.last_refresh_attempt {
            Some(at) => at.elapsed() >= Duration::from_secs(interval),
            None => true,
        };
        if due {
            self.start_background_refresh();
        }
    }

    pub fn on_tick(&mut self) {
        if self.is_loading {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
        if let Some(toast) = &self.toast {
            if Instant::now() >= toast.expires {
                self.toast = None;
            }
        }
        self.poll_refresh();
        self.poll_detail();
        self.maybe_auto_refresh();
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    fn toast(&mut self, text: String, error: bool) {
        self.toast = Some(Toast {
            text,
            error,
            expires: Instant::now() + Duration::from_secs(self.config.ui.toast_secs),
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Cursor and tree shape
    // ─────────────────────────────────────────────────────────────────────

    fn move_cursor(&mut self, delta: i32) {
        self.tree.move_cursor(delta, &self.rows, &self.forest);
    }

    fn cursor_to(&mut self, index: usize) {
        self.tree.cursor_to(index, &self.rows, &self.forest);
    }

    pub fn selected_row(&self) -> Option<&VisibleRow> {
        self.rows.get(self.tree.cursor)
    }

    pub fn selected_issue(&self) -> Option<&IssueRecord> {
        self.selected_row()
            .map(|row| &self.forest.node(row.node).record)
    }

    fn toggle_expand(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.has_children {
            return;
        }
        let id = self.forest.node(row.node).record.id.clone();
        self.tree.toggle_expanded(&id);
        self.rebuild_rows();
    }

    /// `l`: open a collapsed node, otherwise step onto its first child.
    fn expand_or_descend(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.has_children && !row.expanded {
            let id = self.forest.node(row.node).record.id.clone();
            self.tree.toggle_expanded(&id);
            self.rebuild_rows();
        } else if row.expanded {
            self.move_cursor(1);
        }
    }

    /// `h`: close an open node, otherwise jump to its parent row.
    fn collapse_or_ascend(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if row.expanded {
            let id = self.forest.node(row.node).record.id.clone();
            self.tree.toggle_expanded(&id);
            self.rebuild_rows();
            return;
        }
        if let Some(parent) = self.forest.node(row.node).parent {
            if let Some(pos) = self.rows.iter().position(|r| r.node == parent) {
                self.cursor_to(pos);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Filter
    // ─────────────────────────────────────────────────────────────────────

    fn enter_filter(&mut self, search_all: bool) {
        self.filter_entry = true;
        self.search_all = search_all;
        self.tree.filter.clear();
        self.rebuild_rows();
    }

    fn exit_filter(&mut self) {
        self.filter_entry = false;
        self.search_all = false;
        self.tree.filter.clear();
        self.rebuild_rows();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Detail modal
    // ─────────────────────────────────────────────────────────────────────

    fn open_detail(&mut self) {
        if self.selected_issue().is_some() {
            self.modal = ModalState::Detail;
            self.clear_detail_navigation();
            self.start_detail_fetch();
        }
    }

    fn close_modal(&mut self) {
        self.modal = ModalState::None;
        self.clear_detail_navigation();
    }

    fn clear_detail_navigation(&mut self) {
        self.detail_issue_id = None;
        self.detail_stack.clear();
        self.detail_child_idx = None;
        self.detail_scroll = 0;
    }

    /// Issue shown in the detail modal: the navigated-to one if set,
    /// otherwise the issue under the cursor.
    pub fn detail_issue(&self) -> Option<&IssueRecord> {
        if let Some(id) = &self.detail_issue_id {
            self.records.get(id)
        } else {
            self.selected_issue()
        }
    }

    /// Children of the detail issue, detail-list order.
    pub fn detail_children(&self) -> Vec<&IssueRecord> {
        let Some(issue) = self.detail_issue() else {
            return Vec::new();
        };
        let Some(instance) = self.forest.find_instance(&issue.id) else {
            return Vec::new();
        };
        let children = self
            .forest
            .node(instance)
            .children
            .iter()
            .map(|&c| &self.forest.node(c).record)
            .collect();
        engine::sort_detail_list(children)
    }

    /// Known issues blocking the detail issue, detail-list order.
    pub fn detail_blockers(&self) -> Vec<&IssueRecord> {
        let Some(issue) = self.detail_issue() else {
            return Vec::new();
        };
        let blockers = self
            .forest
            .blockers_of(&issue.id)
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        engine::sort_detail_list(blockers)
    }

    /// Known issues the detail issue blocks, detail-list order.
    pub fn detail_dependents(&self) -> Vec<&IssueRecord> {
        let Some(issue) = self.detail_issue() else {
            return Vec::new();
        };
        let dependents = self
            .forest
            .dependents_of(&issue.id)
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect();
        engine::sort_detail_list(dependents)
    }

    fn detail_move_child(&mut self, delta: i32) {
        let count = self.detail_children().len();
        if count == 0 {
            return;
        }
        let next = match self.detail_child_idx {
            None => 0,
            Some(idx) if delta > 0 => (idx + 1).min(count - 1),
            Some(idx) => idx.saturating_sub(1),
        };
        self.detail_child_idx = Some(next);
    }

    fn detail_navigate_to_child(&mut self) {
        let Some(idx) = self.detail_child_idx else {
            return;
        };
        let Some(child_id) = self.detail_children().get(idx).map(|r| r.id.clone()) else {
            return;
        };
        self.detail_push(child_id);
    }

    fn detail_navigate_to_parent(&mut self) {
        let Some(issue) = self.detail_issue() else {
            return;
        };
        let parent_id = issue
            .relationships
            .iter()
            .find(|rel| rel.rel_type == RelationType::ParentChild)
            .map(|rel| rel.target.clone());
        if let Some(parent_id) = parent_id {
            if self.records.contains_key(&parent_id) {
                self.detail_push(parent_id);
            }
        }
    }

    fn detail_push(&mut self, issue_id: String) {
        let current = self.detail_issue().map(|r| r.id.clone());
        if let Some(current) = current {
            self.detail_stack.push(current);
        }
        self.detail_issue_id = Some(issue_id);
        self.detail_child_idx = None;
        self.detail_scroll = 0;
        self.start_detail_fetch();
    }

    /// Pop the detail navigation stack. Returns false when already at the
    /// originally selected issue.
    fn detail_back(&mut self) -> bool {
        if let Some(prev) = self.detail_stack.pop() {
            self.detail_issue_id = Some(prev);
            self.detail_child_idx = None;
            self.detail_scroll = 0;
            true
        } else if self.detail_issue_id.is_some() {
            self.detail_issue_id = None;
            self.detail_child_idx = None;
            self.detail_scroll = 0;
            true
        } else {
            false
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations (delegated to the store, surfaced once)
    // ─────────────────────────────────────────────────────────────────────

    /// Issue id mutations apply to: the detail issue when that modal is
    /// open, otherwise the cursor.
    fn target_issue_id(&self) -> Option<String> {
        if self.modal == ModalState::Detail {
            self.detail_issue().map(|r| r.id.clone())
        } else {
            self.selected_issue().map(|r| r.id.clone())
        }
    }

    async fn set_status(&mut self, status: Status) {
        self.modal = ModalState::None;
        let Some(id) = self.target_issue_id() else {
            return;
        };
        let store = Arc::clone(&self.store);
        match store.set_status(&id, &status).await {
            Ok(()) => {
                self.toast(format!("{id} → {}", status.display_name()), false);
                self.start_background_refresh();
            }
            Err(e) => self.toast(format!("Status change failed: {e}"), true),
        }
    }

    async fn submit_input(&mut self) {
        use super::message::InputPurpose;
        let ModalState::Input { purpose, buffer } = std::mem::take(&mut self.modal) else {
            return;
        };
        let value = buffer.trim().to_string();
        if value.is_empty() {
            return;
        }
        let store = Arc::clone(&self.store);
        let target = self.target_issue_id();
        let result = match purpose {
            InputPurpose::AddLabel => match target {
                Some(id) => store
                    .add_label(&id, &value)
                    .await
                    .map(|()| format!("Labeled {id} +{value}")),
                None => return,
            },
            InputPurpose::RemoveLabel => match target {
                Some(id) => store
                    .remove_label(&id, &value)
                    .await
                    .map(|()| format!("Unlabeled {id} -{value}")),
                None => return,
            },
            InputPurpose::CreateChild | InputPurpose::CreateRoot => {
                let parent = if purpose == InputPurpose::CreateChild {
                    target
                } else {
                    None
                };
                match store.create(&value, parent.as_deref()).await {
                    Ok(record) => {
                        let id = record.id.clone();
                        self.optimistic_insert(record, parent.as_deref());
                        Ok(format!("Created {id}"))
                    }
                    Err(e) => Err(e),
                }
            }
            InputPurpose::AddBlocker => match target {
                Some(id) => store
                    .add_dep(&id, &value, &RelationType::Blocks)
                    .await
                    .map(|()| format!("{id} blocked by {value}")),
                None => return,
            },
            InputPurpose::RemoveDep => match target {
                Some(id) => store
                    .remove_dep(&id, &value)
                    .await
                    .map(|()| format!("Removed dependency {id} → {value}")),
                None => return,
            },
        };
        match result {
            Ok(msg) => {
                self.toast(msg, false);
                if !matches!(
                    purpose,
                    InputPurpose::CreateChild | InputPurpose::CreateRoot
                ) {
                    self.start_background_refresh();
                }
            }
            Err(e) => self.toast(format!("{}: {e}", purpose.prompt()), true),
        }
    }

    /// Zero-latency local insert of a just-created issue. The next real
    /// refresh supersedes it without ceremony.
    pub fn optimistic_insert(&mut self, mut record: IssueRecord, parent: Option<&str>) {
        if let Some(parent) = parent {
            let has_edge = record.relationships.iter().any(|rel| {
                rel.rel_type == RelationType::ParentChild && rel.target == parent
            });
            if !has_edge {
                record
                    .relationships
                    .push(Relationship::new(parent, RelationType::ParentChild));
            }
            self.tree.expanded.insert(parent.to_string());
        }
        self.tree.cursor_id = Some(record.id.clone());
        self.records.insert(record.id.clone(), record);
        self.rebuild();
    }

    async fn delete_selected(&mut self) {
        self.modal = ModalState::None;
        let Some(id) = self.target_issue_id() else {
            return;
        };
        let store = Arc::clone(&self.store);
        match store.delete(&id).await {
            Ok(()) => {
                self.toast(format!("Deleted {id}"), false);
                self.start_background_refresh();
            }
            Err(e) => self.toast(format!("Delete failed: {e}"), true),
        }
    }
}
