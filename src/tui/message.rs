//! Message enum for the Elm Architecture (TEA) pattern.
//!
//! Every user action is a message; key events map to messages in `input`,
//! and `App::update` is the single place state changes.

use crate::data::Status;

/// What a text-input modal is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    AddLabel,
    RemoveLabel,
    /// New issue under the selected issue.
    CreateChild,
    /// New top-level issue.
    CreateRoot,
    /// Id of an issue that blocks the selected one.
    AddBlocker,
    /// Id of a dependency edge to remove from the selected issue.
    RemoveDep,
}

impl InputPurpose {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::AddLabel => "Add label",
            Self::RemoveLabel => "Remove label",
            Self::CreateChild => "New sub-issue title",
            Self::CreateRoot => "New issue title",
            Self::AddBlocker => "Blocked by (issue id)",
            Self::RemoveDep => "Remove dependency on (issue id)",
        }
    }
}

/// All possible user actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // App lifecycle
    /// Quit the application
    Quit,
    /// Trigger a manual refresh
    Refresh,

    // Cursor movement
    MoveUp,
    MoveDown,
    GotoTop,
    GotoBottom,
    PageUp,
    PageDown,

    // Tree shape
    /// Toggle expansion of the issue under the cursor (all instances)
    ToggleExpand,
    /// Expand the current node, or move to its first child if already open
    Expand,
    /// Collapse the current node, or jump to its parent if already closed
    Collapse,
    /// Collapse everything
    CollapseAll,

    // Filter / search
    /// Enter filter entry mode (`search_all` switches to fuzzy matching
    /// across id, title, and labels instead of title substring)
    EnterFilter { search_all: bool },
    /// Leave filter mode and drop the query
    ExitFilter,
    /// Leave filter mode keeping the query applied
    ConfirmFilter,
    FilterInput(char),
    FilterBackspace,
    /// Drop an applied filter from normal mode
    ClearFilter,

    // Modals
    ToggleHelp,
    CloseModal,
    OpenDetail,
    DetailNextChild,
    DetailPrevChild,
    /// Descend into the selected child inside the detail modal
    DetailNavigateToChild,
    DetailNavigateToParent,
    /// Pop the detail navigation stack
    DetailBack,
    ScrollDetail(i32),

    // Mutations (delegated to the store)
    OpenStatusMenu,
    SetStatus(Status),
    OpenInput(InputPurpose),
    InputChar(char),
    InputBackspace,
    CancelInput,
    SubmitInput,
    OpenDeleteConfirm,
    ConfirmDelete,

    /// No operation (unhandled key or pending chord)
    None,
}
