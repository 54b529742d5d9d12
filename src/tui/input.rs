//! Input dispatch layer for the Elm Architecture (TEA) pattern.
//!
//! Maps key events to messages based on the current app mode. The `gg`
//! chord uses a non-blocking state machine checked for timeout on the main
//! loop instead of polling inline.

use super::app::ModalState;
use super::message::InputPurpose;
use super::{App, Message};
use crate::data::Status;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

/// Pending state for two-key chords (`gg`).
#[derive(Debug, Default)]
pub struct InputState {
    pub pending: Option<KeyCode>,
    pub pending_since: Option<Instant>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pending chord has timed out (500ms).
    pub fn has_timed_out(&self) -> bool {
        self.pending_since
            .map(|since| since.elapsed().as_millis() > 500)
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.pending_since = None;
    }

    pub fn set_pending(&mut self, key: KeyCode) {
        self.pending = Some(key);
        self.pending_since = Some(Instant::now());
    }
}

/// Route a key event to the handler for the current mode.
pub fn dispatch(app: &App, input: &mut InputState, key: KeyEvent) -> Message {
    if let Some(pending) = input.pending.take() {
        input.pending_since = None;
        return handle_chord(pending, key.code);
    }

    if app.filter_entry {
        return dispatch_filter_entry(key);
    }
    match &app.modal {
        ModalState::Input { .. } => dispatch_input_modal(key),
        ModalState::ConfirmDelete => dispatch_confirm_delete(key),
        ModalState::StatusMenu => dispatch_status_menu(key),
        ModalState::Help => dispatch_help(key),
        ModalState::Detail => dispatch_detail(key),
        ModalState::None => dispatch_normal(app, input, key),
    }
}

fn dispatch_normal(app: &App, input: &mut InputState, key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('q') => Message::Quit,
        KeyCode::Char('j') | KeyCode::Down => Message::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Message::MoveUp,
        KeyCode::Char('G') => Message::GotoBottom,
        KeyCode::Char('g') => {
            input.set_pending(KeyCode::Char('g'));
            Message::None
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Message::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Message::PageUp,
        KeyCode::Char('/') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Message::EnterFilter { search_all: true }
        }
        KeyCode::Char('/') => Message::EnterFilter { search_all: false },
        KeyCode::Esc if app.tree.filter_active() => Message::ClearFilter,
        KeyCode::Char(' ') | KeyCode::Tab => Message::ToggleExpand,
        KeyCode::Char('l') | KeyCode::Right => Message::Expand,
        KeyCode::Char('h') | KeyCode::Left => Message::Collapse,
        KeyCode::Char('z') => Message::CollapseAll,
        KeyCode::Enter => Message::OpenDetail,
        KeyCode::Char('r') => Message::Refresh,
        KeyCode::Char('?') => Message::ToggleHelp,
        KeyCode::Char('s') => Message::OpenStatusMenu,
        KeyCode::Char('a') => Message::OpenInput(InputPurpose::AddLabel),
        KeyCode::Char('x') => Message::OpenInput(InputPurpose::RemoveLabel),
        KeyCode::Char('n') => Message::OpenInput(InputPurpose::CreateChild),
        KeyCode::Char('N') => Message::OpenInput(InputPurpose::CreateRoot),
        KeyCode::Char('b') => Message::OpenInput(InputPurpose::AddBlocker),
        KeyCode::Char('B') => Message::OpenInput(InputPurpose::RemoveDep),
        KeyCode::Char('D') => Message::OpenDeleteConfirm,
        _ => Message::None,
    }
}

fn dispatch_filter_entry(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::ExitFilter,
        KeyCode::Enter => Message::ConfirmFilter,
        KeyCode::Backspace => Message::FilterBackspace,
        KeyCode::Char(c) => Message::FilterInput(c),
        _ => Message::None,
    }
}

fn dispatch_input_modal(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::CancelInput,
        KeyCode::Enter => Message::SubmitInput,
        KeyCode::Backspace => Message::InputBackspace,
        KeyCode::Char(c) => Message::InputChar(c),
        _ => Message::None,
    }
}

fn dispatch_confirm_delete(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => Message::ConfirmDelete,
        KeyCode::Char('n') | KeyCode::Esc => Message::CloseModal,
        _ => Message::None,
    }
}

fn dispatch_status_menu(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc => Message::CloseModal,
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let idx = c.to_digit(10).unwrap() as usize;
            match Status::all_known().nth(idx.wrapping_sub(1)) {
                Some(status) => Message::SetStatus(status),
                None => Message::None,
            }
        }
        _ => Message::None,
    }
}

fn dispatch_help(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => Message::CloseModal,
        _ => Message::None,
    }
}

fn dispatch_detail(key: KeyEvent) -> Message {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Message::DetailBack,
        KeyCode::Char('j') | KeyCode::Down => Message::DetailNextChild,
        KeyCode::Char('k') | KeyCode::Up => Message::DetailPrevChild,
        KeyCode::Enter => Message::DetailNavigateToChild,
        KeyCode::Char('p') => Message::DetailNavigateToParent,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Message::ScrollDetail(10)
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Message::ScrollDetail(-10)
        }
        KeyCode::Char('s') => Message::OpenStatusMenu,
        KeyCode::Char('a') => Message::OpenInput(InputPurpose::AddLabel),
        KeyCode::Char('x') => Message::OpenInput(InputPurpose::RemoveLabel),
        KeyCode::Char('b') => Message::OpenInput(InputPurpose::AddBlocker),
        KeyCode::Char('B') => Message::OpenInput(InputPurpose::RemoveDep),
        KeyCode::Char('g') => Message::ScrollDetail(-10000),
        KeyCode::Char('G') => Message::ScrollDetail(10000),
        _ => Message::None,
    }
}

fn handle_chord(first: KeyCode, second: KeyCode) -> Message {
    match (first, second) {
        (KeyCode::Char('g'), KeyCode::Char('g')) => Message::GotoTop,
        _ => Message::None,
    }
}
