//! TUI rendering module.
//!
//! This module handles all UI rendering for the terminal interface.
//! It's organized into submodules for maintainability:
//!
//! - `icons` - icons used throughout the UI
//! - `layout` - layout calculations and text utilities
//! - `status` - status styling and status bar rendering
//! - `tree` - header and issue tree rendering
//! - `modals` - modal popup rendering (help, detail, menus, input)

pub mod icons;
pub mod layout;
mod modals;
mod status;
mod tree;

// Re-export the main draw function
pub use self::draw::draw;

mod draw {

    use super::modals::{
        draw_confirm_delete, draw_detail_modal, draw_help_popup, draw_input_modal,
        draw_status_menu,
    };
    use super::status::draw_status_bar;
    use super::tree::{draw_header, draw_tree};
    use crate::tui::app::ModalState;
    use crate::tui::App;
    use ratatui::{
        layout::{Constraint, Direction, Layout},
        Frame,
    };

    /// Main draw function - renders the entire TUI.
    pub fn draw(f: &mut Frame, app: &App) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header / filter line
                Constraint::Min(0),    // Issue tree
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        draw_header(f, app, chunks[0]);
        draw_tree(f, app, chunks[1]);
        draw_status_bar(f, app, chunks[2]);

        // Overlays
        match &app.modal {
            ModalState::None => {}
            ModalState::Help => draw_help_popup(f),
            ModalState::Detail => draw_detail_modal(f, app),
            ModalState::StatusMenu => draw_status_menu(f, app),
            ModalState::Input { .. } => draw_input_modal(f, app),
            ModalState::ConfirmDelete => draw_confirm_delete(f, app),
        }
    }
}
