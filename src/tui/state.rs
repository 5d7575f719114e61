//! Application state management and input handling.

use crate::browser::EpisodeBrowser;
use crate::config::{Config, Keybindings};
use crate::info_card::InfoCard;
use crate::types::{Episode, Series};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;

use super::types::{Action, Focus};

/// Application state for the TUI.
///
/// The app plays the caller of the episode browser: it owns the selected
/// episode id and receives the browser's selection callback.
pub struct App {
    /// Episode list model
    pub browser: EpisodeBrowser,
    /// Info card for the loaded series
    pub card: InfoCard,
    /// Currently selected episode id
    pub selected_id: Option<String>,
    /// Cursor over the displayed episodes
    pub cursor: usize,
    /// List state for the rendered rows (episodes, or grid rows)
    pub list_state: ListState,
    /// Grid columns at the last draw
    pub grid_columns: usize,
    /// Current focus
    pub focus: Focus,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Whether help modal is shown
    pub show_help: bool,
    /// Whether the info card panel is shown
    pub show_info: bool,
    /// Status message shown in the footer
    pub status_message: Option<String>,
    /// Custom keybindings
    pub keybindings: Keybindings,
}

impl App {
    /// Create the app around a mounted browser.
    pub fn new(browser: EpisodeBrowser, series: &Series, config: &Config) -> Self {
        let card = InfoCard::build(
            &series.info,
            config.max_description_length,
            config.max_genres,
        );
        let mut app = Self {
            browser,
            card,
            selected_id: None,
            cursor: 0,
            list_state: ListState::default(),
            grid_columns: 1,
            focus: Focus::List,
            should_quit: false,
            show_help: false,
            show_info: config.show_info_panel,
            status_message: None,
            keybindings: config.keybindings.clone(),
        };
        app.restore_view();
        app
    }

    /// Change the selection from outside the list (startup argument,
    /// programmatic navigation).
    pub fn set_selected(&mut self, id: Option<String>) {
        self.selected_id = id;
        self.browser.sync_selection(self.selected_id.as_deref());
        self.cursor_to_selected();
    }

    /// Episodes currently rendered.
    pub fn displayed(&self) -> Vec<&Episode> {
        self.browser.displayed_episodes()
    }

    /// Episode under the cursor.
    pub fn cursor_episode(&self) -> Option<&Episode> {
        self.displayed().get(self.cursor).copied()
    }

    /// Persist the scroll offset left by the last draw if it moved.
    ///
    /// Search results are transient and leave the stored offset alone.
    pub fn sync_scroll(&mut self) {
        if self.browser.is_searching() {
            return;
        }
        let offset = self.list_state.offset();
        if offset != self.browser.scroll_offset() {
            self.browser.record_scroll(offset);
        }
    }

    /// Set status message.
    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    /// Clear status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn cursor_to_selected(&mut self) {
        let Some(id) = self.selected_id.as_deref() else {
            return;
        };
        let position = self.displayed().iter().position(|e| e.id == id);
        if let Some(i) = position {
            self.cursor = i;
            self.sync_cursor();
        }
    }

    /// Clamp the cursor to the displayed list and mirror it into the
    /// list state (row index in grid mode).
    fn sync_cursor(&mut self) {
        let len = self.displayed().len();
        if len == 0 {
            self.cursor = 0;
            self.list_state.select(None);
            return;
        }
        self.cursor = self.cursor.min(len - 1);
        let row = if self.browser.is_row_layout() {
            self.cursor
        } else {
            self.cursor / self.grid_columns.max(1)
        };
        self.list_state.select(Some(row));
    }

    /// Reset cursor and scroll after the displayed list changed wholesale.
    fn reset_view(&mut self) {
        self.cursor = 0;
        *self.list_state.offset_mut() = 0;
        self.sync_cursor();
    }

    /// Scroll back to the stored offset with the cursor on its first row.
    fn restore_view(&mut self) {
        let offset = self.browser.scroll_offset();
        *self.list_state.offset_mut() = offset;
        self.cursor = if self.browser.is_row_layout() {
            offset
        } else {
            offset * self.grid_columns.max(1)
        };
        self.sync_cursor();
    }

    /// Update the grid column count measured by the renderer.
    ///
    /// The cursor keeps its row.
    pub fn set_grid_columns(&mut self, columns: usize) {
        let columns = columns.max(1);
        if columns != self.grid_columns {
            let row = self.cursor / self.grid_columns;
            let col = (self.cursor % self.grid_columns).min(columns - 1);
            self.grid_columns = columns;
            self.cursor = row * columns + col;
            self.sync_cursor();
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.displayed().len();
        if len == 0 {
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
        self.sync_cursor();
    }

    fn vertical_step(&self) -> isize {
        if self.browser.is_row_layout() {
            1
        } else {
            self.grid_columns.max(1) as isize
        }
    }

    /// Handle keyboard input and return an action.
    pub fn handle_input(&mut self, key: KeyEvent) -> Action {
        // Global quit with Ctrl+C or Ctrl+Q
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Action::Quit;
                }
                _ => {}
            }
        }

        // Handle help modal
        if self.show_help {
            if key.code == KeyCode::Esc
                || self.keybindings.matches(&self.keybindings.help, &key)
                || self.keybindings.matches(&self.keybindings.quit, &key)
            {
                self.show_help = false;
            }
            return Action::None;
        }

        if self.focus == Focus::Search {
            return self.handle_search_input(key);
        }

        self.handle_list_input(key)
    }

    fn handle_search_input(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => {
                self.focus = Focus::List;
            }
            KeyCode::Esc => {
                self.browser.clear_search();
                self.focus = Focus::List;
                self.restore_view();
            }
            KeyCode::Char(c) => {
                self.browser.push_search_char(c);
                self.reset_view();
            }
            KeyCode::Backspace => {
                self.browser.pop_search_char();
                if self.browser.is_searching() {
                    self.reset_view();
                } else {
                    self.restore_view();
                }
            }
            _ => {}
        }
        Action::None
    }

    fn handle_list_input(&mut self, key: KeyEvent) -> Action {
        if self.keybindings.matches(&self.keybindings.quit, &key) {
            self.should_quit = true;
            Action::Quit
        } else if self.keybindings.matches(&self.keybindings.help, &key) {
            self.show_help = true;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.search, &key) {
            self.focus = Focus::Search;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.up, &key) {
            let step = self.vertical_step();
            self.move_cursor(-step);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.down, &key) {
            let step = self.vertical_step();
            self.move_cursor(step);
            Action::None
        } else if self.keybindings.matches(&self.keybindings.left, &key) {
            if !self.browser.is_row_layout() {
                self.move_cursor(-1);
            }
            Action::None
        } else if self.keybindings.matches(&self.keybindings.right, &key) {
            if !self.browser.is_row_layout() {
                self.move_cursor(1);
            }
            Action::None
        } else if self.keybindings.matches(&self.keybindings.next_interval, &key) {
            if !self.browser.is_searching() && self.browser.next_interval() {
                self.reset_view();
            }
            Action::None
        } else if self.keybindings.matches(&self.keybindings.previous_interval, &key) {
            if !self.browser.is_searching() && self.browser.previous_interval() {
                self.reset_view();
            }
            Action::None
        } else if self.keybindings.matches(&self.keybindings.toggle_layout, &key) {
            let mode = self.browser.toggle_display_mode();
            self.set_status(&format!("Layout: {}", mode));
            *self.list_state.offset_mut() = 0;
            self.sync_cursor();
            Action::None
        } else if self.keybindings.matches(&self.keybindings.toggle_info, &key) {
            self.show_info = !self.show_info;
            Action::None
        } else if self.keybindings.matches(&self.keybindings.select, &key) {
            self.select_cursor()
        } else if key.code == KeyCode::Esc && self.browser.is_searching() {
            self.browser.clear_search();
            self.restore_view();
            Action::None
        } else {
            Action::None
        }
    }

    /// Select the episode under the cursor as a user action.
    fn select_cursor(&mut self) -> Action {
        let Some(id) = self.cursor_episode().map(|e| e.id.clone()) else {
            return Action::None;
        };

        let mut chosen = None;
        self.browser
            .select_episode(&id, |selected| chosen = Some(selected.to_string()));

        match chosen {
            Some(selected) => {
                self.selected_id = Some(selected.clone());
                self.browser.sync_selection(self.selected_id.as_deref());
                Action::Select(selected)
            }
            None => Action::None,
        }
    }
}
