//! TUI state

use std::time::Instant;

use biblio_core::{Book, Session};
use crossterm::event::KeyCode;

/// The screen being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Email/password form shown while anonymous
    Login,
    /// Book list and detail panes
    Main,
}

/// Input mode for the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Plain navigation
    Normal,
    /// Collecting a quick-add title or name
    Command,
    /// Collecting a filter query
    Filter,
}

/// What the input line is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    /// Add a new book by title
    AddBook,
    /// Add a new author by name
    AddAuthor,
}

/// Focused pane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    List,
    Detail,
}

impl ActivePane {
    /// Move to the other pane
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::List => ActivePane::Detail,
            ActivePane::Detail => ActivePane::List,
        }
    }
}

/// Active field on the login form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

impl LoginField {
    pub fn toggle(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }
}

/// The celebration key sequence: ↑ ↑ ↓ ↓ ← → ← → b a
const CELEBRATION_SEQUENCE: [KeyCode; 10] = [
    KeyCode::Up,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Char('b'),
    KeyCode::Char('a'),
];

/// Sliding-window detector for the celebration key sequence
///
/// Keeps only the last N keys; fires when they match the sequence exactly
/// and resets afterwards.
#[derive(Debug, Default)]
pub struct KeySequence {
    buffer: Vec<KeyCode>,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a key; returns true when the full sequence completes
    pub fn push(&mut self, code: KeyCode) -> bool {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };

        self.buffer.push(code);
        if self.buffer.len() > CELEBRATION_SEQUENCE.len() {
            self.buffer.remove(0);
        }

        if self.buffer[..] == CELEBRATION_SEQUENCE {
            self.buffer.clear();
            return true;
        }
        false
    }
}

/// How long a status message stays visible
const STATUS_TIMEOUT_SECS: u64 = 4;

/// All mutable state behind the TUI
pub struct App {
    /// Set when the user asks to quit
    pub should_quit: bool,
    /// Screen being shown
    pub screen: Screen,
    /// Input mode on the main screen
    pub input_mode: InputMode,
    /// What the input line is collecting
    pub command_type: Option<CommandType>,
    /// Text collected by the input line
    pub command_input: String,
    /// Cursor offset into the input line
    pub command_cursor: usize,
    /// Focused pane
    pub active_pane: ActivePane,
    /// Live filter query
    pub filter_text: String,
    /// Visible books (filtered snapshot of the session list)
    pub books: Vec<Book>,
    /// Currently selected index into `books`
    pub list_index: usize,
    /// Transient status line text
    pub status_message: Option<String>,
    /// When the status text was set; it auto-dismisses
    pub status_message_time: Option<Instant>,
    /// Error to display as a modal (any key dismisses)
    pub error_message: Option<String>,
    /// A request is in flight
    pub is_loading: bool,
    /// Help overlay toggle
    pub show_help: bool,
    /// Login form: email field
    pub login_email: String,
    /// Login form: password field
    pub login_password: String,
    /// Login form: which field has focus
    pub login_field: LoginField,
    /// Login form: register a new account instead of logging in
    pub register_mode: bool,
    /// Login form: error from the last attempt
    pub login_error: Option<String>,
    /// Celebration sequence detector
    pub sequence: KeySequence,
    /// How many times the celebration fired
    pub celebration_count: u32,
}

impl App {
    /// Create app state matching the session
    pub fn new(session: &Session) -> Self {
        let screen = if session.is_authenticated() {
            Screen::Main
        } else {
            Screen::Login
        };

        let mut app = Self {
            should_quit: false,
            screen,
            input_mode: InputMode::Normal,
            command_type: None,
            command_input: String::new(),
            command_cursor: 0,
            active_pane: ActivePane::List,
            filter_text: String::new(),
            books: Vec::new(),
            list_index: 0,
            status_message: None,
            status_message_time: None,
            error_message: None,
            is_loading: false,
            show_help: false,
            login_email: String::new(),
            login_password: String::new(),
            login_field: LoginField::Email,
            register_mode: false,
            login_error: None,
            sequence: KeySequence::new(),
            celebration_count: 0,
        };
        app.refresh(session);
        app
    }

    /// Rebuild the visible list from the session and the current filter
    pub fn refresh(&mut self, session: &Session) {
        self.books = session
            .filtered_books(&self.filter_text)
            .into_iter()
            .cloned()
            .collect();
        if self.list_index >= self.books.len() {
            self.list_index = self.books.len().saturating_sub(1);
        }
    }

    /// Refresh and move the cursor to the session's selected book
    pub fn sync_selection(&mut self, session: &Session) {
        self.refresh(session);
        if let Some(id) = session.selected_id() {
            if let Some(pos) = self.books.iter().position(|b| b.id == id) {
                self.list_index = pos;
            }
        }
    }

    /// The book under the cursor
    pub fn current_book(&self) -> Option<&Book> {
        self.books.get(self.list_index)
    }

    pub fn move_up(&mut self) {
        self.list_index = self.list_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.list_index + 1 < self.books.len() {
            self.list_index += 1;
        }
    }

    pub fn move_to_first(&mut self) {
        self.list_index = 0;
    }

    pub fn move_to_last(&mut self) {
        self.list_index = self.books.len().saturating_sub(1);
    }

    /// Start collecting a filter query
    pub fn enter_filter_mode(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    /// Start collecting quick-add input of the given kind
    pub fn enter_command_mode(&mut self, command_type: CommandType) {
        self.input_mode = InputMode::Command;
        self.command_type = Some(command_type);
        self.command_input.clear();
        self.command_cursor = 0;
    }

    /// Drop back to plain navigation
    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command_type = None;
        self.command_input.clear();
        self.command_cursor = 0;
    }

    /// Insert a character into the active input buffer
    pub fn insert_char(&mut self, c: char) {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_text.push(c);
            }
            _ => {
                self.command_input.insert(self.command_cursor, c);
                self.command_cursor += 1;
            }
        }
    }

    /// Delete the character before the cursor in the active input buffer
    pub fn delete_char(&mut self) {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_text.pop();
            }
            _ => {
                if self.command_cursor > 0 {
                    self.command_cursor -= 1;
                    self.command_input.remove(self.command_cursor);
                }
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.command_cursor = self.command_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.command_cursor < self.command_input.len() {
            self.command_cursor += 1;
        }
    }

    /// Set a transient status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Dismiss the status message after a timeout
    pub fn check_status_timeout(&mut self) {
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_TIMEOUT_SECS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Show an error modal
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    pub fn has_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Reset to the login screen (after logout)
    pub fn reset_to_login(&mut self) {
        self.screen = Screen::Login;
        self.input_mode = InputMode::Normal;
        self.command_type = None;
        self.command_input.clear();
        self.filter_text.clear();
        self.books.clear();
        self.list_index = 0;
        self.login_email.clear();
        self.login_password.clear();
        self.login_field = LoginField::Email;
        self.register_mode = false;
        self.login_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(seq: &mut KeySequence, codes: &[KeyCode]) -> bool {
        let mut fired = false;
        for &code in codes {
            fired = seq.push(code);
        }
        fired
    }

    #[test]
    fn test_sequence_fires_on_exact_match() {
        let mut seq = KeySequence::new();
        assert!(feed(&mut seq, &CELEBRATION_SEQUENCE));
    }

    #[test]
    fn test_sequence_tolerates_leading_noise() {
        let mut seq = KeySequence::new();
        seq.push(KeyCode::Char('j'));
        seq.push(KeyCode::Char('k'));
        assert!(feed(&mut seq, &CELEBRATION_SEQUENCE));
    }

    #[test]
    fn test_sequence_resets_after_firing() {
        let mut seq = KeySequence::new();
        assert!(feed(&mut seq, &CELEBRATION_SEQUENCE));
        // The buffer is empty again; a lone 'a' must not re-fire
        assert!(!seq.push(KeyCode::Char('a')));
        // And the full sequence fires a second time
        assert!(feed(&mut seq, &CELEBRATION_SEQUENCE));
    }

    #[test]
    fn test_sequence_rejects_interrupted_input() {
        let mut seq = KeySequence::new();
        let mut codes = CELEBRATION_SEQUENCE.to_vec();
        codes.insert(8, KeyCode::Char('x'));
        assert!(!feed(&mut seq, &codes));
    }

    #[test]
    fn test_sequence_is_case_insensitive() {
        let mut seq = KeySequence::new();
        let mut codes = CELEBRATION_SEQUENCE.to_vec();
        codes[8] = KeyCode::Char('B');
        codes[9] = KeyCode::Char('A');
        assert!(feed(&mut seq, &codes));
    }

    #[test]
    fn test_pane_toggle() {
        assert_eq!(ActivePane::List.toggle(), ActivePane::Detail);
        assert_eq!(ActivePane::Detail.toggle(), ActivePane::List);
    }

    #[test]
    fn test_login_field_toggle() {
        assert_eq!(LoginField::Email.toggle(), LoginField::Password);
        assert_eq!(LoginField::Password.toggle(), LoginField::Email);
    }
}
