//! Full-screen interface
//!
//! The terminal rendition of the Bibliotheque "single page". While no
//! session token is present it shows a login form; once authenticated it
//! shows the book list next to a detail pane, with modal input for
//! filtering and quick-adds.
//!
//! Keys on the main screen: j/k move, Tab/h/l switch pane, `a` add book,
//! `A` add author, `e` edit in $EDITOR, `d` delete, `/` filter, `r`
//! refresh, `t`/`f` cycle theme and font scale, `x` log out, `?` help,
//! `q` quit. A certain ten-key sequence is also recognized.

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use biblio_core::{Config, NewAuthor, NewBook, PreferencesPatch, Session};

use crate::editor;

use app::{ActivePane, App, CommandType, InputMode, LoginField, Screen};

/// Shown on the login form when an attempt fails
const AUTH_ERROR: &str = "Cannot connect. Check the email/password or that the API is running.";

/// How long to wait for a key before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Entry point for `biblio tui`
pub async fn run(config: Config) -> Result<()> {
    init_logging(&config);

    let mut session = Session::open(&config);

    // A restored token is validated by side effect before the first frame;
    // failure surfaces as a status message, not a logout.
    if session.is_authenticated() {
        session.bootstrap().await;
    }

    let mut app = App::new(&session);
    app.sync_selection(&session);
    if let Some(err) = session.error() {
        app.set_status(err.to_string());
    }

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let outcome = event_loop(&mut terminal, &mut app, &mut session).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    outcome
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    while !app.should_quit {
        app.check_status_timeout();
        terminal.draw(|frame| ui::draw(frame, app, session))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // Overlays eat the next key press
        if app.has_error() {
            app.clear_error();
            continue;
        }
        if app.show_help {
            app.show_help = false;
            continue;
        }

        match app.screen {
            Screen::Login => on_login_key(terminal, app, session, key.code, key.modifiers).await?,
            Screen::Main => match app.input_mode {
                InputMode::Normal => {
                    on_normal_key(terminal, app, session, key.code, key.modifiers).await?
                }
                InputMode::Command => {
                    on_command_key(terminal, app, session, key.code, key.modifiers).await?
                }
                InputMode::Filter => on_filter_key(app, session, key.code),
            },
        }
    }

    Ok(())
}

/// Key handling for the login form
async fn on_login_key<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('r') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.register_mode = !app.register_mode;
            app.login_error = None;
        }

        KeyCode::Tab | KeyCode::BackTab => {
            app.login_field = app.login_field.toggle();
        }

        KeyCode::Enter => {
            // Enter on the email field just advances
            if app.login_field == LoginField::Email {
                app.login_field = LoginField::Password;
                return Ok(());
            }

            if app.login_email.trim().is_empty() || app.login_password.is_empty() {
                app.login_error = Some("Email and password are required.".to_string());
                return Ok(());
            }

            app.is_loading = true;
            app.login_error = None;
            terminal.draw(|frame| ui::draw(frame, app, session))?;

            let email = app.login_email.trim().to_string();
            let password = app.login_password.clone();
            let attempt = if app.register_mode {
                session.register(&email, &password).await
            } else {
                session.login(&email, &password).await
            };
            app.is_loading = false;

            match attempt {
                Ok(()) => {
                    app.screen = Screen::Main;
                    app.login_password.clear();
                    app.sync_selection(session);
                    // The login itself worked even if the bootstrap did not
                    if let Some(err) = session.error() {
                        app.set_status(err.to_string());
                    }
                }
                Err(_) => {
                    app.login_error = Some(AUTH_ERROR.to_string());
                }
            }
        }

        KeyCode::Char(c) => match app.login_field {
            LoginField::Email => app.login_email.push(c),
            LoginField::Password => app.login_password.push(c),
        },

        KeyCode::Backspace => {
            match app.login_field {
                LoginField::Email => app.login_email.pop(),
                LoginField::Password => app.login_password.pop(),
            };
        }

        _ => {}
    }

    Ok(())
}

fn is_motion_key(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('j' | 'k' | 'h' | 'l')
    )
}

/// Key handling for the main screen in normal mode
async fn on_normal_key<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    // The celebration detector sees every normal-mode key first
    if app.sequence.push(code) {
        app.celebration_count += 1;
        app.set_status("✶ Confetti! You found the hidden sequence ✶");
        return Ok(());
    }

    if is_motion_key(code) {
        app.status_message = None;
    }

    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }

        KeyCode::Char('k') | KeyCode::Up => {
            app.move_up();
            select_current(app, session);
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.move_down();
            select_current(app, session);
        }
        KeyCode::Char('g') => {
            app.move_to_first();
            select_current(app, session);
        }
        KeyCode::Char('G') => {
            app.move_to_last();
            select_current(app, session);
        }

        KeyCode::Char('h' | 'l') | KeyCode::Left | KeyCode::Right | KeyCode::Tab
        | KeyCode::BackTab => {
            app.active_pane = app.active_pane.toggle();
        }
        KeyCode::Enter => {
            app.active_pane = ActivePane::Detail;
        }

        KeyCode::Char('a') => {
            app.enter_command_mode(CommandType::AddBook);
        }
        KeyCode::Char('A') => {
            app.enter_command_mode(CommandType::AddAuthor);
        }
        KeyCode::Char('e') => {
            edit_current_book(terminal, app, session).await?;
        }
        KeyCode::Char('d') => {
            let current = app.current_book().map(|b| (b.id, b.title.clone()));
            if let Some((id, title)) = current {
                match session.delete_book(id).await {
                    Ok(()) => {
                        app.sync_selection(session);
                        app.set_status(format!("Deleted '{}'", title));
                    }
                    Err(e) => app.set_error(format!("Failed to delete book: {}", e)),
                }
            }
        }

        KeyCode::Char('/') => {
            app.enter_filter_mode();
        }

        KeyCode::Char('r') => {
            app.is_loading = true;
            terminal.draw(|frame| ui::draw(frame, app, session))?;
            session.bootstrap().await;
            app.is_loading = false;
            app.sync_selection(session);
            match session.error() {
                Some(err) => app.set_error(err.to_string()),
                None => app.set_status("Refreshed"),
            }
        }

        // Both land locally first; the server mirror is best-effort
        KeyCode::Char('t') => {
            let next = session.preferences().theme.next();
            session.set_preferences(PreferencesPatch::theme(next)).await;
            app.set_status(format!("Theme: {}", next));
        }
        KeyCode::Char('f') => {
            let next = session.preferences().font_scale.next();
            session
                .set_preferences(PreferencesPatch::font_scale(next))
                .await;
            app.set_status(format!("Font scale: {}", next));
        }

        KeyCode::Char('x') => {
            session.logout();
            app.reset_to_login();
        }

        KeyCode::Char('?') => {
            app.toggle_help();
        }

        _ => {}
    }

    Ok(())
}

/// Key handling for the quick-add input line
async fn on_command_key<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Result<()> {
    match code {
        KeyCode::Esc => {
            app.exit_input_mode();
        }
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.exit_input_mode();
        }

        KeyCode::Enter => {
            let command_type = app.command_type;
            let input = app.command_input.trim().to_string();
            app.exit_input_mode();

            if input.is_empty() {
                app.set_status("Cancelled (empty)");
                return Ok(());
            }

            app.is_loading = true;
            terminal.draw(|frame| ui::draw(frame, app, session))?;

            match command_type {
                Some(CommandType::AddBook) => {
                    match session.create_book(&NewBook::new(input.clone())).await {
                        Ok(()) => {
                            app.sync_selection(session);
                            app.set_status(format!("Added '{}'", input));
                        }
                        Err(e) => app.set_error(format!("Failed to add book: {}", e)),
                    }
                }
                Some(CommandType::AddAuthor) => {
                    match session.create_author(&NewAuthor::new(input.clone())).await {
                        Ok(()) => {
                            app.set_status(format!("Added author '{}'", input));
                        }
                        Err(e) => app.set_error(format!("Failed to add author: {}", e)),
                    }
                }
                None => {}
            }
            app.is_loading = false;
        }

        KeyCode::Char(c) => {
            app.insert_char(c);
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        KeyCode::Left => {
            app.cursor_left();
        }
        KeyCode::Right => {
            app.cursor_right();
        }

        _ => {}
    }

    Ok(())
}

/// Key handling for the filter line; the list narrows on every keystroke
fn on_filter_key(app: &mut App, session: &Session, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.exit_input_mode();
            app.filter_text.clear();
            app.refresh(session);
        }

        // Keep the narrowed view and return to normal mode
        KeyCode::Enter => {
            app.exit_input_mode();
        }

        KeyCode::Char(c) => {
            app.insert_char(c);
            app.refresh(session);
        }
        KeyCode::Backspace => {
            app.delete_char();
            app.refresh(session);
        }

        _ => {}
    }
}

/// Keep the session's selected book in step with the cursor
fn select_current(app: &App, session: &mut Session) {
    if let Some(id) = app.current_book().map(|b| b.id) {
        session.select_book(id);
    }
}

/// Hand the selected book to $EDITOR, with the TUI suspended meanwhile
async fn edit_current_book<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    let Some(book) = app.current_book().cloned() else {
        app.set_status("No book selected");
        return Ok(());
    };

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(cursor::Show)?;

    let edited = editor::edit_text(&editor::book_template(&book));

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    terminal.clear()?;

    let content = match edited {
        Ok(content) => content,
        Err(e) => {
            app.set_error(format!("Editor failed: {}", e));
            return Ok(());
        }
    };

    match editor::parse_book_edit(&content, &book) {
        Some(patch) => match session.update_book(book.id, &patch).await {
            Ok(()) => {
                app.sync_selection(session);
                app.set_status(format!("Updated '{}'", book.title));
            }
            Err(e) => app.set_error(format!("Failed to update book: {}", e)),
        },
        None => app.set_status("Edit cancelled (no changes)"),
    }

    Ok(())
}

/// File-backed tracing, active only when BIBLIO_LOG names a level
///
/// Stdout belongs to the alternate screen, so logs go to config.log_file
/// (default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(level) = std::env::var("BIBLIO_LOG") else {
        return;
    };

    let path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("debug.log"));

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: could not create log file {:?}: {}", path, e);
            return;
        }
    };

    let filter = EnvFilter::new(format!("biblio_core={0},biblio_cli={0}", level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(file)
        .try_init();

    info!("TUI logging enabled, writing to {:?}", path);
}
