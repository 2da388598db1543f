//! Frame drawing

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use biblio_core::{FontScale, Session, Theme};

use super::app::{ActivePane, App, CommandType, InputMode, LoginField, Screen};

/// Colours derived from the active theme marker
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub warning: Color,
}

/// Map a theme to its terminal palette
pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            text: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            warning: Color::Yellow,
        },
        Theme::Sepia => Palette {
            text: Color::Rgb(222, 201, 166),
            dim: Color::Rgb(146, 124, 94),
            accent: Color::Rgb(210, 140, 60),
            warning: Color::Yellow,
        },
        Theme::Ardoise => Palette {
            text: Color::Rgb(171, 178, 191),
            dim: Color::Rgb(92, 99, 112),
            accent: Color::Rgb(97, 175, 239),
            warning: Color::Yellow,
        },
        Theme::Foret => Palette {
            text: Color::Rgb(183, 201, 183),
            dim: Color::Rgb(95, 115, 95),
            accent: Color::Rgb(120, 190, 120),
            warning: Color::Yellow,
        },
    }
}

/// Extra emphasis when a font-scale marker is set
fn emphasis(session: &Session) -> Modifier {
    match session.preference_store().font_marker() {
        Some(_) => Modifier::BOLD,
        None => Modifier::empty(),
    }
}

/// Whether detail fields get breathing room between them
fn spaced(session: &Session) -> bool {
    matches!(
        session.preference_store().font_marker(),
        Some(FontScale::Xlarge)
    )
}

/// Draw one frame
pub fn draw(frame: &mut Frame, app: &App, session: &Session) {
    let colors = palette(session.preference_store().theme_marker());

    match app.screen {
        Screen::Login => draw_login(frame, app, &colors),
        Screen::Main => draw_main(frame, app, session, &colors),
    }

    if app.show_help {
        draw_help_overlay(frame, &colors);
    }

    if let Some(ref message) = app.error_message {
        draw_error_modal(frame, message, &colors);
    }
}

/// Draw the login form (anonymous screen)
fn draw_login(frame: &mut Frame, app: &App, colors: &Palette) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .margin(2)
        .split(area);

    // Title
    let heading = if app.register_mode {
        "Create an account"
    } else {
        "Sign in"
    };
    let title = Paragraph::new(vec![
        Line::from(vec![Span::styled(
            "Bibliotheque",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(colors.accent),
        )]),
        Line::from(""),
        Line::from(heading),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    // Form
    let email_marker = if app.login_field == LoginField::Email {
        "> "
    } else {
        "  "
    };
    let password_marker = if app.login_field == LoginField::Password {
        "> "
    } else {
        "  "
    };
    let masked: String = "•".repeat(app.login_password.chars().count());

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(email_marker, Style::default().fg(colors.accent)),
            Span::styled("Email:    ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(app.login_email.as_str()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(password_marker, Style::default().fg(colors.accent)),
            Span::styled("Password: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(masked),
        ]),
        Line::from(""),
        Line::from(""),
        if app.is_loading {
            Line::from(vec![Span::styled(
                "Connecting...",
                Style::default().fg(colors.warning),
            )])
        } else {
            Line::from(vec![Span::styled(
                "Tab switch field · Enter submit · Ctrl+R toggle register · Ctrl+C quit",
                Style::default().add_modifier(Modifier::DIM),
            )])
        },
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.register_mode {
                " Register "
            } else {
                " Login "
            })
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(content, chunks[1]);

    // Hint line, replaced by the error when one is showing
    let footer = if let Some(ref err) = app.login_error {
        Paragraph::new(Span::styled(err.as_str(), Style::default().fg(Color::Red)))
    } else {
        Paragraph::new(Span::styled(
            "Your token is stored locally after a successful login",
            Style::default().add_modifier(Modifier::DIM),
        ))
    };
    frame.render_widget(footer, chunks[2]);

    // Cursor on the active field
    let (field_len, row) = match app.login_field {
        LoginField::Email => (app.login_email.chars().count(), 2),
        LoginField::Password => (app.login_password.chars().count(), 4),
    };
    let x = chunks[1].x + 13 + field_len as u16;
    let y = chunks[1].y + row;
    frame.set_cursor_position((x, y));
}

/// Draw the main screen (book list + detail)
fn draw_main(frame: &mut Frame, app: &App, session: &Session, colors: &Palette) {
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, session, colors, outer_chunks[0]);

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer_chunks[1]);

    draw_list_pane(frame, app, session, colors, pane_chunks[0]);
    draw_detail_pane(frame, app, session, colors, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, colors, outer_chunks[2]),
        InputMode::Command => draw_command_input(frame, app, colors, outer_chunks[2]),
        InputMode::Filter => draw_filter_input(frame, app, colors, outer_chunks[2]),
    }
}

fn draw_header(frame: &mut Frame, app: &App, session: &Session, colors: &Palette, area: Rect) {
    let email = session
        .user()
        .map(|u| u.email.clone())
        .unwrap_or_else(|| "(validating token...)".to_string());

    let mut spans = vec![
        Span::styled(
            "Biblio",
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" — "),
        Span::styled(email, Style::default().fg(colors.text)),
    ];

    if app.celebration_count > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("✶ x{}", app.celebration_count),
            Style::default().fg(colors.warning),
        ));
    }

    if app.is_loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "loading...",
            Style::default().fg(colors.warning),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_list_pane(frame: &mut Frame, app: &App, session: &Session, colors: &Palette, area: Rect) {
    let is_active = app.active_pane == ActivePane::List;
    let base = Style::default().fg(colors.text).add_modifier(emphasis(session));

    let items: Vec<ListItem> = app
        .books
        .iter()
        .map(|book| {
            let year = book
                .published_year
                .map(|y| format!(" ({})", y))
                .unwrap_or_default();
            let title_line = Line::from(vec![Span::styled(
                format!("{}{}", book.title, year),
                base,
            )]);
            let authors = if book.authors.is_empty() {
                "(no author)".to_string()
            } else {
                book.author_names()
            };
            let author_line = Line::from(vec![Span::styled(
                authors,
                Style::default().fg(colors.dim),
            )]);
            ListItem::new(vec![title_line, author_line])
        })
        .collect();

    let border_style = if is_active {
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.dim)
    };

    let title = if app.filter_text.is_empty() {
        format!(" Books ({}) ", app.books.len())
    } else {
        format!(
            " Books ({}/{}) ",
            app.books.len(),
            session.books().len()
        )
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.books.is_empty() {
        state.select(Some(app.list_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail_pane(frame: &mut Frame, app: &App, session: &Session, colors: &Palette, area: Rect) {
    let is_active = app.active_pane == ActivePane::Detail;

    let border_style = if is_active {
        Style::default()
            .fg(colors.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.dim)
    };

    let block = Block::default()
        .title(" Detail ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let label = Style::default()
        .fg(colors.accent)
        .add_modifier(Modifier::BOLD);
    let value = Style::default().fg(colors.text).add_modifier(emphasis(session));

    let content = if let Some(book) = app.current_book() {
        let mut lines = vec![Line::from(vec![
            Span::styled("Title:     ", label),
            Span::styled(book.title.clone(), value),
        ])];

        let push_field = |lines: &mut Vec<Line>, name: &'static str, text: String| {
            if spaced(session) {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(vec![
                Span::styled(name, label),
                Span::styled(text, value),
            ]));
        };

        let authors = if book.authors.is_empty() {
            "-".to_string()
        } else {
            book.author_names()
        };
        push_field(&mut lines, "Authors:   ", authors);
        push_field(
            &mut lines,
            "Published: ",
            book.published_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
        push_field(
            &mut lines,
            "ISBN:      ",
            book.isbn.clone().unwrap_or_else(|| "-".to_string()),
        );

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            book.description
                .clone()
                .unwrap_or_else(|| "(no description)".to_string()),
            value,
        )]));

        lines.push(Line::from(""));
        lines.push(Line::from(vec![Span::styled(
            format!(
                "Created {} · Updated {}",
                book.created_at.format("%Y-%m-%d"),
                book.updated_at.format("%Y-%m-%d")
            ),
            Style::default().fg(colors.dim),
        )]));

        lines
    } else {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "No book selected.",
                Style::default().fg(colors.dim),
            )),
        ]
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let line = if let Some(ref message) = app.status_message {
        Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(colors.warning),
        ))
    } else {
        Line::from(Span::styled(
            " a add · A author · e edit · d delete · / filter · t theme · f font · r refresh · x logout · ? help · q quit",
            Style::default().add_modifier(Modifier::DIM),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_command_input(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let prompt = match app.command_type {
        Some(CommandType::AddBook) => "New book title: ",
        Some(CommandType::AddAuthor) => "New author name: ",
        None => ": ",
    };

    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(colors.accent)),
        Span::raw(app.command_input.as_str()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let x = area.x + prompt.chars().count() as u16 + app.command_cursor as u16;
    frame.set_cursor_position((x, area.y));
}

fn draw_filter_input(frame: &mut Frame, app: &App, colors: &Palette, area: Rect) {
    let line = Line::from(vec![
        Span::styled("/", Style::default().fg(colors.accent)),
        Span::raw(app.filter_text.as_str()),
        Span::styled(
            "  (Enter keep · Esc clear)",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let x = area.x + 1 + app.filter_text.chars().count() as u16;
    frame.set_cursor_position((x, area.y));
}

fn draw_help_overlay(frame: &mut Frame, colors: &Palette) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from("  j/k or ↑/↓   Move selection"),
        Line::from("  Tab or h/l   Switch pane"),
        Line::from("  g/G          First / last book"),
        Line::from(""),
        Line::from("  a            Add book (quick, title only)"),
        Line::from("  A            Add author"),
        Line::from("  e            Edit selected book in $EDITOR"),
        Line::from("  d            Delete selected book"),
        Line::from("  /            Filter by title, author, or ISBN"),
        Line::from("  r            Refresh from server"),
        Line::from(""),
        Line::from("  t            Cycle theme"),
        Line::from("  f            Cycle font scale"),
        Line::from(""),
        Line::from("  x            Log out"),
        Line::from("  q            Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "  Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent)),
    );
    frame.render_widget(help, area);
}

fn draw_error_modal(frame: &mut Frame, message: &str, colors: &Palette) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to dismiss",
            Style::default().fg(colors.dim),
        )),
    ])
    .block(
        Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    frame.render_widget(content, area);
}

/// Carve a centered overlay out of the full frame
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
