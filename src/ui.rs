use crate::{
    app::{App, DialogChoice, Intent, Mode},
    config::{
        APP_NAME, APP_VERSION, FOOTER, INSTRUCTIONS, LEFT_PAD, MAX_LABEL_WIDTH, MENU_WIDTH,
        VISIBLE_ROWS,
    },
};
use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::io;

const BOX_HEIGHT: u16 = VISIBLE_ROWS as u16 + 2;
// header, two instruction lines, the box, footer, quit prompt, margins
const MIN_HEIGHT: u16 = BOX_HEIGHT + 8;

#[derive(Clone)]
struct Theme {
    accent: Color,
    border: Color,
    text: Color,
    muted: Color,
    warning: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    selected_fg: Color,
    selected_bg: Color,
}

impl Theme {
    fn new() -> Self {
        Self {
            accent: Color::Rgb(235, 100, 95),
            border: Color::Rgb(65, 75, 90),
            text: Color::Rgb(220, 230, 240),
            muted: Color::Rgb(135, 145, 155),
            warning: Color::Rgb(230, 200, 120),
            highlight_fg: Color::Rgb(22, 28, 36),
            highlight_bg: Color::Rgb(220, 230, 240),
            selected_fg: Color::Rgb(22, 28, 36),
            selected_bg: Color::Rgb(120, 220, 140),
        }
    }
}

pub fn run(app: &mut App) -> Result<()> {
    let (width, height) = size().context("query terminal size")?;
    ensure_fits(width, height)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn ensure_fits(width: u16, height: u16) -> Result<()> {
    if width < MENU_WIDTH {
        bail!(
            "terminal window too narrow to display the module menu \
             (need {MENU_WIDTH} columns, have {width}); make the window larger"
        );
    }
    if height < MIN_HEIGHT {
        bail!(
            "terminal window too short to display the module menu \
             (need {MIN_HEIGHT} rows, have {height}); make the window larger"
        );
    }
    Ok(())
}

fn run_loop(terminal: &mut Terminal<impl Backend>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| draw(frame, app))?;

        if app.should_quit {
            break;
        }

        match event::read()? {
            Event::Key(key) => handle_key(app, key),
            Event::Resize(width, height) => ensure_fits(width, height)?,
            _ => {}
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if app.dialog.is_some() {
        handle_dialog_key(app, key);
        return;
    }

    let intent = match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Intent::CursorUp,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Intent::CursorDown,
        KeyCode::Right => Intent::Select,
        KeyCode::Left | KeyCode::Enter => Intent::CommitPosition,
        KeyCode::Char(' ') => Intent::ToggleActive,
        KeyCode::PageUp => Intent::PageUp,
        KeyCode::PageDown => Intent::PageDown,
        KeyCode::Home => Intent::JumpHome,
        KeyCode::End => Intent::JumpEnd,
        KeyCode::Char('q') | KeyCode::Char('Q') => Intent::Quit,
        _ => return,
    };
    app.apply(intent);
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.dialog_resolve(DialogChoice::Yes),
        KeyCode::Char('n') | KeyCode::Char('N') => app.dialog_resolve(DialogChoice::No),
        KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Esc => {
            app.dialog_resolve(DialogChoice::Cancel)
        }
        _ => {}
    }
}

fn draw(frame: &mut Frame<'_>, app: &App) {
    let theme = Theme::new();
    let area = frame.size();

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title(Span::styled(
            format!(" {APP_NAME} v{APP_VERSION} "),
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    frame.render_widget(outer, area);

    let menu = centered_menu(area);

    let instr_y = menu.y.saturating_sub(INSTRUCTIONS.len() as u16 + 1);
    for (row, line) in INSTRUCTIONS.iter().enumerate() {
        centered_line(
            frame,
            area,
            instr_y + row as u16,
            line,
            Style::default().fg(theme.text),
        );
    }

    let menu_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border));
    let inner = menu_block.inner(menu);
    frame.render_widget(menu_block, menu);
    frame.render_widget(module_lines(app, &theme), inner);

    let footer_y = menu.y + menu.height + 1;
    centered_line(
        frame,
        area,
        footer_y,
        FOOTER,
        Style::default().fg(theme.muted),
    );

    if !app.status.is_empty() {
        centered_line(
            frame,
            area,
            footer_y + 1,
            &app.status,
            Style::default().fg(theme.muted),
        );
    }

    if let Some(dialog) = &app.dialog {
        let prompt_area = Rect::new(area.x + 1, footer_y + 2, area.width.saturating_sub(2), 1);
        frame.render_widget(Clear, prompt_area);
        let prompt = Paragraph::new(Line::from(Span::styled(
            dialog.prompt.clone(),
            Style::default()
                .fg(theme.warning)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(prompt, prompt_area);
    }
}

fn module_lines<'a>(app: &'a App, theme: &Theme) -> Paragraph<'a> {
    let mut lines = Vec::with_capacity(app.viewport.rows());
    for row in 0..app.viewport.rows() {
        let index = app.viewport.offset() + row;
        let Some(module) = app.modules.get(index) else {
            break;
        };
        let label = format!(
            "{:pad$}{}",
            "",
            module.display_label(MAX_LABEL_WIDTH),
            pad = LEFT_PAD
        );
        let style = if index == app.position {
            match app.mode {
                Mode::Dragging => Style::default()
                    .fg(theme.selected_fg)
                    .bg(theme.selected_bg),
                Mode::Browsing => Style::default()
                    .fg(theme.highlight_fg)
                    .bg(theme.highlight_bg),
            }
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(Span::styled(label, style)));
    }
    Paragraph::new(lines)
}

fn centered_menu(area: Rect) -> Rect {
    let width = MENU_WIDTH.min(area.width);
    let height = BOX_HEIGHT.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn centered_line(frame: &mut Frame<'_>, area: Rect, y: u16, text: &str, style: Style) {
    if y >= area.y + area.height {
        return;
    }
    let line_area = Rect::new(area.x + 1, y, area.width.saturating_sub(2), 1);
    let widget = Paragraph::new(Line::from(Span::styled(text.to_string(), style)))
        .alignment(Alignment::Center);
    frame.render_widget(widget, line_area);
}
