//! Rendering for the todo TUI

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use todo_core::{Todo, ViewMode};

use crate::app::{App, Focus};

const PLACEHOLDER: &str = "What needs to be done?";
const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 5;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn done() -> Style {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    }

    pub fn editing() -> Style {
        Style::default().fg(Color::Yellow)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn border(active: bool) -> Style {
        if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    draw_header(f, app, chunks[0]);
    draw_input(f, app, chunks[1]);

    if app.controller.is_loading() {
        draw_loading(f, chunks[2]);
    } else if app.controller.todos().is_empty() {
        draw_empty(f, chunks[2]);
    } else {
        match app.view_mode() {
            ViewMode::List => draw_list(f, app, chunks[2]),
            ViewMode::Cards => draw_cards(f, app, chunks[2]),
        }
    }

    draw_status_bar(f, app, chunks[3]);

    if app.controller.pending_delete().is_some() {
        draw_delete_popup(f, f.size());
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let selected = match app.view_mode() {
        ViewMode::List => 0,
        ViewMode::Cards => 1,
    };
    let tabs = Tabs::new(vec!["List", "Cards"])
        .select(selected)
        .style(Styles::inactive())
        .highlight_style(Styles::title())
        .divider("|")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Tasks: manage your daily tasks and stay organized "),
        );
    f.render_widget(tabs, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let active = app.focus == Focus::Input
        && app.controller.editing().is_none()
        && app.controller.pending_delete().is_none();
    let text = app.controller.new_title();
    let content = if text.is_empty() {
        Span::styled(PLACEHOLDER, Styles::inactive())
    } else {
        Span::raw(text)
    };
    let title = if app.controller.can_submit() {
        " Add Task (Enter) "
    } else {
        " Add Task "
    };
    let input = Paragraph::new(Line::from(content)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border(active))
            .title(title),
    );
    f.render_widget(input, area);

    if active {
        let offset = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(offset)
            .min(area.right().saturating_sub(2));
        f.set_cursor(x, area.y.saturating_add(1));
    }
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let loading = Paragraph::new("Loading tasks...")
        .alignment(Alignment::Center)
        .style(Styles::inactive())
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, area);
}

fn draw_empty(f: &mut Frame, area: Rect) {
    let empty = Paragraph::new(vec![
        Line::from("No tasks yet"),
        Line::from(Span::styled("Add a new task to get started", Styles::inactive())),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(empty, area);
}

/// Checkbox and title, or the edit buffer when `todo` is being edited.
fn todo_line<'a>(app: &'a App, todo: &'a Todo) -> Line<'a> {
    let checkbox = if todo.completed { "[x] " } else { "[ ] " };
    let title = match app.controller.editing() {
        Some(edit) if edit.id == todo.id => {
            Span::styled(format!("{}_", edit.buffer), Styles::editing())
        }
        _ if todo.completed => Span::styled(todo.title.as_str(), Styles::done()),
        _ => Span::raw(todo.title.as_str()),
    };
    Line::from(vec![Span::raw(checkbox), title])
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .controller
        .todos()
        .iter()
        .map(|todo| ListItem::new(todo_line(app, todo)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border(app.focus == Focus::List)),
        )
        .highlight_style(Styles::selected())
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if app.focus == Focus::List {
        state.select(Some(app.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_cards(f: &mut Frame, app: &App, area: Rect) {
    let todos = app.controller.todos();
    let columns = (area.width / CARD_WIDTH).max(1) as usize;
    let visible_rows = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected_row = app.selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
        .split(area);

    for (row_index, row_area) in rows.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row_area);

        for (col, cell) in cells.iter().enumerate() {
            let index = (first_row + row_index) * columns + col;
            let Some(todo) = todos.get(index) else {
                return;
            };
            let selected = app.focus == Focus::List && index == app.selected;
            draw_card(f, app, todo, selected, *cell);
        }
    }
}

fn draw_card(f: &mut Frame, app: &App, todo: &Todo, selected: bool, area: Rect) {
    let mut lines = vec![todo_line(app, todo)];
    if let Some(created) = todo.created_at() {
        lines.push(Line::from(Span::styled(
            format!("Added {}", created.with_timezone(&Local).format("%Y-%m-%d")),
            Styles::inactive(),
        )));
    }
    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Styles::border(selected)),
        );
    f.render_widget(card, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hints = if app.controller.pending_delete().is_some() {
        "y/Enter: Delete | n/Esc: Cancel"
    } else if app.controller.editing().is_some() {
        "Enter: Save | Esc: Cancel"
    } else {
        match app.focus {
            Focus::Input => "Enter: Add | Tab: Tasks | Ctrl-C: Quit",
            Focus::List => {
                "Space: Toggle | e: Edit | d: Delete | v: View | r: Reload | Tab: Input | q: Quit"
            }
        }
    };
    let text = match app.in_flight() {
        0 => hints.to_string(),
        n => format!("{hints} | syncing {n}"),
    };
    let status = Paragraph::new(text)
        .style(Styles::inactive())
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, area);
}

fn draw_delete_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 30, area);
    f.render_widget(Clear, popup_area);

    let popup = Paragraph::new(vec![
        Line::from(Span::styled("Delete Task", Styles::title())),
        Line::from(""),
        Line::from("Are you sure you want to delete this task? This action cannot be undone."),
        Line::from(""),
        Line::from("[y] Delete   [n] Cancel"),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(popup, popup_area);
}

/// Helper function to create a centered rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
