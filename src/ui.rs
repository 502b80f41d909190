use tuirealm::ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{
    ActiveDialog, App, ConfirmDeleteField, ElementRole, Focus, InteractionLayer, Message, RowMode,
    TextInput,
};
use crate::drag::RowBounds;
use crate::keybindings::{KeyAction, KeyContext};
use crate::theme::Theme;
use crate::types::{StatusFilter, Task};

const HANDLE: &str = "≡";
const EDIT_LABEL: &str = "[edit]";
const SAVE_LABEL: &str = "[save]";
const DELETE_LABEL: &str = "[del]";
const PLACEHOLDER: &str = "No tasks found.";
// Handle, gap, checkbox, gap.
const ROW_PREFIX_WIDTH: u16 = 6;
// Gap, edit/save button, gap, delete button, gap.
const ROW_SUFFIX_WIDTH: u16 = 14;

pub fn render(frame: &mut Frame<'_>, app: &mut App) {
    app.interaction_map.clear();
    app.row_bounds.clear();

    let area = frame.area();
    app.viewport = (area.width, area.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], app);
    render_new_task(frame, chunks[1], app);
    render_filter_bar(frame, chunks[2], app);
    render_task_list(frame, chunks[3], app);
    render_footer(frame, chunks[4], app);

    if app.active_dialog.is_open() {
        render_dialog(frame, app);
    }

    app.note_frame_rendered();
}

fn render_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let theme = app.theme;
    let title = Span::styled(
        " tasklist ",
        Style::default()
            .fg(theme.base.header)
            .add_modifier(Modifier::BOLD),
    );
    let counts = format!(
        " {} tasks, {} done ",
        app.store.len(),
        app.completed_count()
    );

    frame.render_widget(Paragraph::new(Line::from(title)), area);
    frame.render_widget(
        Paragraph::new(counts)
            .alignment(Alignment::Right)
            .style(Style::default().fg(theme.base.text_muted)),
        area,
    );
}

fn render_new_task(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(9)])
        .split(area);

    let focused = app.focus == Focus::NewTask;
    let show_cursor = !app.active_dialog.is_open();
    render_text_input(
        frame,
        chunks[0],
        "New task",
        &app.new_task_input,
        focused,
        show_cursor,
        &app.theme,
    );
    render_button(frame, chunks[1], "Add", &app.theme);

    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::TextInput,
        chunks[0],
        Message::Focus(Focus::NewTask),
    );
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::Button,
        chunks[1],
        Message::SubmitNewTask,
    );
}

fn render_filter_bar(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let theme = app.theme;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(35), Constraint::Min(10)])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.interactive.border))
        .title(" Filter ");
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    let mut x = inner.x;
    for filter in StatusFilter::ALL {
        let label = format!(" {} ", filter.label());
        let width = (label.chars().count() as u16).min(inner.right().saturating_sub(x));
        if width == 0 || inner.height == 0 {
            break;
        }
        let rect = Rect::new(x, inner.y, width, 1);
        let style = if filter == app.filter {
            Style::default()
                .bg(theme.base.accent)
                .fg(theme.dialog.button_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.base.text)
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
        app.interaction_map.register(
            InteractionLayer::Base,
            ElementRole::FilterButton,
            rect,
            Message::SetFilter(filter),
        );
        x = x.saturating_add(width + 1);
    }

    let focused = app.focus == Focus::Search;
    let show_cursor = !app.active_dialog.is_open();
    render_text_input(
        frame,
        chunks[1],
        "Search",
        &app.search,
        focused,
        show_cursor,
        &theme,
    );
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::TextInput,
        chunks[1],
        Message::Focus(Focus::Search),
    );
}

fn render_task_list(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let theme = app.theme;
    let tasks: Vec<Task> = app.display_tasks().into_iter().cloned().collect();
    let focused = matches!(app.focus, Focus::List | Focus::EditInput);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Double
        } else {
            BorderType::Plain
        })
        .border_style(Style::default().fg(theme.border_color(focused)))
        .title(format!(
            " Tasks: {} ({}/{}) ",
            app.filter.label(),
            tasks.len(),
            app.store.len()
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tasks.is_empty() {
        frame.render_widget(
            Paragraph::new(PLACEHOLDER)
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.base.text_muted)),
            inner,
        );
        return;
    }

    let height = usize::from(inner.height);
    if height == 0 {
        return;
    }
    if app.drag.is_idle() {
        if app.selected_index < app.scroll_offset {
            app.scroll_offset = app.selected_index;
        } else if app.selected_index >= app.scroll_offset + height {
            app.scroll_offset = app.selected_index + 1 - height;
        }
    }
    app.scroll_offset = app.scroll_offset.min(tasks.len().saturating_sub(height));

    let scroll_offset = app.scroll_offset;
    for (index, task) in tasks.iter().enumerate().skip(scroll_offset).take(height) {
        let y = inner.y + (index - scroll_offset) as u16;
        let row = Rect::new(inner.x, y, inner.width, 1);
        let selected = app.drag.is_idle() && index == app.selected_index;
        render_task_row(frame, row, app, task, selected);
    }
}

fn render_task_row(frame: &mut Frame<'_>, row: Rect, app: &mut App, task: &Task, selected: bool) {
    let theme = app.theme;
    let mode = app.row_mode(task.id);

    let row_style = if app.drag.marked_id() == Some(task.id) {
        Style::default().bg(theme.task.dragging_bg)
    } else if selected {
        Style::default().bg(theme.interactive.selected_bg)
    } else {
        Style::default()
    };
    frame.render_widget(Block::default().style(row_style), row);
    app.row_bounds
        .push(RowBounds::new(task.id, row.y, row.height));
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::TaskRow,
        row,
        Message::SelectTask(task.id),
    );

    let handle = Rect::new(row.x, row.y, 1.min(row.width), 1);
    frame.render_widget(
        Paragraph::new(HANDLE).style(Style::default().fg(theme.task.handle)),
        handle,
    );

    let checkbox = clip(Rect::new(row.x + 2, row.y, 3, 1), row);
    let (mark, mark_color) = if task.done {
        ("[x]", theme.task.done)
    } else {
        ("[ ]", theme.task.pending)
    };
    frame.render_widget(
        Paragraph::new(mark).style(Style::default().fg(mark_color)),
        checkbox,
    );
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::Checkbox,
        checkbox,
        Message::ToggleTask(task.id),
    );

    let title_width = row
        .width
        .saturating_sub(ROW_PREFIX_WIDTH + ROW_SUFFIX_WIDTH);
    let title_area = clip(
        Rect::new(row.x + ROW_PREFIX_WIDTH, row.y, title_width, 1),
        row,
    );

    match (mode, app.editing.as_ref()) {
        (RowMode::Editing, Some(edit)) => {
            let (visible, cursor_x) = visible_input(&edit.input, title_area.width);
            frame.render_widget(
                Paragraph::new(visible).style(
                    Style::default()
                        .bg(theme.dialog.input_bg)
                        .fg(theme.base.text),
                ),
                title_area,
            );
            if app.focus == Focus::EditInput
                && !app.active_dialog.is_open()
                && title_area.width > 0
            {
                frame.set_cursor_position((title_area.x + cursor_x, title_area.y));
            }
            app.interaction_map.register(
                InteractionLayer::Base,
                ElementRole::TextInput,
                title_area,
                Message::Focus(Focus::EditInput),
            );
        }
        _ => {
            let style = if task.done {
                Style::default()
                    .fg(theme.task.done)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(theme.base.text)
            };
            frame.render_widget(
                Paragraph::new(task.title.as_str()).style(style),
                title_area,
            );
        }
    }

    if row.width < ROW_PREFIX_WIDTH + ROW_SUFFIX_WIDTH {
        return;
    }

    let button_x = row.x + row.width - ROW_SUFFIX_WIDTH + 1;
    let edit_button = Rect::new(button_x, row.y, 6, 1);
    let delete_button = Rect::new(button_x + 7, row.y, 5, 1);
    let (edit_label, edit_message) = match mode {
        RowMode::Editing => (SAVE_LABEL, Message::CommitEdit),
        RowMode::Viewing => (EDIT_LABEL, Message::StartEdit(task.id)),
    };

    frame.render_widget(
        Paragraph::new(edit_label).style(Style::default().fg(theme.base.accent)),
        edit_button,
    );
    frame.render_widget(
        Paragraph::new(DELETE_LABEL).style(Style::default().fg(theme.base.danger)),
        delete_button,
    );
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::Button,
        edit_button,
        edit_message,
    );
    app.interaction_map.register(
        InteractionLayer::Base,
        ElementRole::Button,
        delete_button,
        Message::RequestDelete(task.id),
    );
}

fn render_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let text = match app.footer_notice.as_deref() {
        Some(notice) => format!(" {notice} "),
        None => footer_hints(app),
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(app.theme.base.text_muted)),
        area,
    );
}

fn footer_hints(app: &App) -> String {
    let hints = [
        (KeyAction::FocusNewTask, "add"),
        (KeyAction::FocusSearch, "search"),
        (KeyAction::ToggleDone, "toggle"),
        (KeyAction::EditTask, "edit"),
        (KeyAction::DeleteTask, "delete"),
        (KeyAction::CycleFilter, "filter"),
        (KeyAction::ToggleHelp, "help"),
        (KeyAction::Quit, "quit"),
    ];
    let mut line = String::from(" ");
    for (action, label) in hints {
        if let Some(keys) = app.keybindings.display_for(KeyContext::List, action) {
            line.push_str(&format!("{keys}: {label}  "));
        }
    }
    line
}

fn render_dialog(frame: &mut Frame<'_>, app: &mut App) {
    match app.active_dialog.clone() {
        ActiveDialog::None => {}
        ActiveDialog::Notice(state) => render_modal(
            frame,
            app,
            &state.title,
            vec![state.message],
            &[("OK", Message::DismissDialog, true)],
        ),
        ActiveDialog::ConfirmDelete(state) => render_modal(
            frame,
            app,
            "Delete task",
            vec![format!("Delete \"{}\"?", state.title)],
            &[
                (
                    "Delete",
                    Message::ConfirmDelete,
                    state.focused_field == ConfirmDeleteField::Delete,
                ),
                (
                    "Cancel",
                    Message::DismissDialog,
                    state.focused_field == ConfirmDeleteField::Cancel,
                ),
            ],
        ),
        ActiveDialog::Help => {
            let lines = app.keybindings.help_lines();
            render_modal(
                frame,
                app,
                "Help",
                lines,
                &[("Close", Message::DismissDialog, true)],
            );
        }
    }
}

fn render_modal(
    frame: &mut Frame<'_>,
    app: &mut App,
    title: &str,
    lines: Vec<String>,
    buttons: &[(&str, Message, bool)],
) {
    let theme = app.theme;
    let screen = frame.area();
    let width = screen.width.saturating_sub(4).min(64);
    let text_width = usize::from(width.saturating_sub(2)).max(1);
    let text_rows: usize = lines
        .iter()
        .map(|line| line.chars().count().max(1).div_ceil(text_width))
        .sum();
    let height = u16::try_from(text_rows)
        .unwrap_or(u16::MAX)
        .saturating_add(4)
        .min(screen.height);
    let area = centered_area(screen, width, height);

    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(theme.interactive.focus))
        .title(format!(" {title} "))
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(theme.dialog.surface));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(theme.base.text))
            .wrap(Wrap { trim: false }),
        chunks[0],
    );

    let labels: Vec<String> = buttons
        .iter()
        .map(|(label, _, _)| format!("[ {label} ]"))
        .collect();
    let total: u16 = labels
        .iter()
        .map(|label| label.chars().count() as u16 + 2)
        .sum();
    let button_row = chunks[2];
    let mut x = button_row.x + button_row.width.saturating_sub(total) / 2;

    for (label, (_, message, focused)) in labels.iter().zip(buttons) {
        let width = (label.chars().count() as u16).min(button_row.right().saturating_sub(x));
        if width == 0 {
            break;
        }
        let rect = Rect::new(x, button_row.y, width, 1);
        let style = if *focused {
            Style::default()
                .bg(theme.dialog.button_bg)
                .fg(theme.dialog.button_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.base.text)
        };
        frame.render_widget(Paragraph::new(label.as_str()).style(style), rect);
        app.interaction_map.register(
            InteractionLayer::Dialog,
            ElementRole::DialogButton,
            rect,
            message.clone(),
        );
        x = x.saturating_add(width + 2);
    }
}

fn render_text_input(
    frame: &mut Frame<'_>,
    area: Rect,
    title: &str,
    input: &TextInput,
    focused: bool,
    show_cursor: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_color(focused)))
        .title(format!(" {title} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (visible, cursor_x) = visible_input(input, inner.width);
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(theme.base.text)),
        inner,
    );
    if focused && show_cursor && inner.width > 0 && inner.height > 0 {
        frame.set_cursor_position((inner.x + cursor_x, inner.y));
    }
}

fn render_button(frame: &mut Frame<'_>, area: Rect, label: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.interactive.border))
        .style(Style::default().fg(theme.base.accent));
    frame.render_widget(
        Paragraph::new(label)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

/// Slice of the input that fits `width` cells with the cursor kept visible,
/// plus the cursor column within that slice. Wide characters take two cells.
fn visible_input(input: &TextInput, width: u16) -> (String, u16) {
    let width = usize::from(width.max(1));
    let chars: Vec<char> = input.value().chars().collect();
    let cursor = input.cursor().min(chars.len());
    let cells = |ch: char| ch.width().unwrap_or(0);

    // The cursor itself needs one free cell.
    let mut start = cursor;
    let mut before = 0;
    while start > 0 {
        let cell = cells(chars[start - 1]);
        if before + cell + 1 > width {
            break;
        }
        before += cell;
        start -= 1;
    }

    let mut used = 0;
    let visible = chars[start..]
        .iter()
        .take_while(|ch| {
            used += cells(**ch);
            used <= width
        })
        .collect();
    (visible, u16::try_from(before).unwrap_or(u16::MAX))
}

fn clip(rect: Rect, bounds: Rect) -> Rect {
    rect.intersection(bounds)
}

fn centered_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
