//! UI rendering helpers for the terminal user interface.
//!
//! Two screens share one frame layout: a header, the screen body, a
//! status line and a controls footer. Load failures float above both.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, DetailView, RowState, Screen};
use crate::config::UiSettings;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("enter/space", "play/pause");
    map.insert("o", "open");
    map.insert("esc", "back");
    map.insert("x", "stop");
    map.insert("/", "filter");
    map.insert("q", "quit");
    map
});

/// Render the controls help text for the screen in front.
fn controls_text(screen: Screen) -> String {
    let order: &[&str] = match screen {
        Screen::List => &["j/k", "enter/space", "o", "x", "/", "q"],
        Screen::Detail(_) => &["enter/space", "esc", "x", "q"],
    };
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(k).map(|v| format!("[{k}] {v}")))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn marker(state: RowState) -> &'static str {
    match state {
        RowState::Idle => "  ",
        RowState::Loading => "… ",
        RowState::Playing => "▶ ",
        RowState::Paused => "⏸ ",
    }
}

fn state_label(state: RowState) -> &'static str {
    match state {
        RowState::Idle => "Stopped",
        RowState::Loading => "Loading",
        RowState::Playing => "Playing",
        RowState::Paused => "Paused",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

/// Popup width for `message` plus borders and margin; saturates on huge input.
fn notice_width(message: &str) -> u16 {
    u16::try_from(message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(6)
}

fn left_pad() -> Padding {
    Padding {
        left: 1,
        right: 0,
        top: 0,
        bottom: 0,
    }
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" soothe ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.detail() {
        Some(view) => draw_detail(frame, &view, chunks[1]),
        None => draw_list(frame, app, chunks[1]),
    }

    draw_status(frame, app, chunks[2]);

    let footer = Paragraph::new(controls_text(app.screen))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(left_pad()),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);

    if let Some(notice) = &app.notice {
        let popup = centered_rect_sized(notice_width(&notice.message), 3, chunks[1]);
        frame.render_widget(Clear, popup);
        let body = Paragraph::new(notice.message.as_str())
            .alignment(Alignment::Center)
            .red()
            .block(Block::default().borders(Borders::ALL).title(" playback "));
        frame.render_widget(body, popup);
    }
}

fn draw_list(frame: &mut Frame, app: &App, area: Rect) {
    let display = app.display_indices();

    // Only build items for the visible window, keeping the selection centered.
    let total = display.len();
    let height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end) = if total <= height || height == 0 {
        (0, total)
    } else {
        let start = sel_pos.saturating_sub(height / 2).min(total - height);
        (start, start + height)
    };

    let items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let track = &app.tracks[i];
            ListItem::new(format!(
                "{}{}  · {} · {}",
                marker(app.row_state(i)),
                track.title,
                track.mood,
                track.duration_label
            ))
        })
        .collect();

    let title = if app.has_tracks() {
        " today "
    } else {
        " no themes today "
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(sel_pos - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame, view: &DetailView<'_>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", view.track.title))
        .padding(left_pad());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let heading = Paragraph::new(vec![
        Line::from(view.track.mood.as_str()).italic(),
        Line::from(state_label(view.state)).bold(),
    ]);
    frame.render_widget(heading, rows[0]);

    let gauge = Gauge::default()
        .ratio(view.progress.ratio.clamp(0.0, 1.0))
        .label("")
        .gauge_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(gauge, rows[2]);

    let times = Paragraph::new(format!(
        "{} / {}",
        view.progress.elapsed, view.progress.total
    ))
    .alignment(Alignment::Right);
    frame.render_widget(times, rows[3]);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut parts: Vec<String> = Vec::new();

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        let mut filter_part = String::from("FILTER:");
        if !q.is_empty() {
            filter_part.push(' ');
            filter_part.push_str(q);
        }
        parts.push(filter_part);
    }

    match app.now_playing() {
        Some(track) => {
            let state = app
                .tracks
                .iter()
                .position(|t| t.id == track.id)
                .map_or(RowState::Idle, |i| app.row_state(i));
            parts.push(format!("{}: {}", state_label(state), track.title));
        }
        None => parts.push("Stopped".to_string()),
    }

    let status = Paragraph::new(parts.join(" • ")).block(
        Block::bordered()
            .padding(left_pad())
            .title(" status "),
    );
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notice_width_saturates_instead_of_wrapping() {
        assert_eq!(notice_width("hello"), 11);
        assert_eq!(notice_width(&"x".repeat(70_000)), u16::MAX);
        assert_eq!(notice_width(&"x".repeat(65_533)), u16::MAX);
    }

    #[test]
    fn oversized_popup_stays_inside_its_area() {
        let area = Rect::new(0, 3, 80, 20);
        let popup = centered_rect_sized(notice_width(&"x".repeat(70_000)), 3, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 78);
    }
}
