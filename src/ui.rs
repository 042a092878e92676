//! UI rendering helpers for the terminal user interface.
//!
//! Rendering is a pure function of the player's `View`. `draw` hands back the
//! seek track area so the event loop can map mouse columns onto it.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::config::{ControlsSettings, UiSettings};
use crate::playback::{Phase, View};
use crate::seek::TrackRect;

static CONTROLS_MAP: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    map.insert("space/p".to_string(), "play/pause".to_string());
    // h/l is filled dynamically from config.
    map.insert("m".to_string(), "mute".to_string());
    map.insert("o".to_string(), "open file".to_string());
    map.insert("mouse".to_string(), "drag the bar to seek".to_string());
    map.insert("q".to_string(), "quit".to_string());
    map
});

/// Render the controls help text, incorporating the seek step.
fn controls_text(seek_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = ["space/p", "h/l", "m", "o", "mouse", "q"];
    order
        .iter()
        .filter_map(|k| {
            if *k == "h/l" {
                Some(format!("[h/l] seek -/+{}s", seek_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Map a seek bar area onto pointer coordinates.
///
/// The first cell is 0% and the last cell is 100%, so the usable width is
/// one less than the cell count.
pub fn track_rect(area: Rect) -> TrackRect {
    TrackRect {
        left: area.x as f64,
        width: area.width.saturating_sub(1).max(1) as f64,
    }
}

/// Whether a mouse cell falls on the seek bar.
pub fn hits(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Column of the thumb within a bar `width` cells wide.
fn thumb_column(percent: f64, width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let last = (width - 1) as f64;
    ((percent.clamp(0.0, 100.0) / 100.0) * last).round() as u16
}

/// The bar itself: played part, thumb, remaining part.
fn bar_text(percent: f64, width: u16) -> String {
    let thumb = thumb_column(percent, width);
    (0..width)
        .map(|i| match i.cmp(&thumb) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        })
        .collect()
}

fn transport_line(view: &View, seek_seconds: u64) -> Line<'static> {
    let center = if view.phase.is_playing() {
        Span::styled("  ⏸ pause  ", Style::default().add_modifier(Modifier::BOLD))
    } else {
        match view.phase {
            Phase::Loading => Span::styled("  … loading  ", Style::default().add_modifier(Modifier::ITALIC)),
            Phase::Idle => Span::styled("  ▶ play  ", Style::default().add_modifier(Modifier::DIM)),
            _ => Span::styled("  ▶ play  ", Style::default().add_modifier(Modifier::BOLD)),
        }
    };
    Line::from(vec![
        Span::raw(format!("« {}s", seek_seconds)),
        center,
        Span::raw(format!("{}s »", seek_seconds)),
    ])
}

fn status_text(view: &View, status: Option<&str>) -> Vec<Span<'static>> {
    let mut parts: Vec<Span<'static>> = Vec::new();

    parts.push(Span::raw(format!(" {}", view.phase.label())));
    if let Some(ref title) = view.title {
        parts.push(Span::raw(format!(" • {}", title)));
    }
    if view.is_muted {
        parts.push(Span::raw(" • MUTED"));
    }
    if let Some(ref err) = view.error {
        parts.push(Span::styled(format!(" • {}", err), Style::default().fg(Color::Red)));
    }
    if let Some(msg) = status {
        parts.push(Span::raw(format!(" • {}", msg)));
    }
    parts
}

/// Render the entire UI and return the seek bar area.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    prompt: Option<&str>,
    status: Option<&str>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" scrubber ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Transport controls
    let transport = Paragraph::new(transport_line(view, controls_settings.seek_seconds))
        .alignment(Alignment::Center)
        .block(Block::bordered());
    frame.render_widget(transport, chunks[1]);

    // Seek bar: position | track | duration
    let seek_block = Block::bordered().padding(Padding::horizontal(1));
    let seek_inner = seek_block.inner(chunks[2]);
    frame.render_widget(seek_block, chunks[2]);

    let right_label = if ui_settings.show_percent {
        format!("{} {:>3.0}%", view.duration_text, view.indicator_percent)
    } else {
        view.duration_text.clone()
    };
    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(view.position_text.chars().count() as u16 + 1),
            Constraint::Min(1),
            Constraint::Length(right_label.chars().count() as u16 + 1),
        ])
        .split(seek_inner);

    frame.render_widget(Paragraph::new(view.position_text.as_str()), row[0]);
    let bar_area = row[1];
    let bar_style = if view.phase == Phase::Dragging {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    frame.render_widget(
        Paragraph::new(bar_text(view.indicator_percent, bar_area.width)).style(bar_style),
        bar_area,
    );
    frame.render_widget(
        Paragraph::new(right_label).alignment(Alignment::Right),
        row[2],
    );

    // Status line, or the open-file prompt while typing.
    let status_par = match prompt {
        Some(input) => Paragraph::new(format!(" open: {}_", input))
            .block(Block::bordered().title(" open file (enter/esc) ")),
        None => Paragraph::new(Line::from(status_text(view, status)))
            .block(Block::bordered().title(" status ")),
    };
    frame.render_widget(status_par.wrap(Wrap { trim: true }), chunks[3]);

    let footer = Paragraph::new(controls_text(controls_settings.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true })
        .dim();
    frame.render_widget(footer, chunks[5]);

    bar_area
}
