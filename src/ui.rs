//! UI rendering module.
//!
//! Lays the frame out as a filter bar, the timeline chart, a log pane, and
//! a one-line status bar. All drawing state is derived from `App` each
//! frame; nothing is cached between draws.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, FilterField, InputMode, LogLevel};
use crate::theme::{colors, styles};
use crate::timeline::TimelineWidget;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg = Block::default().style(Style::default().bg(colors::BG_DARK));
    frame.render_widget(bg, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter bar
            Constraint::Min(10),   // Timeline chart
            Constraint::Length(6), // Log area
            Constraint::Length(1), // Status line
        ])
        .split(area);

    render_filter_bar(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
    render_logs(frame, app, chunks[2]);
    render_status(frame, app, chunks[3]);
}

/// The filter bar: a view-type selector and a free-text name filter,
/// submitted together with Enter while in filtering mode.
fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filtering = app.input_mode == InputMode::Filtering;

    let border_style = if filtering {
        styles::border_focused()
    } else {
        styles::border()
    };

    let field_style = |field: FilterField| {
        if filtering && app.filter.focused == field {
            styles::form_input_focused()
        } else {
            styles::form_input()
        }
    };

    let view_value = if filtering && app.filter.focused == FilterField::ViewType {
        format!("◂ {} ▸", app.filter.view_type)
    } else {
        format!("  {}  ", app.filter.view_type)
    };

    let name_value = if app.filter.name.is_empty() && !filtering {
        Span::styled("(none)", styles::text_hint())
    } else {
        Span::styled(app.filter.name.clone(), field_style(FilterField::Name))
    };

    let hint = if filtering {
        "  Tab: switch field | Enter: apply | Esc: cancel"
    } else {
        "  f: edit filters"
    };

    let line = Line::from(vec![
        Span::styled(" View: ", styles::form_label()),
        Span::styled(view_value, field_style(FilterField::ViewType)),
        Span::styled("  Name: ", styles::form_label()),
        name_value,
        Span::styled(hint, styles::text_hint()),
    ]);

    let bar = Paragraph::new(line).block(
        Block::default()
            .title(" Filters ")
            .title_style(styles::title())
            .borders(Borders::ALL)
            .border_style(border_style),
    );

    frame.render_widget(bar, area);
}

/// The chart pane. Draws the timeline when a plan is on screen, a
/// placeholder otherwise.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Release Plan Timeline ")
        .title_style(styles::title())
        .borders(Borders::ALL)
        .border_style(styles::border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &app.plan {
        Some(plan) => frame.render_widget(TimelineWidget::new(plan), inner),
        None => {
            let message = if app.is_loading {
                "Loading release plan..."
            } else {
                "No release plan loaded"
            };
            let placeholder = Paragraph::new(Line::from(Span::styled(message, styles::text_dim())));
            let centered = Rect::new(
                inner.x + 1,
                inner.y + inner.height / 2,
                inner.width.saturating_sub(2),
                1,
            );
            frame.render_widget(placeholder, centered);
        }
    }
}

/// The log pane: the most recent entries, colored by level.
fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|entry| {
            let style = match entry.level {
                LogLevel::Info => styles::text_dim(),
                LogLevel::Success => styles::success(),
                LogLevel::Warning => styles::warning(),
                LogLevel::Error => styles::error(),
            };
            let age = entry.timestamp.elapsed().as_secs();
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>3}s ", age), styles::text_hint()),
                Span::styled(entry.message.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Messages ")
            .title_style(styles::title())
            .borders(Borders::ALL)
            .border_style(styles::border()),
    );

    frame.render_widget(list, area);
}

/// One-line status bar: connection state, load state, key hints.
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.api_connected {
        styles::text_dim()
    } else {
        styles::warning()
    };
    let status = Paragraph::new(Line::from(Span::styled(app.status_text(), style)));
    frame.render_widget(status, area);
}
