//! Timeline widget for release-plan visualization.
//!
//! Rendering happens in two steps. `layout_timeline` is a pure function
//! that turns a plan plus the scale pair into validated bar geometry and a
//! list of per-item skip diagnostics; the widget then rasterizes that
//! layout into the buffer along with the two axes. The split keeps the
//! defensive date handling testable without a terminal.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::models::{Category, PlanItem, ReleasePlan};
use crate::scale::{build_scales, BandScale, TimeScale};
use crate::theme::{category_color, colors, styles};

/// Block characters for bar rendering.
const BLOCK_FULL: char = '█';
const BLOCK_LEFT: char = '▌';
const BLOCK_RIGHT: char = '▐';

/// Axis characters.
const AXIS_H: char = '─';
const AXIS_TICK: char = '┴';

/// Smallest viewport the widget will draw into.
const MIN_WIDTH: u16 = 20;
const MIN_HEIGHT: u16 = 5;

/// Rows reserved at the bottom for the time axis (line + labels).
const TIME_AXIS_ROWS: u16 = 2;

/// Chart-space rectangle for one bar. Construction validates every
/// component once; a bar that cannot produce finite geometry is
/// unrenderable as a whole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BarGeometry {
    /// Returns `None` unless every component is a finite number.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Option<Self> {
        [x, y, width, height]
            .iter()
            .all(|v| v.is_finite())
            .then_some(Self { x, y, width, height })
    }
}

/// Why an item was left out of the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A date field is absent or empty.
    MissingDate,
    /// A date field is present but does not parse to a valid calendar date.
    UnparseableDate,
    /// The item name is not in the band domain.
    UnknownRow,
    /// A computed coordinate was NaN or infinite.
    InvalidGeometry,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            SkipReason::MissingDate => "missing start or end date",
            SkipReason::UnparseableDate => "unparseable start or end date",
            SkipReason::UnknownRow => "name not present in the band domain",
            SkipReason::InvalidGeometry => "computed geometry is not finite",
        };
        f.write_str(msg)
    }
}

/// One renderable bar.
#[derive(Debug, Clone)]
pub struct Bar {
    pub name: String,
    pub category: Category,
    pub geometry: BarGeometry,
}

/// One item that failed validation, with the reason.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub name: String,
    pub category: Category,
    pub reason: SkipReason,
}

/// Result of laying out a plan against a scale pair.
#[derive(Debug, Clone, Default)]
pub struct TimelineLayout {
    pub bars: Vec<Bar>,
    pub skipped: Vec<SkippedItem>,
}

/// Lay out every item in lane order. Items that fail any validation step
/// are recorded and skipped individually; siblings are unaffected.
pub fn layout_timeline(
    plan: &ReleasePlan,
    time: &TimeScale,
    band: &BandScale,
) -> TimelineLayout {
    let mut layout = TimelineLayout::default();
    for &category in Category::all() {
        for item in plan.lane(category) {
            match layout_item(item, category, time, band) {
                Ok(bar) => layout.bars.push(bar),
                Err(reason) => {
                    let skipped = SkippedItem {
                        name: item.name.clone(),
                        category,
                        reason,
                    };
                    log::warn!(
                        "skipping {} {:?}: {}",
                        skipped.category,
                        skipped.name,
                        skipped.reason
                    );
                    layout.skipped.push(skipped);
                }
            }
        }
    }
    layout
}

fn layout_item(
    item: &PlanItem,
    category: Category,
    time: &TimeScale,
    band: &BandScale,
) -> Result<Bar, SkipReason> {
    if !item.has_complete_dates() {
        return Err(SkipReason::MissingDate);
    }
    let start = item.start_parsed().ok_or(SkipReason::UnparseableDate)?;
    let end = item.end_parsed().ok_or(SkipReason::UnparseableDate)?;

    let x = time.scale(start);
    let y = band.position(&item.name).ok_or(SkipReason::UnknownRow)?;
    let width = time.scale(end) - x;
    let geometry =
        BarGeometry::new(x, y, width, band.bandwidth()).ok_or(SkipReason::InvalidGeometry)?;

    Ok(Bar {
        name: item.name.clone(),
        category,
        geometry,
    })
}

/// Widget that draws a release plan as a timeline chart: a left band axis
/// labelled with item names, category-colored bars with inline labels, and
/// a bottom time axis. Scales and layout are rebuilt from the plan and the
/// viewport on every render pass; nothing is retained between frames.
pub struct TimelineWidget<'a> {
    plan: &'a ReleasePlan,
}

impl<'a> TimelineWidget<'a> {
    pub fn new(plan: &'a ReleasePlan) -> Self {
        Self { plan }
    }

    /// Width of the name gutter for this plan, bounded so the chart keeps
    /// most of the viewport.
    fn gutter_width(&self, area: Rect) -> u16 {
        let longest = self
            .plan
            .all_items()
            .map(|item| item.name.chars().count())
            .max()
            .unwrap_or(0) as u16;
        (longest + 2).clamp(8, 24).min(area.width / 3)
    }
}

impl Widget for TimelineWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Full clear-then-redraw: stale shapes from a previous payload must
        // never survive a render pass.
        for row in area.top()..area.bottom() {
            for col in area.left()..area.right() {
                buf[(col, row)].reset();
            }
        }
        buf.set_style(area, Style::default().bg(colors::BG_DARK).fg(colors::FG_PRIMARY));

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return;
        }

        let gutter = self.gutter_width(area);
        let chart = Rect::new(
            area.x + gutter,
            area.y,
            area.width - gutter,
            area.height - TIME_AXIS_ROWS,
        );

        let (time, band) =
            match build_scales(self.plan, chart.width as f64, chart.height as f64) {
                Ok(scales) => scales,
                Err(e) => {
                    // The app validates payloads before accepting them, so
                    // this is only reachable with no plan worth drawing.
                    buf.set_stringn(
                        area.x + 1,
                        area.y + area.height / 2,
                        e.to_string(),
                        area.width.saturating_sub(2) as usize,
                        styles::text_dim(),
                    );
                    return;
                }
            };

        let layout = layout_timeline(self.plan, &time, &band);

        render_band_axis(buf, area, gutter, chart, &band);
        for bar in &layout.bars {
            render_bar(buf, chart, bar);
        }
        for bar in &layout.bars {
            render_label(buf, chart, bar);
        }
        render_time_axis(buf, chart, &time);
    }
}

/// Left-anchored band axis: one tick label (the item name) at each band
/// center, right-aligned in the gutter.
fn render_band_axis(buf: &mut Buffer, area: Rect, gutter: u16, chart: Rect, band: &BandScale) {
    let label_width = gutter.saturating_sub(1) as usize;
    if label_width == 0 {
        return;
    }
    for (name, center) in band.centers() {
        let row = center.floor();
        if row < 0.0 || row >= chart.height as f64 {
            continue;
        }
        let row = chart.y + row as u16;

        let truncated: String = if name.chars().count() > label_width {
            let mut s: String = name.chars().take(label_width.saturating_sub(1)).collect();
            s.push('…');
            s
        } else {
            name.to_string()
        };
        let x = area.x + gutter.saturating_sub(1 + truncated.chars().count() as u16);
        buf.set_stringn(x, row, &truncated, label_width, styles::text_dim());
    }
}

/// Paint one bar as a run of block characters in its lane color. Partial
/// end cells use half blocks; a sub-cell bar still shows one cell.
fn render_bar(buf: &mut Buffer, chart: Rect, bar: &Bar) {
    let g = &bar.geometry;
    if g.width <= 0.0 {
        return;
    }

    let x0 = g.x.max(0.0);
    let x1 = (g.x + g.width).min(chart.width as f64);
    if x1 <= x0 {
        return;
    }
    let c0 = x0.round() as u16;
    let mut c1 = x1.round() as u16;
    if c1 <= c0 {
        c1 = c0 + 1;
    }
    let c1 = c1.min(chart.width);

    let y0 = g.y.max(0.0);
    let y1 = (g.y + g.height).min(chart.height as f64);
    if y1 <= y0 {
        return;
    }
    let r0 = y0.round() as u16;
    let mut r1 = y1.round() as u16;
    if r1 <= r0 {
        r1 = r0 + 1;
    }
    let r1 = r1.min(chart.height);

    let style = Style::default().fg(category_color(bar.category));
    for row in r0..r1 {
        for col in c0..c1 {
            let ch = if col == c0 && col + 1 < c1 {
                BLOCK_LEFT
            } else if col + 1 == c1 && col > c0 {
                BLOCK_RIGHT
            } else {
                BLOCK_FULL
            };
            let pos = (chart.x + col, chart.y + row);
            buf[pos].set_char(ch);
            buf[pos].set_style(style);
        }
    }
}

/// Item name just inside the bar's left edge, vertically centered. Cells
/// over the bar invert onto the lane color; overflow past the bar end
/// falls back to plain text, like the chart this replaces let labels
/// overhang their rectangles.
fn render_label(buf: &mut Buffer, chart: Rect, bar: &Bar) {
    let g = &bar.geometry;
    let row = g.y + g.height * 0.5;
    if row < 0.0 || row >= chart.height as f64 {
        return;
    }
    let row = chart.y + row.floor() as u16;

    let start_col = (g.x.max(0.0).round() as u16).saturating_add(1);
    let bar_end = (g.x + g.width.max(0.0)).round();

    let on_bar = Style::default()
        .fg(colors::BG_DARK)
        .bg(category_color(bar.category))
        .add_modifier(Modifier::BOLD);
    let off_bar = Style::default().fg(colors::FG_PRIMARY);

    for (i, ch) in bar.name.chars().enumerate() {
        let col = start_col + i as u16;
        if col >= chart.width {
            break;
        }
        let style = if (col as f64) < bar_end { on_bar } else { off_bar };
        buf[(chart.x + col, row)].set_char(ch);
        buf[(chart.x + col, row)].set_style(style);
    }
}

/// Bottom-anchored time axis: a rule across the chart with evenly spaced
/// ticks and date labels, spanning exactly the computed time domain.
fn render_time_axis(buf: &mut Buffer, chart: Rect, time: &TimeScale) {
    let line_row = chart.y + chart.height;
    let label_row = line_row + 1;

    for col in 0..chart.width {
        let pos = (chart.x + col, line_row);
        buf[pos].set_char(AXIS_H);
        buf[pos].set_style(Style::default().fg(colors::BORDER_DIM));
    }

    let tick_count = ((chart.width / 14).clamp(2, 8)) as usize;
    let format = if time.span_days() > 300 { "%Y-%m" } else { "%m-%d" };

    for t in time.ticks(tick_count) {
        let x = time.scale(t).round();
        if x < 0.0 || x > chart.width as f64 {
            continue;
        }
        let col = (x as u16).min(chart.width.saturating_sub(1));
        let pos = (chart.x + col, line_row);
        buf[pos].set_char(AXIS_TICK);
        buf[pos].set_style(Style::default().fg(colors::BORDER));

        let label = t.format(format).to_string();
        let half = (label.len() / 2) as u16;
        let label_x = (chart.x + col).saturating_sub(half).max(chart.x);
        let max_len = (chart.x + chart.width).saturating_sub(label_x) as usize;
        buf.set_stringn(label_x, label_row, &label, max_len, styles::text_dim());
    }
}
