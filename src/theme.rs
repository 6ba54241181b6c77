//! Color theme for the timeline viewer.
//!
//! A low-contrast dark palette. Each item category gets a fixed lane color
//! so epics, features, and sprints stay tellable apart at a glance.

use ratatui::style::Color;

use crate::models::Category;

/// Base palette.
pub mod colors {
    use super::Color;

    /// Primary background.
    pub const BG_DARK: Color = Color::Rgb(0x18, 0x16, 0x16);
    /// Slightly lighter background for input fields.
    pub const BG_MEDIUM: Color = Color::Rgb(0x1D, 0x1C, 0x19);
    /// Background for the focused input field.
    pub const BG_HIGHLIGHT: Color = Color::Rgb(0x28, 0x27, 0x27);

    /// Primary text color.
    pub const FG_PRIMARY: Color = Color::Rgb(0xC5, 0xC9, 0xC5);
    /// Dimmed text for secondary information.
    pub const FG_DIM: Color = Color::Rgb(0x72, 0x71, 0x69);
    /// Very dim text for hints and placeholders.
    pub const FG_HINT: Color = Color::Rgb(0x54, 0x54, 0x54);

    pub const RED: Color = Color::Rgb(0xC4, 0x74, 0x6E);
    pub const GREEN: Color = Color::Rgb(0x8A, 0x9A, 0x7B);
    pub const YELLOW: Color = Color::Rgb(0xC4, 0xB2, 0x8A);
    pub const BLUE: Color = Color::Rgb(0x8B, 0xA4, 0xB0);
    pub const PURPLE: Color = Color::Rgb(0x95, 0x7F, 0xB8);

    /// Borders and separators.
    pub const BORDER: Color = Color::Rgb(0x72, 0x71, 0x69);
    /// Dim separators (axis grid, weekend columns).
    pub const BORDER_DIM: Color = Color::Rgb(0x3A, 0x3A, 0x3A);
    /// Border of the focused pane.
    pub const BORDER_ACCENT: Color = BLUE;
}

/// Lane color for a category. External styling hangs off this single hook,
/// mirroring the per-category class the chart markup used to carry.
pub fn category_color(category: Category) -> Color {
    match category {
        Category::Epic => colors::PURPLE,
        Category::Feature => colors::BLUE,
        Category::Sprint => colors::GREEN,
    }
}

/// Semantic styling helpers.
pub mod styles {
    use ratatui::style::{Modifier, Style};

    use super::colors;

    pub fn text_dim() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn text_hint() -> Style {
        Style::default().fg(colors::FG_HINT)
    }

    pub fn success() -> Style {
        Style::default().fg(colors::GREEN)
    }

    pub fn error() -> Style {
        Style::default().fg(colors::RED)
    }

    pub fn warning() -> Style {
        Style::default().fg(colors::YELLOW)
    }

    pub fn border() -> Style {
        Style::default().fg(colors::BORDER)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(colors::BORDER_ACCENT)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn form_label() -> Style {
        Style::default().fg(colors::FG_DIM)
    }

    pub fn form_input() -> Style {
        Style::default().fg(colors::FG_PRIMARY).bg(colors::BG_MEDIUM)
    }

    pub fn form_input_focused() -> Style {
        Style::default()
            .fg(colors::FG_PRIMARY)
            .bg(colors::BG_HIGHLIGHT)
    }
}
