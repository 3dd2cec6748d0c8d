//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles. Category badges
//! get their own colour table, shared by both variants.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Category badges
// ============================================================================

/// Council brand blue, used for categories without a dedicated colour.
pub const BRAND_BLUE: Color = Color::Rgb(0, 74, 128);

/// Badge background for a category display name.
pub fn category_color(category: &str) -> Color {
    match category {
        "Notícias" => Color::Rgb(59, 130, 246),
        "Institucional" => Color::Rgb(168, 85, 247),
        "Cursos" => Color::Rgb(34, 197, 94),
        "Eventos" => Color::Rgb(249, 115, 22),
        _ => BRAND_BLUE,
    }
}

/// Style of the `[Category]` badge in list rows and the detail header.
pub fn category_badge(category: &str) -> Style {
    Style::default()
        .bg(category_color(category))
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

// ============================================================================
// Color Palette — semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Post list --
    pub item_title: Style,
    pub item_selected: Style,
    pub item_date: Style,
    pub item_excerpt: Style,
    pub list_footer: Style,
    pub list_empty: Style,

    // -- Filter tabs --
    pub tab_active: Style,
    pub tab_inactive: Style,

    // -- Detail --
    pub detail_heading: Style,
    pub detail_body: Style,
    pub detail_metadata: Style,
    pub detail_quote: Style,
    pub detail_bullet: Style,
    pub detail_image: Style,
    pub detail_error: Style,
    pub detail_notice: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub spinner: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            item_title: Style::default().add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            item_date: Style::default().fg(Color::DarkGray),
            item_excerpt: Style::default().fg(Color::Gray),
            list_footer: Style::default().fg(Color::DarkGray),
            list_empty: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(BRAND_BLUE)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            detail_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_metadata: Style::default().fg(Color::DarkGray),
            detail_quote: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            detail_bullet: Style::default().fg(Color::Cyan),
            detail_image: Style::default().fg(Color::Blue),
            detail_error: Style::default().fg(Color::Red),
            detail_notice: Style::default().fg(Color::Yellow),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            spinner: Style::default().fg(Color::Yellow),
        }
    }

    fn light() -> Self {
        Self {
            item_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            item_selected: Style::default().bg(Color::Blue).fg(Color::White),
            item_date: Style::default().fg(Color::DarkGray),
            item_excerpt: Style::default().fg(Color::DarkGray),
            list_footer: Style::default().fg(Color::DarkGray),
            list_empty: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(BRAND_BLUE)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            detail_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_metadata: Style::default().fg(Color::DarkGray),
            detail_quote: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            detail_bullet: Style::default().fg(Color::Blue),
            detail_image: Style::default().fg(Color::Blue),
            detail_error: Style::default().fg(Color::Red),
            detail_notice: Style::default().fg(Color::Magenta),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            spinner: Style::default().fg(Color::Magenta),
        }
    }
}

// ============================================================================
// Style Map — string-keyed lookup
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 20] = [
    "item_title",
    "item_selected",
    "item_date",
    "item_excerpt",
    "list_footer",
    "list_empty",
    "tab_active",
    "tab_inactive",
    "detail_heading",
    "detail_body",
    "detail_metadata",
    "detail_quote",
    "detail_bullet",
    "detail_image",
    "detail_error",
    "detail_notice",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "spinner",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 20] = [
            p.item_title,
            p.item_selected,
            p.item_date,
            p.item_excerpt,
            p.list_footer,
            p.list_empty,
            p.tab_active,
            p.tab_inactive,
            p.detail_heading,
            p.detail_body,
            p.detail_metadata,
            p.detail_quote,
            p.detail_bullet,
            p.detail_image,
            p.detail_error,
            p.detail_notice,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.spinner,
        ];

        let mut map = HashMap::with_capacity(ROLE_NAMES.len());
        for (name, style) in ROLE_NAMES.iter().zip(styles.iter()) {
            map.insert(*name, *style);
        }

        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
