use crate::app::{App, MAX_SCROLL};
use crate::feed::{DetailState, PostDetail};
use crate::theme::{category_badge, StyleMap};
use crate::util::{display_width, html_to_blocks, html_to_plain, BlockKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::list::spinner_glyph;

/// Render the post detail view
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Layout may produce zero-sized rects during extreme terminal resizes
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    app.detail_visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line<'static>> = match &app.detail {
        DetailState::Idle => vec![Line::from("No post selected")],
        DetailState::Loading { slug } => vec![Line::from(Span::styled(
            format!("{} Loading {}...", spinner_glyph(app.spinner_frame), slug),
            app.style("spinner"),
        ))],
        DetailState::Loaded(detail) => detail_lines(detail, &app.theme),
        DetailState::NotFound { slug } => vec![
            Line::from(Span::styled(
                "Post not found",
                app.style("detail_notice"),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("No post is published under \"{}\".", slug),
                app.style("detail_body"),
            )),
            Line::from(Span::styled(
                "Press Esc to go back to the list",
                app.style("detail_metadata"),
            )),
        ],
        DetailState::Failed { slug, error } => vec![
            Line::from(Span::styled(
                format!("Failed to load \"{}\": {}", slug, error),
                app.style("detail_error"),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Esc to go back to the list",
                app.style("detail_metadata"),
            )),
        ],
    };

    app.detail_content_lines = wrapped_line_count(&lines, inner_width);
    // Clamp before rendering so a resize never shows an invalid offset.
    app.clamp_detail_scroll();

    let title = match &app.detail {
        DetailState::Loaded(detail) => format!(" {} ", detail.category),
        _ => " Publicação ".to_string(),
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset.min(MAX_SCROLL) as u16, 0));

    f.render_widget(paragraph, area);
}

/// Header and body of a loaded post as styled lines.
pub fn detail_lines(detail: &PostDetail, theme: &StyleMap) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", detail.category), category_badge(&detail.category)),
            Span::raw("  "),
            Span::styled(detail.published_at.clone(), theme.resolve("detail_metadata")),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            html_to_plain(&detail.title),
            theme.resolve("detail_heading"),
        )),
    ];
    if let Some(image) = &detail.image_url {
        lines.push(Line::from(Span::styled(
            format!("[Image: {}]", image),
            theme.resolve("detail_image"),
        )));
    }
    lines.push(Line::from(""));

    let blocks = html_to_blocks(&detail.content_html);
    if blocks.is_empty() {
        lines.push(Line::from(Span::styled(
            "This post has no text content.",
            theme.resolve("detail_metadata"),
        )));
    }
    for block in blocks {
        match block.kind {
            BlockKind::Heading => {
                lines.push(Line::from(Span::styled(
                    block.text,
                    theme.resolve("detail_heading"),
                )));
                lines.push(Line::from(""));
            }
            BlockKind::Paragraph => {
                lines.push(Line::from(Span::styled(
                    block.text,
                    theme.resolve("detail_body"),
                )));
                lines.push(Line::from(""));
            }
            BlockKind::ListItem => {
                lines.push(Line::from(vec![
                    Span::styled("  • ", theme.resolve("detail_bullet")),
                    Span::styled(block.text, theme.resolve("detail_body")),
                ]));
            }
            BlockKind::Quote => {
                lines.push(Line::from(Span::styled(
                    format!("│ {}", block.text),
                    theme.resolve("detail_quote"),
                )));
                lines.push(Line::from(""));
            }
            BlockKind::Image => {
                lines.push(Line::from(Span::styled(
                    format!("[Image: {}]", block.text),
                    theme.resolve("detail_image"),
                )));
            }
        }
    }

    if let Some(link) = &detail.link {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} (o to open in browser)", link),
            theme.resolve("detail_metadata"),
        )));
    }
    lines
}

/// Rows the lines take once wrapped at `width` columns.
///
/// Counts by display width, so word wrapping may occasionally need a row more.
fn wrapped_line_count(lines: &[Line], width: usize) -> usize {
    if width == 0 {
        return lines.len();
    }
    lines
        .iter()
        .map(|line| {
            let w: usize = line
                .spans
                .iter()
                .map(|span| display_width(&span.content))
                .sum();
            w.div_ceil(width).max(1)
        })
        .sum()
}
