//! Help overlay listing the active keybindings.
//!
//! Bindings come from the registry, so user overrides from the config file
//! show up here. Keys bound to the same action share one row.

use crate::app::App;
use crate::keybindings::{Action, Context};
use crate::util::display_width;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Context display order for the help screen.
const CONTEXT_ORDER: [Context; 3] = [Context::Global, Context::List, Context::Detail];

/// Width of the key column.
const KEY_COLUMN: usize = 22;

/// One help row: every key for `action` in a context.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HelpRow {
    keys: Vec<String>,
    action: Action,
    description: &'static str,
}

/// Group the registry's bindings by context, then by action in first-bound order.
fn help_sections(app: &App) -> Vec<(Context, Vec<HelpRow>)> {
    let bindings = app.keybindings.all_bindings();
    CONTEXT_ORDER
        .iter()
        .map(|ctx| {
            let mut rows: Vec<HelpRow> = Vec::new();
            for (_, key, action, description) in bindings.iter().filter(|(c, ..)| c == ctx) {
                match rows.iter_mut().find(|row| row.action == *action) {
                    Some(row) => row.keys.push(key.clone()),
                    None => rows.push(HelpRow {
                        keys: vec![key.clone()],
                        action: *action,
                        description: *description,
                    }),
                }
            }
            (*ctx, rows)
        })
        .filter(|(_, rows)| !rows.is_empty())
        .collect()
}

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (ctx, rows) in help_sections(app) {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            ctx.title(),
            app.style("detail_heading"),
        )));
        for row in rows {
            let keys = row.keys.join(", ");
            let pad = KEY_COLUMN.saturating_sub(display_width(&keys)).max(1);
            lines.push(Line::from(vec![
                Span::styled(format!("  {}", keys), app.style("detail_bullet")),
                Span::raw(" ".repeat(pad)),
                Span::styled(row.description, app.style("detail_body")),
            ]));
        }
    }

    let visible_height = overlay.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(visible_height);
    let scroll = app.help_scroll_offset.min(max_scroll);

    let title = if max_scroll > 0 {
        format!(" Help ({}/{}) j/k scroll ", scroll + 1, max_scroll + 1)
    } else {
        " Help (? to close) ".to_string()
    };

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border_focused"))
                .title(title),
        )
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(paragraph, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ContentClient;
    use crate::config::Config;
    use std::time::Duration;
    use url::Url;

    #[tokio::test]
    async fn test_keys_grouped_per_action() {
        let client = ContentClient::new(
            Url::parse("http://127.0.0.1:9/wp-json/wp/v2/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();
        let app = App::new(client, &Config::default());
        let sections = help_sections(&app);

        let contexts: Vec<Context> = sections.iter().map(|(c, _)| *c).collect();
        assert_eq!(contexts, CONTEXT_ORDER.to_vec());

        let (_, global) = &sections[0];
        let quit = global.iter().find(|r| r.action == Action::Quit).unwrap();
        assert_eq!(quit.keys.len(), 2);
        assert_eq!(
            global.iter().filter(|r| r.action == Action::Quit).count(),
            1
        );
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(70, 80, area);
        assert_eq!(rect, Rect::new(15, 4, 70, 32));
    }
}
