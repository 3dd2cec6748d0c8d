use crate::app::App;
use crate::feed::DisplayItem;
use crate::theme::category_badge;
use crate::util::{html_to_plain, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame,
};

/// Terminal rows taken by one post in the list.
const ROWS_PER_ITEM: usize = 3;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub(super) fn spinner_glyph(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// Render the category tab bar.
pub fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 1 {
        return;
    }

    let titles: Vec<Line> = app
        .filters
        .tabs()
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.label())))
        .collect();
    let selected = app.filters.position(app.feed.active_filter()).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.style("tab_inactive"))
        .highlight_style(app.style("tab_active"))
        .divider("│");

    f.render_widget(tabs, area);
}

/// Render the post list panel with its footer.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    // Guard against zero-width/height areas
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_height = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;

    // One row is kept for the footer.
    app.list_visible_items = inner_height.saturating_sub(1) / ROWS_PER_ITEM;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(list_title(app));

    if app.feed.is_loading_initial() && app.feed.items().is_empty() {
        let msg = format!("{} Loading news...", spinner_glyph(app.spinner_frame));
        let paragraph = Paragraph::new(Line::from(Span::styled(msg, app.style("spinner"))))
            .block(block);
        f.render_widget(paragraph, area);
        return;
    }

    let visible = app.visible_items();
    if visible.is_empty() {
        let lines = empty_lines(app);
        f.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let selected = app.selected.min(visible.len() - 1);
    let mut rows: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, item)| item_row(app, item, i == selected, inner_width))
        .collect();
    rows.push(ListItem::new(footer_line(app)));

    let list = List::new(rows).block(block);
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn list_title(app: &App) -> String {
    let filter = app.feed.active_filter();
    if filter.is_all() {
        " Notícias e publicações ".to_string()
    } else {
        format!(" Notícias e publicações - {} ", filter.label())
    }
}

/// Three-line row: badge and date, title, excerpt.
fn item_row<'a>(app: &App, item: &DisplayItem, selected: bool, width: usize) -> ListItem<'a> {
    let badge = format!(" {} ", item.category);
    let meta = Line::from(vec![
        Span::styled(badge, category_badge(&item.category)),
        Span::raw("  "),
        Span::styled(item.published_at.clone(), app.style("item_date")),
    ]);

    let title = html_to_plain(&item.title);
    let title = Line::from(Span::styled(
        truncate_to_width(&title, width).into_owned(),
        app.style("item_title"),
    ));
    let excerpt = Line::from(Span::styled(
        truncate_to_width(&item.excerpt, width).into_owned(),
        app.style("item_excerpt"),
    ));

    let row = ListItem::new(vec![meta, title, excerpt]);
    if selected {
        row.style(app.style("item_selected"))
    } else {
        row
    }
}

/// Footer under the last row: loading, error, end of list or progress.
fn footer_line(app: &App) -> Line<'static> {
    let feed = &app.feed;
    let loaded = feed.items().len();
    let count = match feed.total_posts() {
        Some(total) => format!("{} of {} posts loaded", loaded, total),
        None => format!("{} posts loaded", loaded),
    };

    if feed.is_loading_more() {
        return Line::from(Span::styled(
            format!("{} Loading more... ({})", spinner_glyph(app.spinner_frame), count),
            app.style("spinner"),
        ));
    }
    if let Some(error) = feed.last_error() {
        return Line::from(Span::styled(
            format!("Could not load more posts: {} (r to retry)", error),
            app.style("detail_error"),
        ));
    }
    if feed.is_end_of_list() {
        return Line::from(Span::styled(
            format!("End of list ({})", count),
            app.style("list_footer"),
        ));
    }
    Line::from(Span::styled(
        format!(
            "Page {} of {} ({})",
            feed.current_page(),
            feed.total_pages(),
            count
        ),
        app.style("list_footer"),
    ))
}

/// Placeholder shown instead of the list when nothing matches.
fn empty_lines(app: &App) -> Vec<Line<'static>> {
    let feed = &app.feed;
    let mut lines = Vec::with_capacity(3);

    if feed.items().is_empty() {
        match feed.last_error() {
            Some(error) => {
                lines.push(Line::from(Span::styled(
                    format!("Failed to load news: {}", error),
                    app.style("detail_error"),
                )));
                lines.push(Line::from(Span::styled(
                    "Press r to try again",
                    app.style("list_footer"),
                )));
            }
            None => lines.push(Line::from(Span::styled(
                "No news published yet",
                app.style("list_empty"),
            ))),
        }
        return lines;
    }

    lines.push(Line::from(Span::styled(
        format!("No news in the \"{}\" category", feed.active_filter().label()),
        app.style("list_empty"),
    )));
    if feed.is_loading_more() {
        lines.push(Line::from(Span::styled(
            format!("{} Searching older posts...", spinner_glyph(app.spinner_frame)),
            app.style("spinner"),
        )));
    } else if !feed.should_load_more() {
        lines.push(Line::from(Span::styled(
            "All posts have been loaded. Press 0 to show every category",
            app.style("list_footer"),
        )));
    }
    lines
}
