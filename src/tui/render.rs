//! UI rendering functions for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::info_card::{InfoCard, Rgb};
use crate::types::{DisplayMode, Episode};

use super::state::App;
use super::types::Focus;

/// Width of one grid cell, borders included.
const GRID_CELL_WIDTH: u16 = 6;

/// Width of the info card panel.
const INFO_PANEL_WIDTH: u16 = 40;

/// Draw the UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Controls
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    draw_controls(frame, app, chunks[1]);

    if app.show_info {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(INFO_PANEL_WIDTH)])
            .split(chunks[2]);

        draw_episodes(frame, app, content_chunks[0]);
        draw_info_card(frame, &app.card, content_chunks[1]);
    } else {
        draw_episodes(frame, app, chunks[2]);
    }

    draw_footer(frame, app, chunks[3]);

    if app.show_help {
        draw_help_modal(frame, app);
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.card.title.is_empty() {
        app.browser.series_id().unwrap_or("Episodes").to_string()
    } else {
        app.card.title.clone()
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "episode-browser",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(title, Style::default().fg(to_color(app.card.accent))),
        Span::raw("  "),
        Span::styled(
            format!(
                "[{}/{} watched]",
                app.browser.watched().len(),
                app.browser.episodes().len()
            ),
            Style::default().fg(Color::Green),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_controls(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28), // Interval selector
            Constraint::Min(10),    // Search
            Constraint::Length(14), // Layout toggle
        ])
        .split(area);

    // Interval selector
    let options = app.browser.interval_options();
    let interval_text = if options.is_empty() {
        "No episodes".to_string()
    } else if app.browser.is_searching() {
        "All episodes".to_string()
    } else {
        let index = app.browser.active_interval_index().map_or(0, |i| i + 1);
        format!(
            "{} ({}/{})",
            app.browser.active_interval().label(),
            index,
            options.len()
        )
    };
    let interval = Paragraph::new(interval_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("[ Interval ]")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(interval, chunks[0]);

    // Search input
    let search_focused = app.focus == Focus::Search;
    let search_text = if app.browser.search().is_empty() && !search_focused {
        "Press '/' to search episodes..."
    } else {
        app.browser.search()
    };
    let search_title = if app.browser.is_searching() {
        format!("Search ({} matches)", app.displayed().len())
    } else {
        "Search".to_string()
    };
    let search = Paragraph::new(search_text)
        .style(if search_focused {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(search_title)
                .border_style(if search_focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                }),
        );
    frame.render_widget(search, chunks[1]);

    if search_focused {
        let width = app.browser.search().chars().count() as u16;
        frame.set_cursor_position((chunks[1].x + width + 1, chunks[1].y + 1));
    }

    // Layout toggle
    let icon = match app.browser.display_mode() {
        DisplayMode::List => "≡ list",
        DisplayMode::Grid => "▦ grid",
        DisplayMode::ImageList => "▣ images",
    };
    let layout = Paragraph::new(icon).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Layout")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(layout, chunks[2]);
}

/// Style of an episode entry from its selected/watched state.
fn entry_style(app: &App, episode: &Episode) -> Style {
    let accent = to_color(app.card.accent);
    let selected = app.browser.is_selected(&episode.id);
    let watched = app.browser.is_watched(&episode.id);

    match (selected, watched) {
        (true, _) => Style::default()
            .bg(accent)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(accent).add_modifier(Modifier::DIM),
        (false, false) => Style::default().fg(Color::Gray),
    }
}

fn draw_episodes(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Episodes");

    if app.browser.is_row_layout() {
        let image_list = app.browser.display_mode() == DisplayMode::ImageList;
        let items: Vec<ListItem> = app
            .displayed()
            .into_iter()
            .map(|episode| {
                let style = entry_style(app, episode);
                let mut first = vec![Span::styled(episode.to_display(), style)];
                if app.browser.is_selected(&episode.id) {
                    first.push(Span::styled(" ▶", style));
                }

                let mut lines = vec![Line::from(first)];
                if image_list {
                    let image = episode.image.as_deref().unwrap_or("no thumbnail");
                    lines.push(Line::from(Span::styled(
                        format!("   ▣ {}", image),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, area, &mut app.list_state);
    } else {
        let inner_width = area.width.saturating_sub(2);
        app.set_grid_columns((inner_width / GRID_CELL_WIDTH).max(1) as usize);
        let columns = app.grid_columns;
        let cursor = app.cursor;

        let displayed = app.displayed();
        let rows: Vec<ListItem> = displayed
            .chunks(columns)
            .enumerate()
            .map(|(row, cells)| {
                let spans: Vec<Span> = cells
                    .iter()
                    .enumerate()
                    .map(|(col, episode)| {
                        let label = if app.browser.is_selected(&episode.id) {
                            "▶".to_string()
                        } else {
                            episode.number.to_string()
                        };
                        let mut style = entry_style(app, episode);
                        if row * columns + col == cursor {
                            style = style.add_modifier(Modifier::REVERSED);
                        }
                        Span::styled(
                            format!("{:^width$}", label, width = GRID_CELL_WIDTH as usize),
                            style,
                        )
                    })
                    .collect();
                ListItem::new(Line::from(spans))
            })
            .collect();

        let grid = List::new(rows).block(block);
        frame.render_stateful_widget(grid, area, &mut app.list_state);
    }
}

fn draw_info_card(frame: &mut Frame, card: &InfoCard, area: Rect) {
    let accent = to_color(card.accent);
    let mut lines = vec![Line::from(Span::styled(
        card.title.clone(),
        Style::default()
            .fg(Color::Rgb(0xe8, 0xe8, 0xe8))
            .add_modifier(Modifier::BOLD),
    ))];

    if let Some(metadata) = &card.metadata {
        lines.push(Line::from(Span::styled(
            metadata.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::raw(""));
    if !card.description.is_empty() {
        for text in card.description.lines() {
            lines.push(Line::raw(text.to_string()));
        }
        lines.push(Line::raw(""));
    }

    let tag_style = Style::default()
        .bg(to_color(card.gradient.from))
        .fg(to_color(card.genre_text))
        .add_modifier(Modifier::BOLD);
    let mut tags = Vec::new();
    for genre in &card.genres {
        tags.push(Span::styled(format!(" {} ", genre), tag_style));
        tags.push(Span::raw(" "));
    }
    lines.push(Line::from(tags));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        format!("cover: {}", card.cover),
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Info")
                .border_style(Style::default().fg(to_color(card.gradient.to))),
        )
        .style(Style::default().fg(accent))
        .wrap(Wrap { trim: true });

    frame.render_widget(panel, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = if let Some(status) = &app.status_message {
        status.as_str()
    } else if app.focus == Focus::Search {
        "[Enter] done  [Esc] clear  [Bksp] delete"
    } else if app.browser.is_row_layout() {
        "[/] search  [↑↓] navigate  [[ ]] interval  [v] layout  [i] info  [Enter] play  [?] help  [q] quit"
    } else {
        "[/] search  [←↑↓→] navigate  [[ ]] interval  [v] layout  [i] info  [Enter] play  [?] help  [q] quit"
    };

    let footer = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

fn draw_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let content = get_help_content(app);

    let help_text = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help - {} layout", app.browser.display_mode()))
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_text, area);
}

fn get_help_content(app: &App) -> String {
    let global_keys = "\
Global Commands
───────────────
  ?           Show/hide this help
  Ctrl+C      Force quit
  Ctrl+Q      Force quit
  q           Quit

";

    let list_keys = "\
Episode List
────────────
  j / ↓       Move down
  k / ↑       Move up
  Enter       Play episode
  [ / ]       Previous / next interval
  v           Cycle layout (list, grid, images)
  i           Show/hide info card

";

    let grid_keys = "\
Grid
────
  h / ←       Move left
  l / →       Move right
  j / k       Move one row

";

    let search_keys = "\
Search
──────
  /           Focus search
  (Type)      Filter by episode number/title
  Enter       Keep filter, back to list
  Esc         Clear filter

";

    if app.browser.is_row_layout() {
        format!("{}{}{}Press ? to close", global_keys, list_keys, search_keys)
    } else {
        format!(
            "{}{}{}{}Press ? to close",
            global_keys, list_keys, grid_keys, search_keys
        )
    }
}

/// Helper function to create a centered rect.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::EpisodeBrowser;
    use crate::config::Config;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::types::Series;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(series: &Series, configure: impl FnOnce(&mut App)) -> String {
        let browser = EpisodeBrowser::mount(
            series.id.clone(),
            series.episodes.clone(),
            Box::new(MemoryStore::new()),
        );
        let mut app = App::new(browser, series, &Config::new());
        configure(&mut app);
        render_app(&mut app)
    }

    fn render_app(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn series(count: i64) -> Series {
        let mut series = Series {
            id: Some("show".to_string()),
            episodes: (1..=count)
                .map(|n| Episode::new(n.to_string(), n).with_title(format!("Chapter {}", n)))
                .collect(),
            ..Series::default()
        };
        series.info.title = Some("Test Show".to_string());
        series.info.genres = vec!["Action".to_string(), "Comedy".to_string()];
        series
    }

    #[test]
    fn test_draw_list_layout() {
        let screen = render(&series(150), |_| {});
        assert!(screen.contains("Test Show"));
        assert!(screen.contains("Episodes 1 - 100 (1/2)"));
        assert!(screen.contains("1. Chapter 1"));
        assert!(screen.contains("Action"));
    }

    #[test]
    fn test_draw_grid_layout() {
        let screen = render(&series(12), |app| {
            app.browser.toggle_display_mode();
        });
        assert!(screen.contains("▦ grid"));
        assert!(!screen.contains("Chapter 1"));
    }

    #[test]
    fn test_draw_image_list_layout() {
        let mut series = series(3);
        series.episodes[0] = series.episodes[0].clone().with_image("thumbs/ep1.jpg");
        let screen = render(&series, |app| {
            app.browser.toggle_display_mode();
            app.browser.toggle_display_mode();
        });
        assert!(screen.contains("▣ images"));
        assert!(screen.contains("thumbs/ep1.jpg"));
        assert!(screen.contains("no thumbnail"));
    }

    #[test]
    fn test_stored_scroll_survives_first_draw() {
        let series = series(80);
        let mut store = MemoryStore::new();
        store.set_item("scroll-position-show", "40").unwrap();
        let browser = EpisodeBrowser::mount(
            series.id.clone(),
            series.episodes.clone(),
            Box::new(store),
        );
        let mut app = App::new(browser, &series, &Config::new());

        let screen = render_app(&mut app);
        app.sync_scroll();

        assert_eq!(app.list_state.offset(), 40);
        assert!(screen.contains("41. Chapter 41"));
        assert_eq!(
            app.browser.store().get_item("scroll-position-show").unwrap().as_deref(),
            Some("40")
        );
    }

    #[test]
    fn test_draw_empty_series() {
        let screen = render(&Series::default(), |_| {});
        assert!(screen.contains("No episodes"));
    }

    #[test]
    fn test_draw_help_modal() {
        let screen = render(&series(3), |app| app.show_help = true);
        assert!(screen.contains("Global Commands"));
    }
}
