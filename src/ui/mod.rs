mod charts;
mod sidebar;

use crate::app::{App, Focus, Load};
use crate::braille::BrailleCanvas;
use crate::map::{MapLayers, MapView};
use crate::theme::Palette;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Widget},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 36;
/// Navbar search marker, one column wide
const SEARCH_GLYPH: &str = "⌕";
const CHART_HEIGHT: u16 = 12;

/// Render the dashboard. Records the map area on `map` for mouse hit testing.
pub fn render(frame: &mut Frame, app: &App, map: &mut MapView) {
    let area = frame.area();
    let palette = app.selection.theme.palette();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),            // Navbar
            Constraint::Min(8),               // Map + sidebar
            Constraint::Length(CHART_HEIGHT), // Charts
            Constraint::Length(1),            // Status bar
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(SIDEBAR_WIDTH)])
        .split(rows[1]);

    let search_area = render_navbar(frame, app, &palette, rows[0]);
    render_map(frame, app, map, &palette, body[0]);
    sidebar::render(frame, app, &palette, body[1]);
    charts::render(frame, app, &palette, rows[2]);
    render_status_bar(frame, app, map, &palette, rows[3]);

    // Drawn last so the dropdown overlays the map
    if app.focus == Focus::Search {
        render_suggestions(frame, app, &palette, search_area);
    }
}

pub(crate) fn panel<'a>(title: &'a str, palette: &Palette, focused: bool) -> Block<'a> {
    let border = if focused { palette.primary } else { palette.border };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(palette.primary)
                .add_modifier(Modifier::BOLD),
        ))
}

/// Title, search box and theme toggle. Returns the search box area.
fn render_navbar(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) -> Rect {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(24),
            Constraint::Min(20),
            Constraint::Length(8),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        " Population Analytics",
        Style::default()
            .fg(palette.primary)
            .add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(palette.border)));
    frame.render_widget(title, cols[0]);

    let searching = app.focus == Focus::Search;
    let text = if app.selection.search.is_empty() && !searching {
        Span::styled("/ to search countries", Style::default().fg(palette.border))
    } else {
        Span::raw(app.selection.search.as_str())
    };
    let mut line = vec![Span::raw(format!(" {SEARCH_GLYPH} ")), text];
    if searching {
        line.push(Span::styled("▏", Style::default().fg(palette.primary)));
    }
    let search = Paragraph::new(Line::from(line)).block(panel("Search", palette, searching));
    frame.render_widget(search, cols[1]);

    let toggle = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::raw(app.selection.theme.icon()),
        Span::styled(" t", Style::default().fg(palette.border)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(palette.border)));
    frame.render_widget(toggle, cols[2]);

    cols[1]
}

fn render_suggestions(frame: &mut Frame, app: &App, palette: &Palette, search_area: Rect) {
    let suggestions = app.suggestions();
    let message = if suggestions.is_empty() {
        match app.names {
            _ if app.selection.search.trim().is_empty() => return,
            Load::Loading => Some("Loading countries..."),
            Load::Failed => Some("No countries available"),
            _ => Some("No matches"),
        }
    } else {
        None
    };

    let height = message.map_or(suggestions.len(), |_| 1) as u16 + 2;
    let area = Rect::new(
        search_area.x,
        search_area.y + search_area.height,
        search_area.width,
        height,
    )
    .intersection(frame.area());

    let items: Vec<ListItem> = match message {
        Some(text) => vec![ListItem::new(Span::styled(text, Style::default().fg(palette.border)))],
        None => suggestions
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let style = if app.suggestion_cursor() == Some(i) {
                    Style::default().fg(Color::White).bg(palette.primary)
                } else {
                    Style::default()
                };
                ListItem::new(Span::styled(format!(" {name}"), style))
            })
            .collect(),
    };

    frame.render_widget(Clear, area);
    frame.render_widget(
        List::new(items)
            .style(Style::default().bg(palette.background).fg(palette.text))
            .block(panel("Suggestions", palette, true)),
        area,
    );
}

fn render_map(frame: &mut Frame, app: &App, map: &mut MapView, palette: &Palette, area: Rect) {
    let block = panel("World Population Map", palette, app.focus == Focus::Map);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    map.set_area(inner);
    let layers = map.renderer.render(
        inner.width as usize,
        inner.height as usize,
        &map.viewport,
        map.layer(),
        app.selection.selected_country.as_deref(),
    );

    let basemap = palette.basemap;
    frame.render_widget(
        MapWidget {
            layers,
            coastline: basemap.coastline_color(),
            country: basemap.layer_color(),
            highlight: basemap.highlight_color(),
        },
        inner,
    );
}

/// Braille map layers, each in its own color
struct MapWidget {
    layers: MapLayers,
    coastline: Color,
    country: Color,
    highlight: Color,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        let rows = canvas.height().min(area.height as usize);
        let cols = canvas.width().min(area.width as usize);
        for row in 0..rows {
            for col in 0..cols {
                if let Some(ch) = canvas.cell(col, row) {
                    let pos = (area.x + col as u16, area.y + row as u16);
                    buf[pos].set_char(ch).set_fg(color);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front
        Self::render_layer(&self.layers.basemap, self.coastline, area, buf);
        Self::render_layer(&self.layers.countries, self.country, area, buf);
        Self::render_layer(&self.layers.highlight, self.highlight, area, buf);
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, map: &MapView, palette: &Palette, area: Rect) {
    let settings = &map.renderer.settings;
    let dim = Style::default().fg(palette.border);
    let toggle = |on: bool| Style::default().fg(if on { palette.primary } else { palette.border });

    let mut spans = vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(map.zoom_level(), Style::default().fg(palette.primary)),
        Span::styled(" (", dim),
        Span::styled(map.lod_level(), Style::default().fg(palette.text)),
        Span::styled(") ", dim),
        Span::styled(map.scale_label(), Style::default().fg(palette.text)),
        Span::raw(" "),
        Span::styled(
            if settings.show_basemap { "[B]asemap " } else { "[b]asemap " },
            toggle(settings.show_basemap),
        ),
        Span::styled(
            if settings.show_layer { "[P]opulation " } else { "[p]opulation " },
            toggle(settings.show_layer),
        ),
        Span::styled("| ", dim),
        Span::styled(map.center_coords(), Style::default().fg(palette.text)),
    ];

    if app.records.is_loading() || app.names.is_loading() {
        spans.push(Span::styled(" | loading…", Style::default().fg(palette.primary)));
    }

    spans.push(Span::styled(
        " | /:search tab:list [ ]:year x:world t:theme hjkl:pan +/-:zoom r:reset q:quit",
        dim,
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
