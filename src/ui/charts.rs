use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use super::panel;
use crate::app::{App, CountryDetail};
use crate::data::{Year, YEARS};
use crate::format::{format_axis_label, format_population};
use crate::theme::Palette;

pub fn render(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_trend(frame, app, palette, cols[0]);
    render_top_n(frame, app, palette, cols[1]);
}

/// Y axis bounds padded so the line never sits on the frame
fn value_bounds(series: &[(Year, u64)]) -> [f64; 2] {
    let max = series.iter().map(|&(_, v)| v).max().unwrap_or(0) as f64;
    let min = series.iter().map(|&(_, v)| v).min().unwrap_or(0) as f64;
    let pad = ((max - min) * 0.1).max(1.0);
    [(min - pad).max(0.0), max + pad]
}

fn render_trend(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title = format!("Population Trend: {}", app.view_label());
    let block = panel(&title, palette, false);
    let dim = Style::default().fg(palette.border);

    let series = app.trend();
    if series.is_empty() {
        let text = match app.detail {
            CountryDetail::Loading => "Loading...",
            _ if app.records.is_loading() => "Loading...",
            _ => "No data available",
        };
        frame.render_widget(Paragraph::new(Span::styled(text, dim)).block(block), area);
        return;
    }

    let points: Vec<(f64, f64)> = series.iter().map(|&(y, v)| (y.0 as f64, v as f64)).collect();
    let [lo, hi] = value_bounds(&series);
    let first = YEARS[0].0 as f64;
    let last = YEARS[YEARS.len() - 1].0 as f64;

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(palette.primary))
        .data(&points);

    let x_labels: Vec<Line> = [YEARS[0], YEARS[YEARS.len() / 2], YEARS[YEARS.len() - 1]]
        .iter()
        .map(|y| Line::from(y.to_string()))
        .collect();
    let y_labels: Vec<Line> = [lo, (lo + hi) / 2.0, hi]
        .iter()
        .map(|&v| Line::from(format_axis_label(v as u64)))
        .collect();

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(palette.grid))
                .bounds([first, last])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(palette.grid))
                .bounds([lo, hi])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn render_top_n(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let title = format!("Top {} Countries ({})", app.top_n().len().max(1), app.selection.selected_year);
    let block = panel(&title, palette, false);

    if app.top_n().is_empty() {
        let text = if app.records.is_loading() { "Loading..." } else { "No data available" };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(palette.border))).block(block),
            area,
        );
        return;
    }

    let selected = app.selection.selected_country.as_deref();
    let bars: Vec<Bar> = app
        .top_n()
        .iter()
        .map(|(country, value)| {
            let color = if Some(country.as_str()) == selected {
                palette.basemap.highlight_color()
            } else {
                palette.primary
            };
            Bar::default()
                .value(*value)
                .label(Line::from(country.as_str()))
                .text_value(format_population(Some(*value)))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(Color::White).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}
