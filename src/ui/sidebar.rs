use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::panel;
use crate::app::{App, CountryDetail, Focus, Load, NoDataReason};
use crate::data::YEARS;
use crate::format::{format_growth, format_population};
use crate::metrics::previous_year;
use crate::theme::Palette;

pub fn render(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Country list
            Constraint::Length(4), // Year selector
            Constraint::Length(8), // Info boxes
        ])
        .split(area);

    render_countries(frame, app, palette, rows[0]);
    render_years(frame, app, palette, rows[1]);
    render_info(frame, app, palette, rows[2]);
}

fn render_countries(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let focused = app.focus == Focus::Countries;
    let block = panel("Country", palette, focused);
    let dim = Style::default().fg(palette.border);

    let placeholder = match &app.names {
        Load::Idle | Load::Loading => Some("Loading countries..."),
        Load::Failed => Some("No countries available"),
        Load::Ready(names) if names.is_empty() => Some("No countries available"),
        Load::Ready(_) => None,
    };
    if let Some(text) = placeholder {
        frame.render_widget(Paragraph::new(Span::styled(text, dim)).block(block), area);
        return;
    }

    let selected = app.selection.selected_country.as_deref();
    let world = ListItem::new(Line::from(vec![
        Span::styled(if selected.is_none() { "● " } else { "  " }, Style::default().fg(palette.primary)),
        Span::styled("World (x)", dim),
    ]));
    let items: Vec<ListItem> = std::iter::once(world)
        .chain(app.filtered_countries().into_iter().map(|name| {
            let marker = if Some(name) == selected { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(palette.primary)),
                Span::raw(name),
            ]))
        }))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(palette.primary_dark)
                .add_modifier(Modifier::BOLD),
        );

    // Row 0 is the world entry
    let mut state = ListState::default();
    if focused {
        state.select(Some(app.list_cursor() + 1));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_years(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let mut spans = Vec::with_capacity(YEARS.len() * 2);
    for year in YEARS {
        let style = if year == app.selection.selected_year {
            Style::default()
                .fg(Color::White)
                .bg(palette.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.text)
        };
        spans.push(Span::styled(format!(" {year} "), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .block(panel("Year  [ ]", palette, false)),
        area,
    );
}

fn render_info(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let year = app.selection.selected_year;
    let block = panel(app.view_label(), palette, false);
    let dim = Style::default().fg(palette.border);
    let value = Style::default()
        .fg(palette.primary)
        .add_modifier(Modifier::BOLD);

    let loading = || vec![Line::from(Span::styled("Loading...", dim))];
    let no_data = |detail: &'static str| {
        vec![
            Line::from(Span::styled("No data available", value)),
            Line::from(Span::styled(detail, dim)),
        ]
    };

    let lines = match (&app.selection.selected_country, &app.detail) {
        (Some(_), CountryDetail::Loading) => loading(),
        (Some(_), CountryDetail::NoData(reason)) => no_data(match reason {
            NoDataReason::SourceUnavailable => "Population service unreachable",
            NoDataReason::NotFound => "Country not in dataset",
            NoDataReason::NoUsableData => "No recorded values",
        }),
        (None, _) if app.records.is_loading() => loading(),
        (None, _) if app.world().is_none() => no_data("Population service unreachable"),
        _ => {
            let growth_label = match previous_year(year, &YEARS) {
                Some(prev) => format!("Growth since {prev}"),
                None => "Growth".to_string(),
            };
            vec![
                Line::from(Span::styled(format!("Population in {year}"), dim)),
                Line::from(Span::styled(format_population(app.selected_population()), value)),
                Line::from(""),
                Line::from(Span::styled(growth_label, dim)),
                Line::from(Span::styled(format_growth(app.growth_rate()), value)),
            ]
        }
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
