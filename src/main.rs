use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use popmap::app::{App, Focus, Message};
use popmap::config::{Cli, Settings};
use popmap::data::basemap;
use popmap::map::MapView;
use popmap::source::FeatureService;
use popmap::tasks::EffectRunner;
use popmap::theme::ThemeStore;
use popmap::ui;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;
    init_logging(&settings)?;

    info!(service = %settings.service_url, "starting");

    // Fetches run on the runtime; the UI loop stays on this thread
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let _guard = runtime.enter();

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &settings);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    // Don't wait on requests still in flight
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

/// Log to a file; the terminal belongs to the dashboard
fn init_logging(settings: &Settings) -> Result<()> {
    if let Some(parent) = settings.log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.log_file)
        .with_context(|| format!("failed to open log file {}", settings.log_file.display()))?;

    let default_filter = if settings.verbose { "popmap=debug" } else { "popmap=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}

fn run(terminal: &mut DefaultTerminal, settings: &Settings) -> Result<()> {
    let store = ThemeStore::new(&settings.state_file);
    let mut app = App::new(store.load());

    let source = FeatureService::new(
        &settings.service_url,
        settings.request_timeout,
        settings.max_allowable_offset,
    )?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = EffectRunner::new(Arc::new(source), tx, store);

    let mut map = MapView::new(settings.zoom);
    basemap::load_basemap(&mut map.renderer, &settings.data_dir);

    let effects = app.start();
    runner.run_all(effects, &mut map);

    loop {
        terminal.draw(|frame| ui::render(frame, &app, &mut map))?;

        // ~60fps
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(message) = handle_key(&app, &mut map, key) {
                        let effects = app.update(message);
                        runner.run_all(effects, &mut map);
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(message) = handle_mouse(&mut map, mouse) {
                        let effects = app.update(message);
                        runner.run_all(effects, &mut map);
                    }
                }
                _ => {}
            }
        }

        drain(&mut rx, &mut app, &runner, &mut map);
        map.tick(Instant::now());

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    info!("exiting");
    Ok(())
}

/// Apply every fetch result that has arrived since the last frame
fn drain(rx: &mut UnboundedReceiver<Message>, app: &mut App, runner: &EffectRunner, map: &mut MapView) {
    while let Ok(message) = rx.try_recv() {
        let effects = app.update(message);
        runner.run_all(effects, map);
    }
}

/// Map a key press to a message. Map navigation is applied directly.
fn handle_key(app: &App, map: &mut MapView, key: KeyEvent) -> Option<Message> {
    match app.focus {
        Focus::Search => match key.code {
            KeyCode::Esc => Some(Message::SetFocus(Focus::Map)),
            KeyCode::Enter => Some(Message::AcceptSuggestion),
            KeyCode::Backspace => Some(Message::SearchBackspace),
            KeyCode::Up => Some(Message::SuggestionUp),
            KeyCode::Down | KeyCode::Tab => Some(Message::SuggestionDown),
            KeyCode::Char(c) => Some(Message::SearchInput(c)),
            _ => None,
        },
        Focus::Countries => match key.code {
            KeyCode::Esc | KeyCode::Tab => Some(Message::SetFocus(Focus::Map)),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::ListUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::ListDown),
            KeyCode::Enter => Some(Message::ListSelect),
            KeyCode::Char('/') => Some(Message::SetFocus(Focus::Search)),
            KeyCode::Char('x') => Some(Message::ClearCountry),
            _ => None,
        },
        Focus::Map => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
            KeyCode::Char('/') => Some(Message::SetFocus(Focus::Search)),
            KeyCode::Tab => Some(Message::SetFocus(Focus::Countries)),

            KeyCode::Char('[') => Some(Message::PrevYear),
            KeyCode::Char(']') => Some(Message::NextYear),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(Message::ToggleTheme),
            KeyCode::Char('x') => Some(Message::ClearCountry),

            // Pan with hjkl or arrow keys
            KeyCode::Left | KeyCode::Char('h') => map_action(|| map.pan(-10, 0)),
            KeyCode::Right | KeyCode::Char('l') => map_action(|| map.pan(10, 0)),
            KeyCode::Up | KeyCode::Char('k') => map_action(|| map.pan(0, -6)),
            KeyCode::Down | KeyCode::Char('j') => map_action(|| map.pan(0, 6)),

            KeyCode::Char('+') | KeyCode::Char('=') => map_action(|| map.zoom_in()),
            KeyCode::Char('-') | KeyCode::Char('_') => map_action(|| map.zoom_out()),
            KeyCode::Char('r') | KeyCode::Char('0') => map_action(|| map.home()),

            KeyCode::Char('b') | KeyCode::Char('B') => map_action(|| map.renderer.toggle_basemap()),
            KeyCode::Char('p') | KeyCode::Char('P') => map_action(|| map.renderer.toggle_layer()),
            _ => None,
        },
    }
}

fn map_action(action: impl FnOnce()) -> Option<Message> {
    action();
    None
}

/// Scroll zooms, drag pans, click selects the country under the cursor
fn handle_mouse(map: &mut MapView, mouse: MouseEvent) -> Option<Message> {
    match mouse.kind {
        MouseEventKind::ScrollUp => map.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => map.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => map.pan(-15, 0),
        MouseEventKind::ScrollRight => map.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => map.begin_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => map.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => {
            if map.end_drag() {
                return map
                    .feature_at(mouse.column, mouse.row)
                    .map(|(country, geometry)| Message::FeatureClicked { country, geometry });
            }
        }
        _ => {}
    }
    None
}
