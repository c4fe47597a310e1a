//! Runs the effects returned by [`App::update`](crate::app::App::update).
//!
//! Fetches are spawned onto the tokio runtime and report back as
//! [`Message`]s on an unbounded channel drained by the UI loop. Map zooms
//! and theme writes happen inline on the caller's thread.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::app::{Effect, Message};
use crate::map::MapView;
use crate::source::RecordSource;
use crate::theme::ThemeStore;

pub struct EffectRunner {
    source: Arc<dyn RecordSource>,
    tx: UnboundedSender<Message>,
    store: ThemeStore,
}

impl EffectRunner {
    pub fn new(source: Arc<dyn RecordSource>, tx: UnboundedSender<Message>, store: ThemeStore) -> Self {
        Self { source, tx, store }
    }

    pub fn run_all(&self, effects: Vec<Effect>, map: &mut MapView) {
        for effect in effects {
            self.run(effect, map);
        }
    }

    /// Must be called from within a tokio runtime context
    pub fn run(&self, effect: Effect, map: &mut MapView) {
        match effect {
            Effect::FetchNames(generation) => {
                self.spawn(move |source| async move {
                    let result = source.fetch_all_country_names().await;
                    Message::NamesLoaded { generation, result }
                });
            }
            Effect::FetchRecords(generation) => {
                self.spawn(move |source| async move {
                    let result = source.fetch_all_records().await;
                    Message::RecordsLoaded { generation, result }
                });
            }
            Effect::FetchLayer(generation) => {
                self.spawn(move |source| async move {
                    let result = source.fetch_layer().await;
                    Message::LayerLoaded { generation, result }
                });
            }
            Effect::FetchCountry {
                generation,
                country,
                include_geometry,
            } => {
                self.spawn(move |source| async move {
                    let result = source.fetch_record(&country, include_geometry).await;
                    Message::CountryLoaded { generation, result }
                });
            }
            Effect::ShowLayer(features) => map.load_layer(features),
            Effect::ZoomTo(geometry) => {
                if let Err(e) = map.zoom_to(&geometry, Instant::now()) {
                    warn!(error = %e, "zoom skipped");
                }
            }
            Effect::PersistTheme(theme) => {
                if let Err(e) = self.store.save(theme) {
                    warn!(error = %e, path = %self.store.path().display(), "failed to save theme");
                }
            }
        }
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(Arc<dyn RecordSource>) -> Fut,
        Fut: std::future::Future<Output = Message> + Send + 'static,
    {
        let tx = self.tx.clone();
        let fut = job(Arc::clone(&self.source));
        tokio::spawn(async move {
            let message = fut.await;
            // Receiver gone means the UI has exited
            if tx.send(message).is_err() {
                debug!("result arrived after shutdown");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, CountryDetail};
    use crate::data::PopulationRecord;
    use crate::map::{GeometryHandle, ZoomOptions};
    use crate::source::memory::MemorySource;
    use crate::theme::Theme;
    use geojson::{Geometry, Value};
    use std::time::Duration;
    use tempfile::tempdir;
    use tokio::sync::mpsc;

    fn square(lon: f64, lat: f64) -> GeometryHandle {
        let ring = vec![
            vec![lon, lat],
            vec![lon + 5.0, lat],
            vec![lon + 5.0, lat + 5.0],
            vec![lon, lat + 5.0],
            vec![lon, lat],
        ];
        GeometryHandle::new(Geometry::new(Value::Polygon(vec![ring])))
    }

    fn source(slow: &str) -> MemorySource {
        let mut source = MemorySource::new(vec![
            PopulationRecord::new("Xland").with(2020, 10).with(2022, 11),
            PopulationRecord::new("Yland").with(2020, 20).with(2022, 22),
        ]);
        source.geometries.insert("Xland".to_string(), square(0.0, 0.0));
        source.geometries.insert("Yland".to_string(), square(20.0, 20.0));
        source.delays.insert(slow.to_string(), Duration::from_millis(80));
        source
    }

    fn map() -> MapView {
        let mut map = MapView::new(ZoomOptions::default());
        map.set_area(ratatui::layout::Rect::new(0, 0, 80, 24));
        map
    }

    /// Select X then Y, with `slow` answering last, and return the final state
    async fn select_both(slow: &str) -> (App, MapView) {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(
            Arc::new(source(slow)),
            tx,
            ThemeStore::new(dir.path().join("state.json")),
        );
        let mut app = App::new(Theme::Light);
        let mut map = map();

        let effects = app.update(Message::SelectCountry("Xland".to_string()));
        runner.run_all(effects, &mut map);
        let effects = app.update(Message::SelectCountry("Yland".to_string()));
        runner.run_all(effects, &mut map);

        for _ in 0..2 {
            let message = rx.recv().await.unwrap();
            let effects = app.update(message);
            runner.run_all(effects, &mut map);
        }
        (app, map)
    }

    #[tokio::test]
    async fn test_late_stale_result_is_ignored() {
        let (app, mut map) = select_both("Xland").await;
        assert!(matches!(&app.detail, CountryDetail::Loaded(r) if r.country == "Yland"));
        assert!(map.is_animating());

        // The map settles on Yland, not Xland
        map.tick(Instant::now() + Duration::from_secs(5));
        assert!((20.0..25.0).contains(&map.viewport.center_lon));
        assert!((20.0..25.0).contains(&map.viewport.center_lat));
    }

    #[tokio::test]
    async fn test_early_stale_result_is_ignored() {
        let (app, _) = select_both("Yland").await;
        assert!(matches!(&app.detail, CountryDetail::Loaded(r) if r.country == "Yland"));
    }

    #[tokio::test]
    async fn test_startup_loads() {
        let dir = tempdir().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(
            Arc::new(source("none")),
            tx,
            ThemeStore::new(dir.path().join("state.json")),
        );
        let mut app = App::new(Theme::Light);
        let mut map = map();

        let effects = app.start();
        runner.run_all(effects, &mut map);
        for _ in 0..3 {
            let message = rx.recv().await.unwrap();
            let effects = app.update(message);
            runner.run_all(effects, &mut map);
        }

        assert_eq!(app.filtered_countries(), vec!["Xland", "Yland"]);
        assert_eq!(app.selected_population(), Some(33));
        assert_eq!(map.layer().len(), 2);
    }

    #[tokio::test]
    async fn test_theme_persisted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let (tx, _rx) = mpsc::unbounded_channel();
        let runner = EffectRunner::new(Arc::new(source("none")), tx, ThemeStore::new(&path));
        let mut app = App::new(Theme::Light);

        let effects = app.update(Message::ToggleTheme);
        runner.run_all(effects, &mut map());
        assert_eq!(ThemeStore::new(&path).load(), Theme::Dark);
    }
}
