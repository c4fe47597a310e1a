//! Dashboard state and the transitions between states.
//!
//! [`App::update`] is a reducer: it takes a [`Message`], mutates the state
//! and returns the [`Effect`]s the caller must run (fetches, map zooms,
//! theme persistence). Every fetch carries the [`Generation`] current when
//! it was issued; results from older generations are dropped, so rapid
//! re-selection can never leave stale data on screen.

use tracing::{debug, info, warn};

use crate::data::{PopulationRecord, Year, YEARS};
use crate::map::GeometryHandle;
use crate::metrics::{
    compute_top_n, compute_world_totals, country_growth, country_trend, has_any_data, world_growth,
    world_trend, WorldAggregate, TOP_N,
};
use crate::source::{CountryFeature, SourceError};
use crate::theme::Theme;

/// Suggestions listed under the search box
pub const MAX_SUGGESTIONS: usize = 5;

/// Request counter for one selection axis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    fn bump(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

/// Why the sidebar shows "no data" for a selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoDataReason {
    /// The service could not be reached or answered with an error
    SourceUnavailable,
    /// No record matches the country
    NotFound,
    /// A record exists but every year is absent or zero
    NoUsableData,
}

/// Detail of the selected country
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CountryDetail {
    #[default]
    None,
    Loading,
    Loaded(PopulationRecord),
    NoData(NoDataReason),
}

/// Load state of a full-set query
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Load<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed,
}

impl<T> Load<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }
}

/// Which widget receives keyboard input
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Map,
    Search,
    Countries,
}

/// User selections. Changed only by explicit user actions.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionState {
    /// `None` means the world aggregate view
    pub selected_country: Option<String>,
    pub selected_year: Year,
    pub theme: Theme,
    pub search: String,
}

#[derive(Debug)]
pub enum Message {
    SelectCountry(String),
    /// Click on a country in the map layer
    FeatureClicked {
        country: String,
        geometry: GeometryHandle,
    },
    ClearCountry,
    SelectYear(Year),
    NextYear,
    PrevYear,
    ToggleTheme,
    SetFocus(Focus),
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    SuggestionUp,
    SuggestionDown,
    AcceptSuggestion,
    ListUp,
    ListDown,
    ListSelect,
    Quit,
    NamesLoaded {
        generation: Generation,
        result: Result<Vec<String>, SourceError>,
    },
    RecordsLoaded {
        generation: Generation,
        result: Result<Vec<PopulationRecord>, SourceError>,
    },
    LayerLoaded {
        generation: Generation,
        result: Result<Vec<(String, GeometryHandle)>, SourceError>,
    },
    CountryLoaded {
        generation: Generation,
        result: Result<Option<CountryFeature>, SourceError>,
    },
}

/// Work requested by a transition, run by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchNames(Generation),
    FetchRecords(Generation),
    FetchLayer(Generation),
    FetchCountry {
        generation: Generation,
        country: String,
        include_geometry: bool,
    },
    /// Hand a layer to the map
    ShowLayer(Vec<(String, GeometryHandle)>),
    ZoomTo(GeometryHandle),
    PersistTheme(Theme),
}

#[derive(Clone, Copy, Debug, Default)]
struct Generations {
    names: Generation,
    records: Generation,
    layer: Generation,
    country: Generation,
}

/// Application state
pub struct App {
    pub selection: SelectionState,
    pub focus: Focus,
    pub names: Load<Vec<String>>,
    pub records: Load<Vec<PopulationRecord>>,
    pub detail: CountryDetail,
    pub should_quit: bool,
    world: Option<WorldAggregate>,
    top_n: Vec<(String, u64)>,
    suggestion_cursor: Option<usize>,
    list_cursor: usize,
    generations: Generations,
    closed: bool,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            selection: SelectionState {
                selected_country: None,
                selected_year: Year::latest(),
                theme,
                search: String::new(),
            },
            focus: Focus::Map,
            names: Load::Idle,
            records: Load::Idle,
            detail: CountryDetail::None,
            should_quit: false,
            world: None,
            top_n: Vec::new(),
            suggestion_cursor: None,
            list_cursor: 0,
            generations: Generations::default(),
            closed: false,
        }
    }

    /// Initial loads: country names, the full record set, the map layer
    pub fn start(&mut self) -> Vec<Effect> {
        self.names = Load::Loading;
        self.records = Load::Loading;
        vec![
            Effect::FetchNames(self.generations.names.bump()),
            Effect::FetchRecords(self.generations.records.bump()),
            Effect::FetchLayer(self.generations.layer.bump()),
        ]
    }

    /// Stop applying fetch results. Anything still in flight is dropped.
    pub fn shutdown(&mut self) {
        self.closed = true;
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::SelectCountry(country) => self.select_country(country, true),
            Message::FeatureClicked { country, geometry } => {
                let mut effects = vec![Effect::ZoomTo(geometry)];
                effects.extend(self.select_country(country, false));
                effects
            }
            Message::ClearCountry => {
                self.generations.country.bump();
                self.selection.selected_country = None;
                self.detail = CountryDetail::None;
                Vec::new()
            }
            Message::SelectYear(year) => {
                self.select_year(year);
                Vec::new()
            }
            Message::NextYear => {
                self.select_year(self.selection.selected_year.next());
                Vec::new()
            }
            Message::PrevYear => {
                self.select_year(self.selection.selected_year.prev());
                Vec::new()
            }
            Message::ToggleTheme => {
                self.selection.theme = self.selection.theme.toggled();
                debug!(theme = self.selection.theme.as_str(), "theme toggled");
                vec![Effect::PersistTheme(self.selection.theme)]
            }
            Message::SetFocus(focus) => {
                self.focus = focus;
                Vec::new()
            }
            Message::SearchInput(c) => {
                self.selection.search.push(c);
                self.search_changed();
                Vec::new()
            }
            Message::SearchBackspace => {
                self.selection.search.pop();
                self.search_changed();
                Vec::new()
            }
            Message::SearchClear => {
                self.selection.search.clear();
                self.search_changed();
                Vec::new()
            }
            Message::SuggestionUp => {
                self.suggestion_cursor = match self.suggestion_cursor {
                    Some(0) | None => None,
                    Some(i) => Some(i - 1),
                };
                Vec::new()
            }
            Message::SuggestionDown => {
                let count = self.suggestions().len();
                if count > 0 {
                    self.suggestion_cursor = Some(match self.suggestion_cursor {
                        None => 0,
                        Some(i) => (i + 1).min(count - 1),
                    });
                }
                Vec::new()
            }
            Message::AcceptSuggestion => {
                let suggestions = self.suggestions();
                let pick = suggestions
                    .get(self.suggestion_cursor.unwrap_or(0))
                    .map(|s| s.to_string());
                match pick {
                    Some(country) => {
                        self.selection.search.clear();
                        self.search_changed();
                        self.focus = Focus::Map;
                        self.select_country(country, true)
                    }
                    None => Vec::new(),
                }
            }
            Message::ListUp => {
                self.list_cursor = self.list_cursor.saturating_sub(1);
                Vec::new()
            }
            Message::ListDown => {
                let count = self.filtered_countries().len();
                if count > 0 {
                    self.list_cursor = (self.list_cursor + 1).min(count - 1);
                }
                Vec::new()
            }
            Message::ListSelect => {
                let pick = self
                    .filtered_countries()
                    .get(self.list_cursor)
                    .map(|s| s.to_string());
                match pick {
                    Some(country) => self.select_country(country, true),
                    None => Vec::new(),
                }
            }
            Message::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Message::NamesLoaded { generation, result } => {
                if self.is_stale(generation, self.generations.names, "names") {
                    return Vec::new();
                }
                self.names = match result {
                    Ok(names) => Load::Ready(names),
                    Err(e) => {
                        warn!(error = %e, "failed to fetch country names");
                        Load::Failed
                    }
                };
                self.list_cursor = 0;
                Vec::new()
            }
            Message::RecordsLoaded { generation, result } => {
                if self.is_stale(generation, self.generations.records, "records") {
                    return Vec::new();
                }
                match result {
                    Ok(records) => {
                        let world = compute_world_totals(&records, &YEARS);
                        info!(
                            records = records.len(),
                            total = world.get(Year::latest()).unwrap_or(0),
                            "world totals computed"
                        );
                        self.world = Some(world);
                        self.top_n = compute_top_n(&records, self.selection.selected_year, TOP_N);
                        self.records = Load::Ready(records);
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to fetch population records");
                        self.records = Load::Failed;
                    }
                }
                Vec::new()
            }
            Message::LayerLoaded { generation, result } => {
                if self.is_stale(generation, self.generations.layer, "layer") {
                    return Vec::new();
                }
                match result {
                    Ok(layer) => vec![Effect::ShowLayer(layer)],
                    Err(e) => {
                        warn!(error = %e, "failed to load map layer");
                        Vec::new()
                    }
                }
            }
            Message::CountryLoaded { generation, result } => {
                if self.is_stale(generation, self.generations.country, "country") {
                    return Vec::new();
                }
                self.country_loaded(result)
            }
        }
    }

    fn is_stale(&self, generation: Generation, current: Generation, what: &str) -> bool {
        if self.closed || generation != current {
            debug!(what, ?generation, ?current, closed = self.closed, "dropping stale result");
            return true;
        }
        false
    }

    fn select_country(&mut self, country: String, include_geometry: bool) -> Vec<Effect> {
        let country = country.trim().to_string();
        if country.is_empty() {
            return self.update(Message::ClearCountry);
        }

        debug!(country = %country, "country selected");
        self.selection.selected_country = Some(country.clone());
        self.detail = CountryDetail::Loading;
        vec![Effect::FetchCountry {
            generation: self.generations.country.bump(),
            country,
            include_geometry,
        }]
    }

    fn country_loaded(&mut self, result: Result<Option<CountryFeature>, SourceError>) -> Vec<Effect> {
        let country = self.selection.selected_country.as_deref().unwrap_or_default();
        match result {
            Err(e) => {
                warn!(country, error = %e, "failed to fetch country");
                self.detail = CountryDetail::NoData(NoDataReason::SourceUnavailable);
                Vec::new()
            }
            Ok(None) => {
                info!(country, "no record for country");
                self.detail = CountryDetail::NoData(NoDataReason::NotFound);
                Vec::new()
            }
            Ok(Some(feature)) if !has_any_data(&feature.record, &YEARS) => {
                info!(country, "country has no usable values");
                self.detail = CountryDetail::NoData(NoDataReason::NoUsableData);
                Vec::new()
            }
            Ok(Some(CountryFeature { record, geometry })) => {
                self.detail = CountryDetail::Loaded(record);
                geometry.map(Effect::ZoomTo).into_iter().collect()
            }
        }
    }

    fn select_year(&mut self, year: Year) {
        if year.index().is_none() {
            warn!(%year, "ignoring year outside the dataset");
            return;
        }
        self.selection.selected_year = year;
        if let Some(records) = self.records.ready() {
            self.top_n = compute_top_n(records, year, TOP_N);
        }
    }

    fn search_changed(&mut self) {
        self.suggestion_cursor = None;
        self.list_cursor = 0;
    }

    /// Country names containing the search text, case-insensitively
    pub fn filtered_countries(&self) -> Vec<&str> {
        let needle = self.selection.search.to_lowercase();
        self.names
            .ready()
            .map(|names| {
                names
                    .iter()
                    .filter(|n| n.to_lowercase().contains(&needle))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Search box suggestions, none while the box is empty
    pub fn suggestions(&self) -> Vec<&str> {
        if self.selection.search.trim().is_empty() {
            return Vec::new();
        }
        let mut matches = self.filtered_countries();
        matches.truncate(MAX_SUGGESTIONS);
        matches
    }

    pub fn suggestion_cursor(&self) -> Option<usize> {
        self.suggestion_cursor
    }

    pub fn list_cursor(&self) -> usize {
        self.list_cursor
    }

    pub fn world(&self) -> Option<&WorldAggregate> {
        self.world.as_ref()
    }

    /// Top-N ranking for the selected year
    pub fn top_n(&self) -> &[(String, u64)] {
        &self.top_n
    }

    /// Population shown in the sidebar: the selected country, or the world
    pub fn selected_population(&self) -> Option<u64> {
        let year = self.selection.selected_year;
        match (&self.selection.selected_country, &self.detail) {
            (Some(_), CountryDetail::Loaded(record)) => record.get(year),
            (Some(_), _) => None,
            (None, _) => self.world.as_ref().and_then(|w| w.get(year)),
        }
    }

    /// Growth from the previous sampled year for the current view
    pub fn growth_rate(&self) -> Option<f64> {
        let year = self.selection.selected_year;
        match (&self.selection.selected_country, &self.detail) {
            (Some(_), CountryDetail::Loaded(record)) => country_growth(record, year, &YEARS),
            (Some(_), _) => None,
            (None, _) => self.world.as_ref().and_then(|w| world_growth(w, year, &YEARS)),
        }
    }

    /// Line chart series for the current view
    pub fn trend(&self) -> Vec<(Year, u64)> {
        match (&self.selection.selected_country, &self.detail) {
            (Some(_), CountryDetail::Loaded(record)) => country_trend(record, &YEARS),
            (Some(_), _) => Vec::new(),
            (None, _) => self.world.as_ref().map(|w| world_trend(w, &YEARS)).unwrap_or_default(),
        }
    }

    pub fn no_data_reason(&self) -> Option<NoDataReason> {
        match self.detail {
            CountryDetail::NoData(reason) => Some(reason),
            _ => None,
        }
    }

    /// Title for the info boxes and trend chart
    pub fn view_label(&self) -> &str {
        self.selection.selected_country.as_deref().unwrap_or("World")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::{Geometry, Value};

    fn records() -> Vec<PopulationRecord> {
        vec![
            PopulationRecord::new("Aland").with(1970, 100).with(2020, 200).with(2022, 300),
            PopulationRecord::new("Borduria").with(1970, 50).with(2020, 60).with(2022, 50),
        ]
    }

    fn geometry() -> GeometryHandle {
        let ring = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]];
        GeometryHandle::new(Geometry::new(Value::Polygon(vec![ring])))
    }

    fn loaded_app() -> App {
        let mut app = App::new(Theme::Light);
        let effects = app.start();
        assert_eq!(effects.len(), 3);
        app.update(Message::RecordsLoaded {
            generation: Generation(1),
            result: Ok(records()),
        });
        app.update(Message::NamesLoaded {
            generation: Generation(1),
            result: Ok(vec!["Aland".to_string(), "Borduria".to_string(), "Syldavia".to_string()]),
        });
        app
    }

    fn fetch_generation(effects: &[Effect]) -> Generation {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::FetchCountry { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("a country fetch")
    }

    fn found(country: &str, app_records: &[PopulationRecord]) -> Result<Option<CountryFeature>, SourceError> {
        Ok(app_records
            .iter()
            .find(|r| r.country == country)
            .map(|r| CountryFeature {
                record: r.clone(),
                geometry: Some(geometry()),
            }))
    }

    #[test]
    fn test_defaults() {
        let app = App::new(Theme::Dark);
        assert_eq!(app.selection.selected_year, Year(2022));
        assert_eq!(app.selection.selected_country, None);
        assert_eq!(app.selection.theme, Theme::Dark);
        assert_eq!(app.view_label(), "World");
    }

    #[test]
    fn test_records_loaded_builds_world_view() {
        let app = loaded_app();
        assert_eq!(app.world().and_then(|w| w.get(Year(2022))), Some(350));
        assert_eq!(app.selected_population(), Some(350));
        assert_eq!(app.growth_rate(), Some(34.62)); // 260 -> 350
        assert_eq!(app.top_n()[0], ("Aland".to_string(), 300));
        assert_eq!(app.trend().len(), YEARS.len());
    }

    #[test]
    fn test_select_year_needs_no_fetch() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectYear(Year(1970)));
        assert!(effects.is_empty());
        assert_eq!(app.selection.selected_year, Year(1970));
        assert_eq!(app.top_n()[1], ("Borduria".to_string(), 50));
        assert_eq!(app.growth_rate(), None);
        assert_eq!(app.selected_population(), Some(150));
    }

    #[test]
    fn test_select_year_outside_dataset_is_ignored() {
        let mut app = loaded_app();
        app.update(Message::SelectYear(Year(1999)));
        assert_eq!(app.selection.selected_year, Year(2022));
    }

    #[test]
    fn test_select_country_fetches_and_zooms() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectCountry("Aland".to_string()));
        assert_eq!(app.detail, CountryDetail::Loading);
        assert!(matches!(
            &effects[0],
            Effect::FetchCountry { country, include_geometry: true, .. } if country == "Aland"
        ));

        let effects = app.update(Message::CountryLoaded {
            generation: fetch_generation(&effects),
            result: found("Aland", &records()),
        });
        assert_eq!(effects, vec![Effect::ZoomTo(geometry())]);
        assert_eq!(app.selected_population(), Some(300));
        assert_eq!(app.growth_rate(), Some(50.0));
        assert_eq!(app.view_label(), "Aland");
    }

    #[test]
    fn test_country_not_found() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectCountry("Syldavia".to_string()));
        let effects = app.update(Message::CountryLoaded {
            generation: fetch_generation(&effects),
            result: Ok(None),
        });
        assert!(effects.is_empty());
        assert_eq!(app.no_data_reason(), Some(NoDataReason::NotFound));
        assert_eq!(app.selected_population(), None);
        assert!(app.trend().is_empty());
    }

    #[test]
    fn test_zero_value_shows_no_population_and_no_growth() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectCountry("Fading".to_string()));
        let record = PopulationRecord::new("Fading").with(2020, 100).with(2022, 0);
        app.update(Message::CountryLoaded {
            generation: fetch_generation(&effects),
            result: Ok(Some(CountryFeature {
                record,
                geometry: None,
            })),
        });
        assert!(matches!(app.detail, CountryDetail::Loaded(_)));
        assert_eq!(crate::format::format_population(app.selected_population()), "N/A");
        assert_eq!(app.growth_rate(), None);

        app.update(Message::SelectYear(Year(2020)));
        assert_eq!(app.selected_population(), Some(100));
    }

    #[test]
    fn test_country_without_usable_values() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectCountry("Ghost".to_string()));
        let empty = PopulationRecord::new("Ghost").with(1970, 0);
        let effects = app.update(Message::CountryLoaded {
            generation: fetch_generation(&effects),
            result: Ok(Some(CountryFeature {
                record: empty,
                geometry: Some(geometry()),
            })),
        });
        // No zoom for an empty record
        assert!(effects.is_empty());
        assert_eq!(app.no_data_reason(), Some(NoDataReason::NoUsableData));
    }

    #[test]
    fn test_source_failure_is_local() {
        let mut app = loaded_app();
        let effects = app.update(Message::SelectCountry("Aland".to_string()));
        app.update(Message::CountryLoaded {
            generation: fetch_generation(&effects),
            result: Err(SourceError::Unavailable("connection refused".to_string())),
        });
        assert_eq!(app.no_data_reason(), Some(NoDataReason::SourceUnavailable));
        // Other state is untouched
        assert_eq!(app.selection.selected_country.as_deref(), Some("Aland"));
        assert_eq!(app.top_n().len(), 2);
    }

    #[test]
    fn test_stale_country_result_is_dropped() {
        let mut app = loaded_app();
        let first = fetch_generation(&app.update(Message::SelectCountry("Aland".to_string())));
        let second = fetch_generation(&app.update(Message::SelectCountry("Borduria".to_string())));
        assert!(second > first);

        // Newer answer first, then the stale one
        app.update(Message::CountryLoaded {
            generation: second,
            result: found("Borduria", &records()),
        });
        let effects = app.update(Message::CountryLoaded {
            generation: first,
            result: found("Aland", &records()),
        });
        assert!(effects.is_empty());
        assert_eq!(app.selected_population(), Some(50));

        // Stale answer first, then the current one
        let mut app = loaded_app();
        let first = fetch_generation(&app.update(Message::SelectCountry("Aland".to_string())));
        let second = fetch_generation(&app.update(Message::SelectCountry("Borduria".to_string())));
        app.update(Message::CountryLoaded {
            generation: first,
            result: found("Aland", &records()),
        });
        assert_eq!(app.detail, CountryDetail::Loading);
        app.update(Message::CountryLoaded {
            generation: second,
            result: found("Borduria", &records()),
        });
        assert_eq!(app.selected_population(), Some(50));
    }

    #[test]
    fn test_clear_country_drops_pending_fetch() {
        let mut app = loaded_app();
        let generation = fetch_generation(&app.update(Message::SelectCountry("Aland".to_string())));
        app.update(Message::ClearCountry);
        app.update(Message::CountryLoaded {
            generation,
            result: found("Aland", &records()),
        });
        assert_eq!(app.detail, CountryDetail::None);
        assert_eq!(app.selected_population(), Some(350));
    }

    #[test]
    fn test_shutdown_drops_everything() {
        let mut app = App::new(Theme::Light);
        app.start();
        app.shutdown();
        app.update(Message::RecordsLoaded {
            generation: Generation(1),
            result: Ok(records()),
        });
        assert!(app.world().is_none());
        assert!(app.records.is_loading());
    }

    #[test]
    fn test_feature_click_zooms_immediately() {
        let mut app = loaded_app();
        let effects = app.update(Message::FeatureClicked {
            country: "Borduria".to_string(),
            geometry: geometry(),
        });
        assert_eq!(effects[0], Effect::ZoomTo(geometry()));
        assert!(matches!(
            &effects[1],
            Effect::FetchCountry { include_geometry: false, .. }
        ));
    }

    #[test]
    fn test_toggle_theme_persists() {
        let mut app = loaded_app();
        let effects = app.update(Message::ToggleTheme);
        assert_eq!(effects, vec![Effect::PersistTheme(Theme::Dark)]);
        assert_eq!(app.selection.theme, Theme::Dark);
        // No refetch, derived data unchanged
        assert_eq!(app.top_n().len(), 2);
    }

    #[test]
    fn test_search_suggestions() {
        let mut app = loaded_app();
        assert!(app.suggestions().is_empty());
        for c in "AL".chars() {
            app.update(Message::SearchInput(c));
        }
        assert_eq!(app.suggestions(), vec!["Aland"]);

        app.update(Message::SearchClear);
        app.update(Message::SearchInput('a'));
        assert_eq!(app.suggestions(), vec!["Aland", "Borduria", "Syldavia"]);

        app.update(Message::SuggestionDown);
        app.update(Message::SuggestionDown);
        let effects = app.update(Message::AcceptSuggestion);
        assert_eq!(app.selection.selected_country.as_deref(), Some("Borduria"));
        assert!(app.selection.search.is_empty());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_suggestions_are_capped() {
        let mut app = App::new(Theme::Light);
        app.start();
        app.update(Message::NamesLoaded {
            generation: Generation(1),
            result: Ok((0..12).map(|i| format!("Land {i}")).collect()),
        });
        app.update(Message::SearchInput('l'));
        assert_eq!(app.suggestions().len(), MAX_SUGGESTIONS);
        assert_eq!(app.filtered_countries().len(), 12);
    }

    #[test]
    fn test_list_navigation() {
        let mut app = loaded_app();
        app.update(Message::ListDown);
        app.update(Message::ListDown);
        app.update(Message::ListDown);
        assert_eq!(app.list_cursor(), 2);
        app.update(Message::ListUp);
        let effects = app.update(Message::ListSelect);
        assert_eq!(app.selection.selected_country.as_deref(), Some("Borduria"));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_names_failure() {
        let mut app = App::new(Theme::Light);
        app.start();
        app.update(Message::NamesLoaded {
            generation: Generation(1),
            result: Err(SourceError::Status(503)),
        });
        assert_eq!(app.names, Load::Failed);
        assert!(app.filtered_countries().is_empty());
    }
}
