//! Light/dark theme, its color palette, and the persisted preference.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Key of the theme entry in the state file
pub const THEME_KEY: &str = "populationAppTheme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Navbar toggle glyph: shows the theme a press switches to.
    /// Single-column so the navbar cell keeps its width.
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☼",
        }
    }

    pub fn palette(self) -> Palette {
        let (text, grid, background, border) = match self {
            Theme::Light => (
                Color::Rgb(0x2c, 0x3e, 0x50),
                Color::Rgb(0xc8, 0xc8, 0xc8),
                Color::Rgb(0xf5, 0xf5, 0xf5),
                Color::Gray,
            ),
            Theme::Dark => (
                Color::Rgb(0xe0, 0xe0, 0xe0),
                Color::Rgb(0x40, 0x40, 0x40),
                Color::Rgb(0x1a, 0x1a, 0x1a),
                Color::DarkGray,
            ),
        };
        Palette {
            primary: Color::Rgb(0x4a, 0x7c, 0x59),
            primary_dark: Color::Rgb(0x2d, 0x5a, 0x3d),
            text,
            grid,
            background,
            border,
            basemap: Basemap::for_theme(self),
        }
    }
}

/// Base layer style under the population layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Basemap {
    Gray,
    DarkGray,
}

impl Basemap {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Basemap::Gray,
            Theme::Dark => Basemap::DarkGray,
        }
    }

    pub fn coastline_color(self) -> Color {
        match self {
            Basemap::Gray => Color::Gray,
            Basemap::DarkGray => Color::DarkGray,
        }
    }

    pub fn layer_color(self) -> Color {
        match self {
            Basemap::Gray => Color::Rgb(0x4a, 0x7c, 0x59),
            Basemap::DarkGray => Color::Rgb(0x6f, 0xa8, 0x7f),
        }
    }

    pub fn highlight_color(self) -> Color {
        match self {
            Basemap::Gray => Color::Rgb(0xd3, 0x54, 0x00),
            Basemap::DarkGray => Color::Yellow,
        }
    }
}

/// Colors used by every rendering surface
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub primary: Color,
    pub primary_dark: Color,
    pub text: Color,
    pub grid: Color,
    pub background: Color,
    pub border: Color,
    pub basemap: Basemap,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("state file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to replace state file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Small key-value file that holds the theme preference
#[derive(Clone, Debug)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored theme, `Light` when missing or unreadable
    pub fn load(&self) -> Theme {
        if !self.path.exists() {
            return Theme::default();
        }
        match self.read_entries() {
            Ok(entries) => entries
                .get(THEME_KEY)
                .and_then(Value::as_str)
                .and_then(Theme::parse)
                .unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable state file");
                Theme::default()
            }
        }
    }

    /// Write the theme, keeping any other entries in the file
    pub fn save(&self, theme: Theme) -> Result<(), StoreError> {
        let mut entries = if self.path.exists() {
            self.read_entries().unwrap_or_default()
        } else {
            Map::new()
        };
        entries.insert(THEME_KEY.to_string(), Value::from(theme.as_str()));

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let temp_file = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, &entries)?;
            writer.flush()?;
        }
        temp_file.persist(&self.path)?;
        debug!(theme = theme.as_str(), "theme saved");
        Ok(())
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StoreError> {
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Span;
    use tempfile::tempdir;

    #[test]
    fn test_icons_are_one_column() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(Span::raw(theme.icon()).width(), 1, "{theme:?}");
        }
        assert_ne!(Theme::Light.icon(), Theme::Dark.icon());
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn test_basemap_follows_theme() {
        assert_eq!(Theme::Light.palette().basemap, Basemap::Gray);
        assert_eq!(Theme::Dark.palette().basemap, Basemap::DarkGray);
    }

    #[test]
    fn test_missing_file_defaults_to_light() {
        let dir = tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("state.json"));
        assert_eq!(store.load(), Theme::Light);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = ThemeStore::new(dir.path().join("nested/state.json"));
        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load(), Theme::Dark);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"populationAppTheme\": \"dark\""));
    }

    #[test]
    fn test_corrupt_file_defaults_to_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        let store = ThemeStore::new(&path);
        assert_eq!(store.load(), Theme::Light);

        // Saving over a corrupt file starts fresh
        store.save(Theme::Dark).unwrap();
        assert_eq!(store.load(), Theme::Dark);
    }

    #[test]
    fn test_unknown_value_defaults_to_light() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"populationAppTheme": "sepia"}"#).unwrap();
        assert_eq!(ThemeStore::new(&path).load(), Theme::Light);
    }
}
