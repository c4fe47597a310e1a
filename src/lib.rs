//! Terminal dashboard for world population, 1970-2022.
//!
//! Country records come from an ArcGIS feature service ([`source`]), are
//! aggregated in [`metrics`], formatted in [`format`], and drawn by [`ui`]
//! around a braille world map ([`map`]). [`app`] owns the view state.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod format;
pub mod map;
pub mod metrics;
pub mod source;
pub mod tasks;
pub mod theme;
pub mod ui;
