//! Basemap coastlines from Natural Earth GeoJSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use tracing::{debug, warn};

use crate::map::{Lod, MapRenderer};

/// Coastline files looked up in the data directory, per level of detail
const COASTLINE_FILES: [(&str, Lod); 4] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("natural-earth.json", Lod::Medium),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

/// Load every coastline file present in `data_dir`, then fall back to the
/// built-in outlines if nothing was loaded
pub fn load_basemap(renderer: &mut MapRenderer, data_dir: &Path) {
    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match load_coastlines(renderer, &path, lod) {
            Ok(count) => debug!(file = filename, lines = count, "coastlines loaded"),
            Err(e) => warn!(file = filename, error = %e, "failed to load coastlines"),
        }
    }

    if !renderer.has_data() {
        debug!("no coastline files found, using simplified outlines");
        generate_simple_world(renderer);
    }
}

/// Load one coastline GeoJSON file, returning the number of lines added
fn load_coastlines(renderer: &mut MapRenderer, path: &Path, lod: Lod) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = content.parse()?;
    let mut count = 0;
    process_geojson_lines(&geojson, |line| {
        renderer.add_coastline(line, lod);
        count += 1;
    });
    Ok(count)
}

/// Process GeoJSON and extract line features
fn process_geojson_lines<F>(geojson: &GeoJson, mut add_line: F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(ref geometry) = feature.geometry {
                    process_geometry_lines(geometry, &mut add_line);
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(ref geometry) = f.geometry {
                process_geometry_lines(geometry, &mut add_line);
            }
        }
        GeoJson::Geometry(geometry) => {
            process_geometry_lines(geometry, &mut add_line);
        }
    }
}

fn to_line(coords: &[Vec<f64>]) -> Vec<(f64, f64)> {
    coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
}

fn process_geometry_lines<F>(geometry: &Geometry, add_line: &mut F)
where
    F: FnMut(Vec<(f64, f64)>),
{
    match &geometry.value {
        Value::LineString(coords) => add_line(to_line(coords)),
        Value::MultiLineString(lines) => {
            for coords in lines {
                add_line(to_line(coords));
            }
        }
        Value::Polygon(rings) => {
            if let Some(exterior) = rings.first() {
                add_line(to_line(exterior));
            }
        }
        Value::MultiPolygon(polygons) => {
            for exterior in polygons.iter().filter_map(|rings| rings.first()) {
                add_line(to_line(exterior));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                process_geometry_lines(g, add_line);
            }
        }
        _ => {}
    }
}

/// Add the built-in continent outlines at the lowest level of detail
pub fn generate_simple_world(renderer: &mut MapRenderer) {
    for outline in SIMPLE_WORLD {
        renderer.add_coastline(outline.to_vec(), Lod::Low);
    }
}

/// Simplified continent outlines, used when no coastline files are present
const SIMPLE_WORLD: &[&[(f64, f64)]] = &[
    &[
        (-168.0, 65.0), (-166.0, 60.0), (-141.0, 60.0), (-130.0, 55.0),
        (-125.0, 48.0), (-124.0, 40.0), (-117.0, 32.0), (-110.0, 25.0),
        (-97.0, 25.0), (-97.0, 28.0), (-82.0, 24.0), (-80.0, 25.0),
        (-81.0, 31.0), (-75.0, 35.0), (-70.0, 41.0), (-67.0, 45.0),
        (-65.0, 47.0), (-55.0, 47.0), (-52.0, 47.0), (-55.0, 52.0),
        (-58.0, 55.0), (-64.0, 60.0), (-73.0, 62.0), (-80.0, 63.0),
        (-95.0, 62.0), (-110.0, 68.0), (-130.0, 70.0), (-145.0, 70.0),
        (-168.0, 65.0),
    ],
    &[
        (-80.0, 10.0), (-75.0, 5.0), (-70.0, 5.0), (-60.0, 5.0),
        (-50.0, 0.0), (-35.0, -5.0), (-35.0, -10.0), (-38.0, -15.0),
        (-40.0, -22.0), (-48.0, -25.0), (-55.0, -34.0), (-58.0, -38.0),
        (-65.0, -42.0), (-68.0, -50.0), (-75.0, -52.0), (-75.0, -45.0),
        (-72.0, -40.0), (-72.0, -30.0), (-70.0, -20.0), (-70.0, -15.0),
        (-80.0, -5.0), (-80.0, 0.0), (-80.0, 10.0),
    ],
    &[
        (-10.0, 36.0), (-5.0, 36.0), (0.0, 38.0), (5.0, 43.0),
        (10.0, 44.0), (15.0, 45.0), (20.0, 40.0), (25.0, 37.0),
        (30.0, 40.0), (35.0, 42.0), (40.0, 43.0), (40.0, 55.0),
        (30.0, 60.0), (25.0, 65.0), (20.0, 70.0), (10.0, 71.0),
        (5.0, 62.0), (5.0, 58.0), (-5.0, 58.0), (-10.0, 52.0),
        (-5.0, 48.0), (-5.0, 43.0), (-10.0, 36.0),
    ],
    &[
        (-17.0, 15.0), (-15.0, 10.0), (-10.0, 5.0), (0.0, 5.0),
        (10.0, 5.0), (15.0, 0.0), (20.0, -5.0), (25.0, -10.0),
        (35.0, -20.0), (35.0, -25.0), (30.0, -30.0), (20.0, -35.0),
        (18.0, -35.0), (15.0, -30.0), (10.0, -15.0), (10.0, 0.0),
        (5.0, 5.0), (-5.0, 5.0), (-10.0, 10.0), (-17.0, 15.0),
    ],
    &[
        (-17.0, 15.0), (-17.0, 20.0), (-15.0, 28.0), (-5.0, 35.0),
        (10.0, 37.0), (20.0, 33.0), (25.0, 32.0), (35.0, 30.0),
        (35.0, 20.0), (42.0, 12.0), (50.0, 12.0), (45.0, 5.0),
        (35.0, -5.0), (35.0, -20.0),
    ],
    &[
        (35.0, 42.0), (40.0, 43.0), (50.0, 40.0), (55.0, 37.0),
        (60.0, 25.0), (65.0, 25.0), (70.0, 20.0), (75.0, 15.0),
        (80.0, 8.0), (80.0, 15.0), (88.0, 22.0), (92.0, 22.0),
        (95.0, 16.0), (100.0, 14.0), (105.0, 10.0), (110.0, 20.0),
        (115.0, 22.0), (120.0, 22.0), (122.0, 25.0), (125.0, 30.0),
        (130.0, 35.0), (135.0, 35.0), (140.0, 40.0), (145.0, 45.0),
        (145.0, 50.0), (140.0, 55.0), (135.0, 55.0), (130.0, 52.0),
        (130.0, 43.0), (120.0, 40.0), (110.0, 45.0), (90.0, 50.0),
        (70.0, 55.0), (60.0, 55.0), (50.0, 50.0), (40.0, 43.0),
    ],
    &[
        (115.0, -20.0), (120.0, -18.0), (130.0, -12.0), (140.0, -12.0),
        (145.0, -15.0), (150.0, -25.0), (153.0, -30.0), (150.0, -35.0),
        (145.0, -38.0), (140.0, -38.0), (135.0, -35.0), (130.0, -32.0),
        (125.0, -32.0), (115.0, -35.0), (115.0, -25.0), (115.0, -20.0),
    ],
];
