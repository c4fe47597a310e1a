use std::sync::Arc;

use geojson::{Geometry, Value};

use crate::map::renderer::LineString;
use crate::map::spatial::FeatureGrid;

/// Grid cell size for the layer index, in degrees
const LAYER_CELL_DEGREES: f64 = 10.0;

/// Geographic bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Scale width and height by `factor` around the center
    pub fn expand(&self, factor: f64) -> Self {
        let (cx, cy) = self.center();
        let half_w = (self.max_lon - self.min_lon) * factor / 2.0;
        let half_h = (self.max_lat - self.min_lat) * factor / 2.0;
        Self {
            min_lon: cx - half_w,
            min_lat: (cy - half_h).max(-85.0),
            max_lon: cx + half_w,
            max_lat: (cy + half_h).min(85.0),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Outline of one country as returned by the feature service.
/// Only the map looks inside; everything else passes it along.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryHandle(Arc<Geometry>);

impl GeometryHandle {
    pub fn new(geometry: Geometry) -> Self {
        Self(Arc::new(geometry))
    }

    /// Polygons as lists of rings (exterior first), lon/lat pairs
    pub fn polygons(&self) -> Vec<Vec<LineString>> {
        let mut polygons = Vec::new();
        collect_polygons(&self.0, &mut polygons);
        polygons
    }

    /// Bounding box of every vertex, `None` for empty or non-areal geometry
    pub fn extent(&self) -> Option<Extent> {
        extent_of(&self.polygons())
    }

    /// Even-odd point-in-polygon over every polygon
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons()
            .iter()
            .any(|rings| point_in_rings(lon, lat, rings))
    }
}

fn to_ring(coords: &[Vec<f64>]) -> LineString {
    coords
        .iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

fn collect_polygons(geometry: &Geometry, out: &mut Vec<Vec<LineString>>) {
    match &geometry.value {
        Value::Polygon(rings) => {
            out.push(rings.iter().map(|r| to_ring(r)).collect());
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.push(rings.iter().map(|r| to_ring(r)).collect());
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect_polygons(g, out);
            }
        }
        _ => {}
    }
}

fn extent_of(polygons: &[Vec<LineString>]) -> Option<Extent> {
    let mut points = polygons.iter().flatten().flatten();
    let &(lon, lat) = points.next()?;
    let init = Extent {
        min_lon: lon,
        min_lat: lat,
        max_lon: lon,
        max_lat: lat,
    };
    Some(points.fold(init, |e, &(lon, lat)| Extent {
        min_lon: e.min_lon.min(lon),
        min_lat: e.min_lat.min(lat),
        max_lon: e.max_lon.max(lon),
        max_lat: e.max_lat.max(lat),
    }))
}

/// Ray casting across all rings, so holes cancel out
fn point_in_rings(lon: f64, lat: f64, rings: &[LineString]) -> bool {
    let mut inside = false;
    for ring in rings {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = ring[i];
            let (xj, yj) = ring[j];
            if (yi > lat) != (yj > lat) && lon < (xj - xi) * (lat - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

/// A country on the population layer
pub struct CountryShape {
    pub name: String,
    pub geometry: GeometryHandle,
    pub extent: Extent,
    pub rings: Vec<LineString>,
}

/// Population layer features with a bbox index for culling and hit tests
pub struct LayerIndex {
    shapes: Vec<CountryShape>,
    grid: FeatureGrid,
}

impl LayerIndex {
    pub fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            grid: FeatureGrid::new(LAYER_CELL_DEGREES),
        }
    }

    /// Index layer features; features without an areal extent are skipped
    pub fn build(features: Vec<(String, GeometryHandle)>) -> Self {
        let shapes: Vec<CountryShape> = features
            .into_iter()
            .filter_map(|(name, geometry)| {
                let polygons = geometry.polygons();
                let extent = extent_of(&polygons)?;
                let rings = polygons.into_iter().flatten().collect();
                Some(CountryShape {
                    name,
                    geometry,
                    extent,
                    rings,
                })
            })
            .collect();

        let grid = FeatureGrid::build(
            shapes
                .iter()
                .map(|s| (s.extent.min_lon, s.extent.min_lat, s.extent.max_lon, s.extent.max_lat)),
            LAYER_CELL_DEGREES,
        );

        Self { shapes, grid }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&CountryShape> {
        self.shapes.iter().find(|s| s.name == name)
    }

    /// Shapes whose bbox may overlap the given bounds
    pub fn query(&self, min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Vec<&CountryShape> {
        let mut indices = Vec::new();
        self.grid.query_into(min_lon, min_lat, max_lon, max_lat, &mut indices);
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().filter_map(|i| self.shapes.get(i)).collect()
    }

    /// Country whose outline contains the point
    pub fn hit_test(&self, lon: f64, lat: f64) -> Option<&CountryShape> {
        self.query(lon, lat, lon, lat)
            .into_iter()
            .find(|s| s.extent.contains(lon, lat) && s.geometry.contains(lon, lat))
    }
}

#[cfg(test)]
pub(crate) fn square(min_lon: f64, min_lat: f64, size: f64) -> GeometryHandle {
    let ring = vec![
        vec![min_lon, min_lat],
        vec![min_lon + size, min_lat],
        vec![min_lon + size, min_lat + size],
        vec![min_lon, min_lat + size],
        vec![min_lon, min_lat],
    ];
    GeometryHandle::new(Geometry::new(Value::Polygon(vec![ring])))
}
