use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, draw_thick_line};
use crate::map::layer::LayerIndex;
use crate::map::projection::Viewport;

/// A geographic line (sequence of lon/lat coordinates)
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for basemap data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - continental
    High,   // 10m - regional
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 2.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// Which map layers are drawn
#[derive(Clone, Debug)]
pub struct DisplaySettings {
    pub show_basemap: bool,
    pub show_layer: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_basemap: true,
            show_layer: true,
        }
    }
}

/// Rendered canvases, back to front
pub struct MapLayers {
    pub basemap: BrailleCanvas,
    pub countries: BrailleCanvas,
    pub highlight: BrailleCanvas,
}

/// Basemap coastlines at several resolutions
pub struct MapRenderer {
    pub coastlines_low: Vec<LineString>,
    pub coastlines_medium: Vec<LineString>,
    pub coastlines_high: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            coastlines_low: Vec::new(),
            coastlines_medium: Vec::new(),
            coastlines_high: Vec::new(),
            settings: DisplaySettings::default(),
        }
    }

    /// Coastlines for the given LOD, falling back to coarser data
    fn get_coastlines(&self, lod: Lod) -> &[LineString] {
        let by_detail = match lod {
            Lod::High => [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low],
            Lod::Medium => [&self.coastlines_medium, &self.coastlines_low, &self.coastlines_low],
            Lod::Low => [&self.coastlines_low, &self.coastlines_low, &self.coastlines_low],
        };
        by_detail
            .into_iter()
            .find(|lines| !lines.is_empty())
            .map(|lines| lines.as_slice())
            .unwrap_or(&[])
    }

    /// Render basemap, population layer and the highlighted country
    pub fn render(
        &self,
        width: usize,
        height: usize,
        viewport: &Viewport,
        layer: &LayerIndex,
        highlight: Option<&str>,
    ) -> MapLayers {
        let mut layers = MapLayers {
            basemap: BrailleCanvas::new(width, height),
            countries: BrailleCanvas::new(width, height),
            highlight: BrailleCanvas::new(width, height),
        };

        if self.settings.show_basemap {
            for line in self.get_coastlines(Lod::from_zoom(viewport.zoom)) {
                draw_linestring(&mut layers.basemap, line, viewport, false);
            }
        }

        if self.settings.show_layer {
            let (min_lon, min_lat, max_lon, max_lat) = viewport.bounds();
            for shape in layer.query(min_lon, min_lat, max_lon, max_lat) {
                if Some(shape.name.as_str()) == highlight {
                    continue;
                }
                for ring in &shape.rings {
                    draw_linestring(&mut layers.countries, ring, viewport, false);
                }
            }
        }

        // Drawn even when the layer is hidden so the selection stays visible
        if let Some(shape) = highlight.and_then(|name| layer.find(name)) {
            for ring in &shape.rings {
                draw_linestring(&mut layers.highlight, ring, viewport, true);
            }
        }

        layers
    }

    /// Add coastline data at a specific LOD
    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Check if any basemap data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }

    pub fn toggle_basemap(&mut self) {
        self.settings.show_basemap = !self.settings.show_basemap;
    }

    pub fn toggle_layer(&mut self) {
        self.settings.show_layer = !self.settings.show_layer;
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a linestring with viewport culling. Segments longer than the
/// viewport are skipped; they come from antimeridian wraps.
fn draw_linestring(canvas: &mut BrailleCanvas, line: &[(f64, f64)], viewport: &Viewport, thick: bool) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;

    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                if thick {
                    draw_thick_line(canvas, prev_x, prev_y, px, py);
                } else {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }
        }

        prev = Some((px, py));
    }
}
