use std::time::Instant;

use ratatui::layout::Rect;
use tracing::debug;

use crate::map::layer::{GeometryHandle, LayerIndex};
use crate::map::projection::Viewport;
use crate::map::renderer::{Lod, MapRenderer};
use crate::map::zoom::{ZoomAnimation, ZoomError, ZoomOptions};

/// The interactive map: viewport, basemap, population layer and the
/// current zoom animation. Owns all mutable map state.
pub struct MapView {
    pub viewport: Viewport,
    pub renderer: MapRenderer,
    layer: LayerIndex,
    /// Terminal cells the map was last drawn into
    area: Rect,
    animation: Option<ZoomAnimation>,
    zoom_options: ZoomOptions,
    /// Last mouse position for drag tracking
    last_mouse: Option<(u16, u16)>,
    dragged: bool,
}

impl MapView {
    pub fn new(zoom_options: ZoomOptions) -> Self {
        Self {
            viewport: Viewport::world(0, 0),
            renderer: MapRenderer::new(),
            layer: LayerIndex::empty(),
            area: Rect::default(),
            animation: None,
            zoom_options,
            last_mouse: None,
            dragged: false,
        }
    }

    /// Record where the map is drawn. Braille gives 2x4 pixels per cell.
    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
        self.viewport.width = area.width as usize * 2;
        self.viewport.height = area.height as usize * 4;
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn load_layer(&mut self, features: Vec<(String, GeometryHandle)>) {
        self.layer = LayerIndex::build(features);
        debug!(countries = self.layer.len(), "population layer indexed");
    }

    pub fn layer(&self) -> &LayerIndex {
        &self.layer
    }

    /// Terminal cell to braille pixel, if the cell is inside the map
    fn to_pixel(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let a = self.area;
        if col < a.x || row < a.y || col >= a.x + a.width || row >= a.y + a.height {
            return None;
        }
        Some((((col - a.x) as i32) * 2, ((row - a.y) as i32) * 4))
    }

    /// Country under a terminal cell
    pub fn feature_at(&self, col: u16, row: u16) -> Option<(String, GeometryHandle)> {
        let (px, py) = self.to_pixel(col, row)?;
        // Aim at the middle of the cell
        let (lon, lat) = self.viewport.unproject(px + 1, py + 2);
        self.layer
            .hit_test(lon, lat)
            .map(|shape| (shape.name.clone(), shape.geometry.clone()))
    }

    /// Start animating towards a country's expanded extent
    pub fn zoom_to(&mut self, geometry: &GeometryHandle, now: Instant) -> Result<(), ZoomError> {
        let animation = ZoomAnimation::plan(&self.viewport, geometry, &self.zoom_options, now)?;
        let (lon, lat, zoom) = animation.target();
        debug!(lon, lat, zoom, "zooming to extent");
        self.animation = Some(animation);
        Ok(())
    }

    /// Advance the zoom animation. Returns true while animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = &self.animation else {
            return false;
        };
        let running = animation.step(&mut self.viewport, now);
        if !running {
            self.animation = None;
        }
        running
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Back to the initial world view
    pub fn home(&mut self) {
        self.animation = None;
        self.viewport = Viewport::world(self.viewport.width, self.viewport.height);
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.animation = None;
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.animation = None;
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.animation = None;
        self.viewport.zoom_out();
    }

    /// Zoom in towards a terminal cell
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.animation = None;
            self.viewport.zoom_in_at(px, py);
        }
    }

    /// Zoom out from a terminal cell
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.to_pixel(col, row) {
            self.animation = None;
            self.viewport.zoom_out_at(px, py);
        }
    }

    /// Mouse button pressed over the map
    pub fn begin_drag(&mut self, col: u16, row: u16) {
        if self.to_pixel(col, row).is_some() {
            self.last_mouse = Some((col, row));
            self.dragged = false;
        }
    }

    /// Handle mouse drag, panning by the distance moved
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = last_x as i32 - x as i32;
            let dy = last_y as i32 - y as i32;
            if dx != 0 || dy != 0 {
                self.dragged = true;
            }
            // Less sensitive when zoomed out
            let scale = if self.viewport.zoom < 2.0 {
                2
            } else if self.viewport.zoom < 4.0 {
                3
            } else {
                4
            };
            self.pan(dx * scale, dy * scale);
            self.last_mouse = Some((x, y));
        }
    }

    /// Mouse button released. Returns true when the press never moved,
    /// i.e. it was a click rather than a drag.
    pub fn end_drag(&mut self) -> bool {
        let was_click = self.last_mouse.is_some() && !self.dragged;
        self.last_mouse = None;
        self.dragged = false;
        was_click
    }

    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Approximate ground width of one terminal cell (two braille pixels)
    pub fn scale_label(&self) -> String {
        let meters = self.viewport.meters_per_pixel() * 2.0;
        if meters >= 10_000.0 {
            format!("{:.0} km/cell", meters / 1000.0)
        } else if meters >= 1_000.0 {
            format!("{:.1} km/cell", meters / 1000.0)
        } else {
            format!("{:.0} m/cell", meters)
        }
    }

    pub fn lod_level(&self) -> &'static str {
        Lod::from_zoom(self.viewport.zoom).label()
    }
}
