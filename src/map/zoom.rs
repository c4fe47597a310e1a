use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;

use crate::map::layer::GeometryHandle;
use crate::map::projection::Viewport;

#[derive(Error, Debug, PartialEq)]
pub enum ZoomError {
    #[error("geometry has no areal extent to zoom to")]
    EmptyGeometry,
    #[error("map view has no size yet")]
    NoViewport,
}

/// Easing curve for zoom animations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    /// CSS `ease-in-out`, cubic-bezier(0.42, 0, 0.58, 1)
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in [0, 1] to eased progress
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseInOut => cubic_bezier(0.42, 0.58, t),
        }
    }
}

/// y(t) of a cubic bezier with control points (x1, 0) and (x2, 1),
/// solved for the curve parameter by bisection on x
fn cubic_bezier(x1: f64, x2: f64, x: f64) -> f64 {
    let bezier = |p1: f64, p2: f64, s: f64| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };

    let (mut lo, mut hi) = (0.0, 1.0);
    for _ in 0..40 {
        let mid = (lo + hi) / 2.0;
        if bezier(x1, x2, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bezier(0.0, 1.0, (lo + hi) / 2.0)
}

/// How the map moves to a selected country
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomOptions {
    /// Factor applied to the country's extent before fitting it
    pub expansion_factor: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            expansion_factor: 1.3,
            duration: Duration::from_millis(1500),
            easing: Easing::EaseInOut,
        }
    }
}

/// An in-progress viewport transition
#[derive(Clone, Debug)]
pub struct ZoomAnimation {
    from: (f64, f64, f64),
    to: (f64, f64, f64),
    started: Instant,
    duration: Duration,
    easing: Easing,
}

impl ZoomAnimation {
    /// Plan a move from `viewport` to the expanded extent of `geometry`
    pub fn plan(
        viewport: &Viewport,
        geometry: &GeometryHandle,
        options: &ZoomOptions,
        now: Instant,
    ) -> Result<Self, ZoomError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(ZoomError::NoViewport);
        }
        let extent = geometry
            .extent()
            .ok_or(ZoomError::EmptyGeometry)?
            .expand(options.expansion_factor);
        let (lon, lat, zoom) = viewport.fit_extent(&extent);

        Ok(Self {
            from: (viewport.center_lon, viewport.center_lat, viewport.zoom),
            to: (lon, lat, zoom),
            started: now,
            duration: options.duration,
            easing: options.easing,
        })
    }

    /// Apply the animation state at `now` to the viewport.
    /// Returns false once the target has been reached.
    pub fn step(&self, viewport: &mut Viewport, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.started);
        let t = if self.duration.is_zero() {
            1.0
        } else {
            elapsed.as_secs_f64() / self.duration.as_secs_f64()
        };
        let (lon0, lat0, zoom0) = self.from;
        let (lon1, lat1, zoom1) = self.to;

        if t >= 1.0 {
            viewport.center_lon = lon1;
            viewport.center_lat = lat1;
            viewport.zoom = zoom1;
            return false;
        }

        let k = self.easing.apply(t);
        viewport.center_lon = lon0 + (lon1 - lon0) * k;
        viewport.center_lat = lat0 + (lat1 - lat0) * k;
        // Interpolate zoom geometrically so the scale change feels uniform
        viewport.zoom = (zoom0.ln() + (zoom1.ln() - zoom0.ln()) * k).exp();

        true
    }

    pub fn target(&self) -> (f64, f64, f64) {
        self.to
    }
}
