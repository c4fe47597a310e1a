mod geometry;
mod layer;
mod projection;
mod renderer;
mod spatial;
mod view;
mod zoom;

pub use layer::{CountryShape, Extent, GeometryHandle, LayerIndex};
pub use projection::Viewport;
pub use renderer::{Lod, MapLayers, MapRenderer};
pub use view::MapView;
pub use zoom::{Easing, ZoomAnimation, ZoomError, ZoomOptions};
