pub mod geometry;
pub mod projection;
pub mod renderer;
pub mod shape;
pub mod sphere;
pub mod view;

pub use projection::{GeoCoord, Projection, ProjectionConfig};
pub use renderer::{BaseMap, Lod};
pub use shape::{Shape, ShapeId, ShapeStore};
pub use view::ViewState;
