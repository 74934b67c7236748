pub mod projector;

pub use projector::{NeedlePolygon, PolarProjector, Projection};
