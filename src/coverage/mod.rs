pub mod area;
pub mod radius;
pub mod shape;

pub use area::{CoverageArea, CoverageStyle};
pub use radius::{band_radii, derive_coverage_radius, distance_for_signal};
pub use shape::CoverageShape;
