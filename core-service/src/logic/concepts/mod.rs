//! Concepts Module - where each learned concept shows up on the image

pub mod area;
pub mod mask;

pub use area::{AreaCoordinates, BoundingBox};
pub use mask::ConceptMasker;
