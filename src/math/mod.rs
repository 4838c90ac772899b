mod bounding_box;
mod color;
mod spherical;

pub use bounding_box::BoundingBox;
pub use color::{hex_to_linear_rgb, srgb_to_linear};
pub use spherical::Spherical;
