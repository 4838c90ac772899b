pub mod animation;
pub mod bounds;
pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod fit;
pub mod frame;
pub mod lighting;
pub mod loaders;
pub mod math;
pub mod normalize;
pub mod orbit;
pub mod scene;
pub mod status;
pub mod types;
pub mod viewer;

pub use bounds::compute_bounds;
pub use error::{LoadError, ViewerError};
pub use fit::fit_camera;
pub use normalize::normalize;
pub use viewer::Viewer;
