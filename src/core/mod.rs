//! Host plumbing: GPU setup, input buffering, timing and cancellation.

pub mod cancel;
pub mod controller;
pub mod gpu_context;
pub mod input_adapter;
pub mod surface_renderer;
pub mod timer;
pub mod window;

pub use cancel::CancelToken;
pub use controller::{FrameInputs, InputSource};
pub use gpu_context::GpuContext;
pub use input_adapter::WinitController;
pub use surface_renderer::{compute_vertex_normals, SurfaceRenderer};
pub use timer::{FpsCounter, Throttled};
pub use window::ViewportSize;
